use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::fetch::EdgarError;

/// One filing package's file listing, as served by the archive `index.json`.
#[derive(Debug, Deserialize)]
pub struct PackageIndex {
    pub directory: Directory,
}

#[derive(Debug, Deserialize)]
pub struct Directory {
    #[serde(default)]
    pub item: Vec<FileEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileEntry {
    pub name: String,
}

// Linkbase and schema companions never carry fact values.
const LINKBASE_MARKERS: &[&str] = &["_cal", "_def", "_lab", "_pre", "filingsummary", ".xsd"];

// Viewer-generated report pages (R1.htm, R2.htm, ...).
static RENDERED_PAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^r\d+\.htm").unwrap());

fn is_companion(name: &str) -> bool {
    let lower = name.to_lowercase();
    LINKBASE_MARKERS.iter().any(|marker| lower.contains(marker))
        || RENDERED_PAGE.is_match(&lower)
}

pub fn parse_package_index(bytes: &[u8]) -> Result<Vec<FileEntry>, EdgarError> {
    serde_json::from_slice::<PackageIndex>(bytes)
        .map(|index| index.directory.item)
        .map_err(|e| EdgarError::Parse(format!("bad package index: {}", e)))
}

/// Picks the structured-data document out of a filing's file listing.
///
/// Linkbase companions are excluded outright, then the conventional rendered
/// instance (`*_htm.xml`) is preferred. Failing that, the declared primary
/// document is used if it is itself structured, else the expected rendered
/// instance name is derived from it. An empty listing yields `None`.
pub fn locate_instance(entries: &[FileEntry], primary_document: &str) -> Option<String> {
    if entries.is_empty() {
        return None;
    }

    let usable: Vec<&FileEntry> = entries.iter().filter(|e| !is_companion(&e.name)).collect();

    if let Some(hit) = usable
        .iter()
        .find(|e| e.name.to_lowercase().ends_with("_htm.xml"))
    {
        return Some(hit.name.clone());
    }

    if primary_document.to_lowercase().ends_with(".xml") {
        return Some(primary_document.to_string());
    }

    derived_instance_name(primary_document)
}

/// `abc_10k.htm` → `abc_10k_htm.xml`, the conventional rendered-instance
/// name next to the primary document.
pub fn derived_instance_name(primary_document: &str) -> Option<String> {
    let stem = primary_document
        .strip_suffix(".htm")
        .or_else(|| primary_document.strip_suffix(".html"))?;
    if stem.is_empty() {
        return None;
    }
    Some(format!("{}_htm.xml", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(names: &[&str]) -> Vec<FileEntry> {
        names
            .iter()
            .map(|n| FileEntry {
                name: n.to_string(),
            })
            .collect()
    }

    #[test]
    fn prefers_rendered_instance_over_linkbases() {
        let listing = entries(&[
            "abc_10k_htm.xml",
            "abc-20231231_cal.xml",
            "abc-20231231_def.xml",
        ]);
        assert_eq!(
            locate_instance(&listing, "abc_10k.htm").as_deref(),
            Some("abc_10k_htm.xml")
        );
    }

    #[test]
    fn linkbase_marker_beats_preferred_suffix() {
        // A linkbase name that also matches the preferred pattern must still
        // be excluded.
        let listing = entries(&["abc-20231231_cal_htm.xml", "FilingSummary.xml", "abc.xsd"]);
        assert_eq!(
            locate_instance(&listing, "abc_10k.htm").as_deref(),
            Some("abc_10k_htm.xml")
        );
    }

    #[test]
    fn rendered_report_pages_are_not_candidates() {
        assert!(is_companion("R1.htm"));
        assert!(is_companion("r42.htm"));
        assert!(!is_companion("report.htm"));
    }

    #[test]
    fn falls_back_to_structured_primary_document() {
        let listing = entries(&["report.xml", "cover.jpg"]);
        // No *_htm.xml present; the primary document is itself structured.
        assert_eq!(
            locate_instance(&listing, "report.xml").as_deref(),
            Some("report.xml")
        );
    }

    #[test]
    fn derives_instance_name_from_primary_document() {
        let listing = entries(&["cover.jpg"]);
        assert_eq!(
            locate_instance(&listing, "abc_10k.htm").as_deref(),
            Some("abc_10k_htm.xml")
        );
        assert_eq!(derived_instance_name("abc.html").as_deref(), Some("abc_htm.xml"));
        assert_eq!(derived_instance_name("nodots"), None);
    }

    #[test]
    fn empty_listing_is_not_found() {
        assert_eq!(locate_instance(&[], "abc_10k.htm"), None);
    }

    #[test]
    fn parses_package_index_payload() {
        let payload = br#"{"directory":{"item":[{"name":"abc_10k.htm"},{"name":"abc_10k_htm.xml"}]}}"#;
        let listing = parse_package_index(payload).unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[1].name, "abc_10k_htm.xml");

        assert!(parse_package_index(b"not json").is_err());
    }
}
