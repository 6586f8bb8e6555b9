//! Inline-tagged documents: facts embedded in rendered HTML.
//!
//! Here the concept name lives in a `name` attribute (`prefix:ConceptName`)
//! on a generic fact element (`ix:nonFraction` / `ix:nonNumeric`) rather
//! than as the element's own name, so extraction searches attribute values
//! instead of element names. The HTML parser lowercases element and
//! attribute names, which this module relies on.

use scraper::{ElementRef, Html};
use unicode_normalization::UnicodeNormalization;

use super::types::{RawDocument, RawFact, ReportingContext};

pub fn parse_inline(content: &str) -> RawDocument {
    let html = Html::parse_document(content);
    let mut doc = RawDocument::default();

    for node in html.tree.nodes() {
        let element = match ElementRef::wrap(node) {
            Some(e) => e,
            None => continue,
        };
        let name = element.value().name();
        let local = name.rsplit(':').next().unwrap_or(name);

        match local {
            "context" => read_inline_context(&element, &mut doc),
            "nonfraction" | "nonnumeric" => {
                let concept = match element.value().attr("name") {
                    Some(c) => c,
                    None => continue,
                };
                let concept_local = concept.rsplit(':').next().unwrap_or(concept);
                let prefix = match concept.split_once(':') {
                    Some((p, _)) => Some(p.to_string()),
                    None => None,
                };
                let raw_text = element.text().collect::<String>();
                let text = html_escape::decode_html_entities(&raw_text)
                    .nfkc()
                    .collect::<String>();

                doc.facts.push(RawFact {
                    local_name: concept_local.to_string(),
                    prefix,
                    context_ref: element.value().attr("contextref").map(str::to_string),
                    value: text.trim().to_string(),
                });
            }
            _ => {}
        }
    }

    doc
}

// Contexts ride along in the hidden ix:header section.
fn read_inline_context(element: &ElementRef<'_>, doc: &mut RawDocument) {
    let id = match element.value().attr("id") {
        Some(id) => id.to_string(),
        None => return,
    };

    let mut period_start = None;
    let mut period_end = None;
    let mut dimensioned = false;

    for node in element.descendants() {
        let child = match ElementRef::wrap(node) {
            Some(c) => c,
            None => continue,
        };
        let name = child.value().name();
        let local = name.rsplit(':').next().unwrap_or(name);
        match local {
            "startdate" => {
                period_start = Some(child.text().collect::<String>().trim().to_string())
            }
            "enddate" | "instant" => {
                period_end = Some(child.text().collect::<String>().trim().to_string())
            }
            "segment" | "explicitmember" => dimensioned = true,
            _ => {}
        }
    }

    if let Some(period_end) = period_end {
        doc.contexts.entry(id.clone()).or_insert(ReportingContext {
            id,
            period_start,
            period_end,
            dimensioned,
        });
    }
}
