//! Fact extraction from instance documents.
//!
//! Parsing attempts the strict XML path first, falls back to a lenient
//! recovering parse, and switches to attribute-based search for
//! inline-tagged documents. Resolution then maps the heterogeneous tag
//! vocabulary onto the canonical metric set.

pub mod inline;
pub mod instance;
pub mod metrics;
pub mod numeric;
pub mod types;

use std::collections::BTreeMap;

use metrics::{Aggregation, MetricSpec, METRIC_SPECS};
use types::{ExtractedFact, FactValue, RawDocument, RawFact};

use super::fetch::EdgarError;

/// Parses an instance document and resolves the canonical metric set.
pub fn extract_metrics(bytes: &[u8]) -> Result<BTreeMap<String, ExtractedFact>, EdgarError> {
    let doc = parse_document(bytes)?;
    Ok(resolve_metrics(&doc))
}

pub fn parse_document(bytes: &[u8]) -> Result<RawDocument, EdgarError> {
    if bytes.is_empty() {
        return Err(EdgarError::Parse("empty instance document".to_string()));
    }
    let content = decode_bytes(bytes);

    if looks_inline(&content) || looks_html(&content) {
        let doc = inline::parse_inline(&content);
        if doc.facts.is_empty() {
            log::warn!("inline-tagged document yielded no facts");
        }
        return Ok(doc);
    }

    match instance::parse_strict(&content) {
        Ok(doc) => Ok(doc),
        Err(err) => {
            log::warn!("{}; retrying with lenient parser", err);
            instance::parse_lenient(&content)
        }
    }
}

/// Instance documents are usually UTF-8 but legacy filings carry Latin-1
/// bytes; decode forgivingly rather than failing the document.
fn decode_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

fn looks_inline(content: &str) -> bool {
    content.contains("ix:nonFraction")
        || content.contains("ix:nonfraction")
        || content.contains("ix:nonNumeric")
        || content.contains("ix:nonnumeric")
}

fn looks_html(content: &str) -> bool {
    let head: String = content
        .trim_start()
        .chars()
        .take(256)
        .collect::<String>()
        .to_lowercase();
    head.starts_with("<!doctype html") || head.contains("<html")
}

/// Resolves every canonical metric against the document. Metrics with zero
/// matches are recorded `Missing`, never omitted.
pub fn resolve_metrics(doc: &RawDocument) -> BTreeMap<String, ExtractedFact> {
    let latest = doc.latest_period_end().map(str::to_string);

    METRIC_SPECS
        .iter()
        .map(|spec| {
            (
                spec.metric.to_string(),
                resolve_one(doc, spec, latest.as_deref()),
            )
        })
        .collect()
}

fn resolve_one(doc: &RawDocument, spec: &MetricSpec, latest: Option<&str>) -> ExtractedFact {
    match spec.mode {
        Aggregation::FirstMatch => {
            for candidate in spec.candidates {
                let matches = usable_facts(doc, candidate);
                if let Some(fact) = pick(&matches, doc, latest) {
                    return ExtractedFact {
                        metric: spec.metric.to_string(),
                        value: numeric::parse_value(&fact.value),
                        source_tag: Some(fact.source_tag()),
                        context_id: fact.context_ref.clone(),
                    };
                }
            }
            ExtractedFact::missing(spec.metric)
        }
        Aggregation::Sum => {
            let mut total = 0.0;
            let mut any_numeric = false;
            let mut tags = Vec::new();
            let mut context_id = None;
            let mut first_text = None;

            for candidate in spec.candidates {
                let matches = usable_facts(doc, candidate);
                let fact = match pick(&matches, doc, latest) {
                    Some(f) => f,
                    None => continue,
                };
                match numeric::parse_value(&fact.value) {
                    FactValue::Numeric(n) => {
                        total += n;
                        any_numeric = true;
                        tags.push(fact.source_tag());
                        if context_id.is_none() {
                            context_id = fact.context_ref.clone();
                        }
                    }
                    FactValue::Text(t) => {
                        if first_text.is_none() {
                            first_text = Some((t, fact.source_tag(), fact.context_ref.clone()));
                        }
                    }
                    FactValue::Missing => {}
                }
            }

            if any_numeric {
                ExtractedFact {
                    metric: spec.metric.to_string(),
                    value: FactValue::Numeric(total),
                    source_tag: Some(tags.join("+")),
                    context_id,
                }
            } else if let Some((text, tag, ctx)) = first_text {
                ExtractedFact {
                    metric: spec.metric.to_string(),
                    value: FactValue::Text(text),
                    source_tag: Some(tag),
                    context_id: ctx,
                }
            } else {
                ExtractedFact::missing(spec.metric)
            }
        }
    }
}

/// Facts matching a candidate by local name, skipping empty values and
/// segment-scoped contexts.
fn usable_facts<'a>(doc: &'a RawDocument, candidate: &str) -> Vec<&'a RawFact> {
    doc.facts
        .iter()
        .filter(|f| {
            f.local_name.eq_ignore_ascii_case(candidate)
                && !f.value.is_empty()
                && !is_dimensioned(doc, f)
        })
        .collect()
}

fn is_dimensioned(doc: &RawDocument, fact: &RawFact) -> bool {
    fact.context_ref
        .as_ref()
        .and_then(|id| doc.contexts.get(id))
        .map(|c| c.dimensioned)
        .unwrap_or(false)
}

/// Context disambiguation: prefer a fact whose context carries the latest
/// period-end in the document; otherwise fall back to the last occurrence
/// in document order. A heuristic, but a stable one.
fn pick<'a>(matches: &[&'a RawFact], doc: &RawDocument, latest: Option<&str>) -> Option<&'a RawFact> {
    if matches.is_empty() {
        return None;
    }
    if let Some(latest) = latest {
        let preferred = matches
            .iter()
            .find(|f| {
                f.context_ref
                    .as_ref()
                    .and_then(|id| doc.contexts.get(id))
                    .map(|c| c.period_end == latest)
                    .unwrap_or(false)
            })
            .copied();
        if preferred.is_some() {
            return preferred;
        }
    }
    matches.last().copied()
}
