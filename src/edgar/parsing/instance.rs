//! Strict and lenient parsers for standalone instance documents.
//!
//! The strict pass builds a full tree; the lenient pass is a streaming read
//! with end-tag checking disabled, which survives the unclosed tags and
//! mismatched nesting real filings exhibit.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use unicode_normalization::UnicodeNormalization;

use super::types::{RawDocument, RawFact, ReportingContext};
use crate::edgar::fetch::EdgarError;

pub fn parse_strict(content: &str) -> Result<RawDocument, EdgarError> {
    let tree = roxmltree::Document::parse(content)
        .map_err(|e| EdgarError::Parse(format!("strict XML parse failed: {}", e)))?;

    let mut doc = RawDocument::default();

    for node in tree.root_element().descendants().filter(|n| n.is_element()) {
        // Namespace-prefix blind throughout: filers mix taxonomies.
        if node.tag_name().name() == "context" {
            if let Some(ctx) = read_context(&node) {
                doc.contexts.entry(ctx.id.clone()).or_insert(ctx);
            }
        } else if let Some(context_ref) = node.attribute("contextRef") {
            let value = node.text().unwrap_or("").nfkc().collect::<String>();
            let prefix = node
                .tag_name()
                .namespace()
                .and_then(|ns| node.lookup_prefix(ns))
                .map(str::to_string);
            doc.facts.push(RawFact {
                local_name: node.tag_name().name().to_string(),
                prefix,
                context_ref: Some(context_ref.to_string()),
                value: value.trim().to_string(),
            });
        }
    }

    Ok(doc)
}

fn read_context(node: &roxmltree::Node<'_, '_>) -> Option<ReportingContext> {
    let id = node.attribute("id")?.to_string();
    let mut period_start = None;
    let mut period_end = None;
    let mut dimensioned = false;

    for child in node.descendants().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "startDate" => period_start = child.text().map(|t| t.trim().to_string()),
            "endDate" | "instant" => period_end = child.text().map(|t| t.trim().to_string()),
            "segment" | "explicitMember" => dimensioned = true,
            _ => {}
        }
    }

    // A context without a period end cannot anchor a fact to a period.
    Some(ReportingContext {
        id,
        period_start,
        period_end: period_end?,
        dimensioned,
    })
}

#[derive(Default)]
struct PartialContext {
    id: String,
    period_start: Option<String>,
    period_end: Option<String>,
    dimensioned: bool,
}

enum PeriodField {
    Start,
    End,
}

/// Streaming recovery parse tolerant of unclosed tags.
pub fn parse_lenient(content: &str) -> Result<RawDocument, EdgarError> {
    let mut reader = Reader::from_str(content);
    let config = reader.config_mut();
    config.trim_text_start = true;
    config.trim_text_end = true;
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut doc = RawDocument::default();
    let mut current_context: Option<PartialContext> = None;
    let mut pending_fact: Option<RawFact> = None;
    let mut period_field: Option<PeriodField> = None;

    loop {
        match reader.read_event() {
            Err(e) => return Err(EdgarError::Parse(format!("lenient parse failed: {}", e))),
            Ok(Event::Eof) => break,
            Ok(Event::Start(start)) | Ok(Event::Empty(start)) => {
                let local = local_name(&start);
                if local == "context" {
                    if let Some(ctx) = current_context.take() {
                        flush_context(&mut doc, ctx);
                    }
                    if let Some(id) = attr_value(&start, "id") {
                        current_context = Some(PartialContext {
                            id,
                            ..PartialContext::default()
                        });
                    }
                    pending_fact = None;
                } else if let Some(context_ref) = attr_value(&start, "contextRef") {
                    // Fact elements are never context children, so one here
                    // closes a context whose end tag went missing.
                    if let Some(ctx) = current_context.take() {
                        flush_context(&mut doc, ctx);
                        period_field = None;
                    }
                    // An unterminated previous fact is kept as-is.
                    if let Some(fact) = pending_fact.take() {
                        doc.facts.push(fact);
                    }
                    pending_fact = Some(RawFact {
                        local_name: local,
                        prefix: prefix_of(&start),
                        context_ref: Some(context_ref),
                        value: String::new(),
                    });
                } else if let Some(ctx) = current_context.as_mut() {
                    match local.as_str() {
                        "startDate" => period_field = Some(PeriodField::Start),
                        "endDate" | "instant" => period_field = Some(PeriodField::End),
                        "segment" | "explicitMember" => ctx.dimensioned = true,
                        _ => {}
                    }
                }
            }
            Ok(Event::Text(text)) => {
                let value = match text.unescape() {
                    Ok(v) => v.nfkc().collect::<String>(),
                    Err(_) => continue,
                };
                let value = value.trim().to_string();
                if value.is_empty() {
                    continue;
                }
                if let Some(ctx) = current_context.as_mut() {
                    match period_field {
                        Some(PeriodField::Start) => ctx.period_start = Some(value),
                        Some(PeriodField::End) => ctx.period_end = Some(value),
                        None => {}
                    }
                } else if let Some(fact) = pending_fact.as_mut() {
                    fact.value.push_str(&value);
                }
            }
            Ok(Event::End(end)) => {
                let local =
                    String::from_utf8_lossy(end.name().local_name().as_ref()).to_string();
                if local == "context" {
                    if let Some(ctx) = current_context.take() {
                        flush_context(&mut doc, ctx);
                    }
                    period_field = None;
                } else if matches!(local.as_str(), "startDate" | "endDate" | "instant") {
                    period_field = None;
                } else if pending_fact
                    .as_ref()
                    .map(|f| f.local_name == local)
                    .unwrap_or(false)
                {
                    if let Some(fact) = pending_fact.take() {
                        doc.facts.push(fact);
                    }
                }
            }
            Ok(_) => {}
        }
    }

    if let Some(fact) = pending_fact.take() {
        doc.facts.push(fact);
    }
    if let Some(ctx) = current_context.take() {
        flush_context(&mut doc, ctx);
    }

    Ok(doc)
}

fn flush_context(doc: &mut RawDocument, ctx: PartialContext) {
    if let Some(period_end) = ctx.period_end {
        doc.contexts
            .entry(ctx.id.clone())
            .or_insert(ReportingContext {
                id: ctx.id,
                period_start: ctx.period_start,
                period_end,
                dimensioned: ctx.dimensioned,
            });
    }
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().local_name().as_ref()).to_string()
}

fn prefix_of(start: &BytesStart<'_>) -> Option<String> {
    start
        .name()
        .prefix()
        .map(|p| String::from_utf8_lossy(p.as_ref()).to_string())
}

fn attr_value(start: &BytesStart<'_>, name: &str) -> Option<String> {
    start
        .attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(|v| v.to_string()))
}
