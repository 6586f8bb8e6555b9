use serde::Serialize;
use std::collections::HashMap;

/// Value of an extracted fact. Unparseable-but-present text stays text and
/// absent concepts are explicitly `Missing` — never a silent zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum FactValue {
    Numeric(f64),
    Text(String),
    Missing,
}

impl FactValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, FactValue::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FactValue::Numeric(n) => Some(*n),
            _ => None,
        }
    }
}

/// A resolved metric, with the satisfying tag and context kept for
/// auditability.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedFact {
    pub metric: String,
    pub value: FactValue,
    pub source_tag: Option<String>,
    pub context_id: Option<String>,
}

impl ExtractedFact {
    pub fn missing(metric: &str) -> Self {
        ExtractedFact {
            metric: metric.to_string(),
            value: FactValue::Missing,
            source_tag: None,
            context_id: None,
        }
    }
}

/// One tagged value as it appears in the document, before resolution.
#[derive(Debug, Clone)]
pub struct RawFact {
    pub local_name: String,
    pub prefix: Option<String>,
    pub context_ref: Option<String>,
    pub value: String,
}

impl RawFact {
    pub fn source_tag(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local_name),
            None => self.local_name.clone(),
        }
    }
}

/// Period/segment metadata a fact references. Contexts carrying a dimension
/// marker are scoped to a segment and excluded from whole-company metrics.
#[derive(Debug, Clone)]
pub struct ReportingContext {
    pub id: String,
    pub period_start: Option<String>,
    pub period_end: String,
    pub dimensioned: bool,
}

#[derive(Debug, Default)]
pub struct RawDocument {
    pub facts: Vec<RawFact>,
    pub contexts: HashMap<String, ReportingContext>,
}

impl RawDocument {
    /// The single latest period-end across all contexts. ISO dates compare
    /// correctly as strings; anything else is best-effort.
    pub fn latest_period_end(&self) -> Option<&str> {
        self.contexts
            .values()
            .map(|c| c.period_end.as_str())
            .max()
    }
}
