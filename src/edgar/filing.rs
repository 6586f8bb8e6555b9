use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::{fmt, str::FromStr};
use strum::{EnumIter, IntoEnumIterator};

/// Filing forms the extraction pipeline understands. Annual forms carry a
/// full fiscal year, quarterly forms an interim period; foreign private
/// issuers file 20-F/6-K instead of 10-K/10-Q.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
#[serde(into = "String", try_from = "String")]
pub enum FormType {
    AnnualDomestic,
    AnnualForeign,
    QuarterlyDomestic,
    QuarterlyForeign,
}

impl FormType {
    pub fn is_annual(&self) -> bool {
        matches!(self, FormType::AnnualDomestic | FormType::AnnualForeign)
    }

    pub fn known_forms() -> String {
        FormType::iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormType::AnnualDomestic => write!(f, "10-K"),
            FormType::AnnualForeign => write!(f, "20-F"),
            FormType::QuarterlyDomestic => write!(f, "10-Q"),
            FormType::QuarterlyForeign => write!(f, "6-K"),
        }
    }
}

impl FromStr for FormType {
    type Err = String;

    fn from_str(s: &str) -> Result<FormType, String> {
        match s.trim().to_uppercase().as_str() {
            "10-K" => Ok(FormType::AnnualDomestic),
            "20-F" => Ok(FormType::AnnualForeign),
            "10-Q" => Ok(FormType::QuarterlyDomestic),
            "6-K" => Ok(FormType::QuarterlyForeign),
            other => Err(format!("unsupported form type: {}", other)),
        }
    }
}

impl TryFrom<String> for FormType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        FormType::from_str(&s)
    }
}

impl From<FormType> for String {
    fn from(f: FormType) -> String {
        f.to_string()
    }
}

/// Unique identifier of one filed submission package. Never empty; dashed
/// and undashed renderings are both derivable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accession(String);

impl Accession {
    pub fn new(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Accession(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Archive paths use the undashed form.
    pub fn nodash(&self) -> String {
        self.0.replace('-', "")
    }

    pub fn dashed(&self) -> String {
        if self.0.contains('-') {
            return self.0.clone();
        }
        let raw = &self.0;
        if raw.len() == 18 {
            format!("{}-{}-{}", &raw[..10], &raw[10..12], &raw[12..])
        } else {
            raw.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FilingRecord {
    pub form_type: FormType,
    pub filing_date: NaiveDate,
    pub accession: Accession,
    pub primary_document: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmissionsPayload {
    #[serde(default)]
    pub name: Option<String>,
    pub filings: FilingsSection,
}

#[derive(Debug, Deserialize)]
pub struct FilingsSection {
    pub recent: RecentFilings,
}

/// The catalog payload is parallel arrays, one entry per filing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecentFilings {
    pub form: Vec<String>,
    pub filing_date: Vec<String>,
    pub accession_number: Vec<String>,
    pub primary_document: Vec<String>,
}

/// Zips the parallel arrays defensively: a short or misaligned column skips
/// that index instead of faulting.
pub fn parse_catalog(recent: &RecentFilings) -> Vec<FilingRecord> {
    let mut records = Vec::new();

    for (i, form) in recent.form.iter().enumerate() {
        let form_type = match form.parse::<FormType>() {
            Ok(f) => f,
            Err(_) => continue,
        };
        let filing_date = match recent
            .filing_date
            .get(i)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        {
            Some(d) => d,
            None => {
                log::debug!("skipping catalog index {}: missing or bad filingDate", i);
                continue;
            }
        };
        let accession = match recent.accession_number.get(i).and_then(|a| Accession::new(a)) {
            Some(a) => a,
            None => {
                log::debug!("skipping catalog index {}: missing accessionNumber", i);
                continue;
            }
        };
        let primary_document = recent.primary_document.get(i).cloned().unwrap_or_default();

        records.push(FilingRecord {
            form_type,
            filing_date,
            accession,
            primary_document,
        });
    }

    records
}

#[derive(Debug, Default)]
pub struct SelectedFilings {
    pub annual: Vec<FilingRecord>,
    pub quarterly: Vec<FilingRecord>,
}

impl SelectedFilings {
    pub fn is_empty(&self) -> bool {
        self.annual.is_empty() && self.quarterly.is_empty()
    }

    pub fn into_records(self) -> Vec<FilingRecord> {
        let mut records = self.annual;
        records.extend(self.quarterly);
        records
    }
}

/// Selection policy: up to `max_annual` annual filings, at most one per
/// distinct fiscal year (derived from the filing date), newest-first; up to
/// `max_quarterly` quarterly filings by count cap.
pub fn select_filings(
    records: &[FilingRecord],
    max_annual: usize,
    max_quarterly: usize,
) -> SelectedFilings {
    let mut ordered: Vec<&FilingRecord> = records.iter().collect();
    ordered.sort_by(|a, b| b.filing_date.cmp(&a.filing_date));

    let mut selected = SelectedFilings::default();
    let mut seen_years: HashSet<i32> = HashSet::new();

    for record in ordered {
        if record.form_type.is_annual() {
            let year = record.filing_date.year();
            if selected.annual.len() < max_annual && seen_years.insert(year) {
                selected.annual.push(record.clone());
            }
        } else if selected.quarterly.len() < max_quarterly {
            selected.quarterly.push(record.clone());
        }
    }

    selected
}
