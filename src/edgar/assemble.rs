use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use super::filing::{Accession, FilingRecord, FormType};
use super::parsing::metrics::METRIC_SPECS;
use super::parsing::types::ExtractedFact;

/// Per-filing extraction output: the located instance document plus the
/// resolved metric map.
#[derive(Debug, Clone, Serialize)]
pub struct FilingFinancials {
    pub accession: Accession,
    pub form_type: FormType,
    pub filing_date: NaiveDate,
    pub instance_url: Option<String>,
    pub facts: BTreeMap<String, ExtractedFact>,
}

impl FilingFinancials {
    /// Degraded record for a filing whose document could not be fetched,
    /// located or parsed: every canonical metric explicitly `Missing`.
    pub fn unavailable(record: &FilingRecord) -> Self {
        let facts = METRIC_SPECS
            .iter()
            .map(|spec| (spec.metric.to_string(), ExtractedFact::missing(spec.metric)))
            .collect();
        FilingFinancials {
            accession: record.accession.clone(),
            form_type: record.form_type,
            filing_date: record.filing_date,
            instance_url: None,
            facts,
        }
    }

    pub fn all_missing(&self) -> bool {
        self.facts.values().all(|f| f.value.is_missing())
    }
}

#[derive(Debug, Serialize)]
pub struct CompanyFinancials {
    pub cik: u64,
    pub company_name: Option<String>,
    pub annual: Vec<FilingFinancials>,
    pub quarterly: Vec<FilingFinancials>,
}

impl CompanyFinancials {
    /// Filings were selected but no document produced a single fact.
    pub fn none_extractable(&self) -> bool {
        self.annual.iter().all(|f| f.all_missing())
            && self.quarterly.iter().all(|f| f.all_missing())
    }
}

/// Groups per-filing results into historical annuals and quarters, newest
/// first. Quarterly entries with nothing resolved are dropped to cut noise
/// from unresolvable documents; annuals are kept so gaps stay visible.
pub fn assemble(
    cik: u64,
    company_name: Option<String>,
    mut filings: Vec<FilingFinancials>,
) -> CompanyFinancials {
    filings.sort_by(|a, b| b.filing_date.cmp(&a.filing_date));

    let mut annual = Vec::new();
    let mut quarterly = Vec::new();
    for filing in filings {
        if filing.form_type.is_annual() {
            annual.push(filing);
        } else if !filing.all_missing() {
            quarterly.push(filing);
        } else {
            log::debug!(
                "dropping quarterly {} with no resolvable facts",
                filing.accession.dashed()
            );
        }
    }

    CompanyFinancials {
        cik,
        company_name,
        annual,
        quarterly,
    }
}
