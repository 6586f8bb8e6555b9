//! Filing discovery, document location and fact extraction against the
//! EDGAR archive.

pub mod assemble;
pub mod fetch;
pub mod filing;
pub mod index;
pub mod parsing;
pub mod rate_limiter;

use futures::{stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::core::config::EngineConfig;
use assemble::{CompanyFinancials, FilingFinancials};
use fetch::{EdgarClient, EdgarError};
use filing::{FilingRecord, SubmissionsPayload};

/// The extraction pipeline: catalog fetch, selection, per-filing document
/// location and extraction, assembly.
pub struct FactEngine {
    client: EdgarClient,
    config: EngineConfig,
}

impl FactEngine {
    pub fn new(config: EngineConfig) -> anyhow::Result<Self> {
        let client = EdgarClient::new(&config)?;
        Ok(FactEngine { client, config })
    }

    /// Resolves a company's selected filings into per-filing metric maps.
    ///
    /// Per-filing work shares nothing, so filings run on a bounded worker
    /// pool. Cancellation aborts outstanding filings without invalidating
    /// completed ones; partial results are returned.
    pub async fn company_financials(
        &self,
        cik: u64,
        cancel: &CancellationToken,
    ) -> Result<CompanyFinancials, EdgarError> {
        let url = format!(
            "{}/submissions/CIK{:010}.json",
            self.config.data_base_url, cik
        );
        let bytes = self.client.fetch(&url).await?;
        let payload: SubmissionsPayload = serde_json::from_slice(&bytes)
            .map_err(|e| EdgarError::Parse(format!("bad submissions payload: {}", e)))?;

        let records = filing::parse_catalog(&payload.filings.recent);
        let selected =
            filing::select_filings(&records, self.config.max_annual, self.config.max_quarterly);
        if selected.is_empty() {
            return Err(EdgarError::NoFilings);
        }
        log::info!(
            "CIK {}: selected {} annual and {} quarterly filings",
            cik,
            selected.annual.len(),
            selected.quarterly.len()
        );

        let results: Vec<Option<FilingFinancials>> = stream::iter(selected.into_records())
            .map(|record| {
                let cancel = cancel.clone();
                let accession = record.accession.dashed();
                async move {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            log::info!("cancelled before completing {}", accession);
                            None
                        }
                        financials = self.process_filing(cik, record) => Some(financials),
                    }
                }
            })
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        let filings: Vec<FilingFinancials> = results.into_iter().flatten().collect();
        if filings.is_empty() && cancel.is_cancelled() {
            return Err(EdgarError::Cancelled);
        }
        Ok(assemble::assemble(cik, payload.name, filings))
    }

    /// One filing's failure degrades only that filing; siblings still
    /// complete.
    async fn process_filing(&self, cik: u64, record: FilingRecord) -> FilingFinancials {
        match self.try_process_filing(cik, &record).await {
            Ok(financials) => financials,
            Err(err) => {
                log::warn!(
                    "facts unavailable for {} {} ({}): {}",
                    record.form_type,
                    record.accession.dashed(),
                    record.filing_date,
                    err
                );
                FilingFinancials::unavailable(&record)
            }
        }
    }

    async fn try_process_filing(
        &self,
        cik: u64,
        record: &FilingRecord,
    ) -> Result<FilingFinancials, EdgarError> {
        let nodash = record.accession.nodash();

        let index_bytes = self.client.fetch_archive(cik, &nodash, "index.json").await?;
        let entries = index::parse_package_index(&index_bytes)?;

        let instance = index::locate_instance(&entries, &record.primary_document)
            .ok_or(EdgarError::InstanceNotFound)?;
        log::debug!("{}: instance document {}", record.accession.dashed(), instance);

        let bytes = self.client.fetch_archive(cik, &nodash, &instance).await?;
        if bytes.is_empty() {
            // Fetched-but-empty is distinct from fetch-failed; for
            // extraction both mean this document yields nothing.
            return Err(EdgarError::Parse("fetched empty instance document".to_string()));
        }

        let facts = parsing::extract_metrics(&bytes)?;

        Ok(FilingFinancials {
            accession: record.accession.clone(),
            form_type: record.form_type,
            filing_date: record.filing_date,
            instance_url: Some(self.client.archive_url(cik, &nodash, &instance)),
            facts,
        })
    }
}
