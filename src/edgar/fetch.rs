use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

use super::rate_limiter;
use crate::cache::DocumentCache;
use crate::core::config::EngineConfig;

pub const EDGAR_DATA_URL: &str = "https://data.sec.gov";
pub const EDGAR_ARCHIVES_URL: &str = "https://www.sec.gov/Archives/edgar/data";

#[derive(Debug, Error)]
pub enum EdgarError {
    #[error("upstream temporarily unavailable (HTTP {status}) after {attempts} attempts")]
    Transient { status: u16, attempts: usize },
    #[error("permanent upstream failure (HTTP {0})")]
    Permanent(u16),
    #[error("request timed out after {0} attempts")]
    Timeout(usize),
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("no instance document found in filing package")]
    InstanceNotFound,
    #[error("catalog contains no selectable filings")]
    NoFilings,
    #[error("request cancelled")]
    Cancelled,
}

impl EdgarError {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EdgarError::Transient { .. } | EdgarError::Timeout(_) | EdgarError::Network(_)
        )
    }
}

// 403 is how EDGAR signals throttling, so it retries alongside 5xx.
fn retryable(status: StatusCode) -> bool {
    status == StatusCode::FORBIDDEN
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

/// Rate-limited, retrying HTTP client. Every request carries the identifying
/// `User-Agent` the upstream requires.
pub struct EdgarClient {
    http: Client,
    user_agent: String,
    archive_base: String,
    cache: Option<DocumentCache>,
    max_attempts: usize,
    retry_delay: Duration,
}

impl EdgarClient {
    pub fn new(config: &EngineConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .gzip(true)
            .timeout(Duration::from_secs(30))
            .build()?;

        let cache = if config.use_cache {
            Some(DocumentCache::open(&config.data_dir.join("cache"))?)
        } else {
            None
        };

        Ok(EdgarClient {
            http,
            user_agent: config.user_agent.clone(),
            archive_base: config.archive_base_url.clone(),
            cache,
            max_attempts: config.max_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// GET with retry on transient failures (403/429/5xx, timeouts). 400/404
    /// fail immediately. An empty body is a successful fetch; callers decide
    /// what emptiness means.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, EdgarError> {
        let mut last = EdgarError::Network("no attempts made".to_string());

        for attempt in 1..=self.max_attempts {
            rate_limiter::edgar().until_ready().await;
            log::debug!("GET {} (attempt {}/{})", url, attempt, self.max_attempts);

            match self
                .http
                .get(url)
                .header(reqwest::header::USER_AGENT, &self.user_agent)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .bytes()
                            .await
                            .map(|b| b.to_vec())
                            .map_err(|e| EdgarError::Network(e.to_string()));
                    }
                    if !retryable(status) {
                        log::warn!("HTTP {} from {}, not retrying", status, url);
                        return Err(EdgarError::Permanent(status.as_u16()));
                    }
                    log::warn!("HTTP {} from {}, attempt {}", status, url, attempt);
                    last = EdgarError::Transient {
                        status: status.as_u16(),
                        attempts: attempt,
                    };
                }
                Err(e) if e.is_timeout() => {
                    log::warn!("timeout fetching {}, attempt {}", url, attempt);
                    last = EdgarError::Timeout(attempt);
                }
                Err(e) => {
                    log::warn!("network error fetching {}: {}", url, e);
                    last = EdgarError::Network(e.to_string());
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.retry_delay * attempt as u32).await;
            }
        }

        Err(last)
    }

    pub fn archive_url(&self, cik: u64, accession_nodash: &str, filename: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.archive_base, cik, accession_nodash, filename
        )
    }

    /// Archive documents are immutable, so the content cache is consulted
    /// before any network fetch.
    pub async fn fetch_archive(
        &self,
        cik: u64,
        accession_nodash: &str,
        filename: &str,
    ) -> Result<Vec<u8>, EdgarError> {
        let key = format!("{}/{}", accession_nodash, filename);
        if let Some(cache) = &self.cache {
            if let Some(bytes) = cache.get(&key) {
                log::debug!("cache hit for {}", key);
                return Ok(bytes);
            }
        }

        let url = self.archive_url(cik, accession_nodash, filename);
        let bytes = self.fetch(&url).await?;

        if let Some(cache) = &self.cache {
            cache.put(&key, &bytes);
        }
        Ok(bytes)
    }
}
