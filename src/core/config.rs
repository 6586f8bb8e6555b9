use anyhow::Result;
use std::path::PathBuf;

use crate::edgar::fetch::{EDGAR_ARCHIVES_URL, EDGAR_DATA_URL};

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub user_agent: String,
    pub data_base_url: String,
    pub archive_base_url: String,
    pub data_dir: PathBuf,
    pub max_annual: usize,
    pub max_quarterly: usize,
    pub max_attempts: usize,
    pub retry_delay_ms: u64,
    pub concurrency: usize,
    pub use_cache: bool,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        let user_agent = std::env::var("SECFACTS_USER_AGENT")
            .unwrap_or_else(|_| "software@example.com".to_string());

        let data_dir = PathBuf::from(
            std::env::var("SECFACTS_DATA_DIR").unwrap_or_else(|_| "edgar_data".to_string()),
        );

        Ok(Self {
            user_agent,
            data_base_url: std::env::var("SECFACTS_DATA_URL")
                .unwrap_or_else(|_| EDGAR_DATA_URL.to_string()),
            archive_base_url: std::env::var("SECFACTS_ARCHIVE_URL")
                .unwrap_or_else(|_| EDGAR_ARCHIVES_URL.to_string()),
            data_dir,
            max_annual: env_usize("SECFACTS_MAX_ANNUAL", 5),
            max_quarterly: env_usize("SECFACTS_MAX_QUARTERLY", 4),
            max_attempts: env_usize("SECFACTS_MAX_ATTEMPTS", 4),
            retry_delay_ms: env_usize("SECFACTS_RETRY_DELAY_MS", 500) as u64,
            concurrency: env_usize("SECFACTS_CONCURRENCY", 4),
            use_cache: std::env::var("SECFACTS_NO_CACHE").is_err(),
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            user_agent: "software@example.com".to_string(),
            data_base_url: EDGAR_DATA_URL.to_string(),
            archive_base_url: EDGAR_ARCHIVES_URL.to_string(),
            data_dir: PathBuf::from("edgar_data"),
            max_annual: 5,
            max_quarterly: 4,
            max_attempts: 4,
            retry_delay_ms: 500,
            concurrency: 4,
            use_cache: true,
        }
    }
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
