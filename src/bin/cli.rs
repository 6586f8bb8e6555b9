use anyhow::Result;
use secfacts::core::config::EngineConfig;
use secfacts::edgar::fetch::EdgarError;
use secfacts::edgar::filing::FormType;
use secfacts::FactEngine;
use std::time::Duration;
use structopt::StructOpt;
use tokio_util::sync::CancellationToken;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "secfacts-cli",
    about = "Extract canonical financial metrics from a company's filings"
)]
struct Opt {
    /// Numeric company identifier (CIK)
    cik: u64,

    /// Bypass the local document cache
    #[structopt(long)]
    no_cache: bool,

    /// Abort the request after this many seconds, keeping partial results
    #[structopt(long, default_value = "120")]
    deadline: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let opt = Opt::from_args();

    let mut config = EngineConfig::from_env()?;
    if opt.no_cache {
        config.use_cache = false;
    }

    let engine = FactEngine::new(config)?;

    let cancel = CancellationToken::new();
    let deadline = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(opt.deadline)).await;
        deadline.cancel();
    });

    match engine.company_financials(opt.cik, &cancel).await {
        Ok(financials) => {
            if financials.none_extractable() {
                eprintln!(
                    "filings found for CIK {}, but no facts could be extracted",
                    opt.cik
                );
            }
            println!("{}", serde_json::to_string_pretty(&financials)?);
            Ok(())
        }
        Err(EdgarError::NoFilings) => {
            eprintln!(
                "catalog for CIK {} contains none of: {}",
                opt.cik,
                FormType::known_forms()
            );
            std::process::exit(2);
        }
        Err(err) if err.is_transient() => {
            eprintln!("upstream temporarily unavailable: {}", err);
            std::process::exit(3);
        }
        Err(err) => Err(err.into()),
    }
}
