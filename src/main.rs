//! Address Risk CLI
//!
//! Usage:
//!   address_risk <ADDRESS> [--json] [--payload <FILE>]
//!
//! With `--payload`, the risk data is read from a saved API response and no
//! request is made (the credential is not needed).
//!
//! Environment:
//!   WEBACY_API_KEY     - Risk API credential
//!   RISK_API_BASE_URL  - Override the API base URL
//!   RUST_LOG           - Log level (default: warn)

use address_risk::{AddressReport, ClassifiedAddress, RiskPayload, RiskQueryService};

use clap::Parser;
use eyre::{Result, WrapErr};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "address_risk", version, about = "Risk assessment for EVM and Solana addresses")]
struct Cli {
    /// EVM (0x...) or Solana address
    address: String,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Read the risk payload from a file instead of the API
    #[arg(long, value_name = "FILE")]
    payload: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so --json output stays clean
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let address = cli.address.trim();

    let report = match &cli.payload {
        Some(path) => {
            let classified = ClassifiedAddress::parse(address)?;
            let raw = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("Failed to read payload file {}", path.display()))?;
            let payload = RiskPayload::from_json_str(&raw)
                .wrap_err_with(|| format!("Invalid payload JSON in {}", path.display()))?;
            AddressReport::build(&classified, &payload)
        }
        None => {
            let service = RiskQueryService::from_env()?;
            service.fetch_report(address).await?
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary());
    }

    Ok(())
}
