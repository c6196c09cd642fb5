//! Compliance screening entrypoint.
//!
//! Screens each address given on the command line and prints one JSON line per
//! address with the three independent signals: provider verdict, geo restriction
//! of the supplied origin, and allow-list membership.
//!
//! Usage: `compliance-screen [--config FILE] [--country CC] [--region CODE] ADDRESS...`
//!
//! Environment:
//! - `.env` values loaded at startup
//! - `COMPLIANCE_PROVIDER`, `RISK_API_*`, list and geoblocking variables configure the engine
//!   unless `--config` points at a TOML file
//! - `RUST_LOG` controls log verbosity

use dotenvy::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use aml_compliance::{ComplianceScreenerBuilder, Config, GeoOriginHeaders};

use crate::telemetry::Telemetry;

mod telemetry;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    origin: GeoOriginHeaders,
    addresses: Vec<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| args.next().ok_or_else(|| format!("{} requires a value", flag));
        match arg.as_str() {
            "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
            "--country" => parsed.origin.country = Some(value("--country")?),
            "--region" => parsed.origin.region = Some(value("--region")?),
            flag if flag.starts_with("--") => return Err(format!("unknown option {}", flag)),
            _ => parsed.addresses.push(arg),
        }
    }
    if parsed.addresses.is_empty() {
        return Err("no addresses given".to_string());
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env variables
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("usage: compliance-screen [--config FILE] [--country CC] [--region CODE] ADDRESS...");
            std::process::exit(2);
        }
    };

    let config = match &args.config {
        Some(path) => Config::from_file(path),
        None => Config::from_env(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load compliance configuration: {}", e);
            std::process::exit(1);
        }
    };

    let telemetry = Telemetry::new(env!("CARGO_PKG_NAME"));

    let screener = ComplianceScreenerBuilder::new()
        .with_config(config)
        .with_metrics(Arc::new(telemetry.metrics()))
        .build();
    let screener = match screener {
        Ok(screener) => screener,
        Err(e) => {
            tracing::error!("Failed to initialize compliance screener: {}", e);
            std::process::exit(1);
        }
    };

    let mut failures = 0;
    for address in &args.addresses {
        match screener.screen(address, &args.origin).await {
            Ok(signals) => println!("{}", serde_json::to_string(&signals)?),
            Err(e) => {
                failures += 1;
                tracing::error!(address = %address, "Screening failed: {}", e);
            }
        }
    }

    telemetry.shutdown();

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
