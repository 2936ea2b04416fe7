//! # Fleet Loader
//!
//! Registers car rental companies from fleet files.
//!
//! ## Usage
//! ```bash
//! # Load two companies into ./rental.db
//! cargo run -p rental-db --bin rental-load -- Hertz=hertz.csv Avis=avis.csv
//!
//! # Other database, machine-readable summary
//! cargo run -p rental-db --bin rental-load -- --db ./data/rental.db --json Hertz=hertz.csv
//!
//! # Settings file (database_path, database_max_connections, log_level)
//! cargo run -p rental-db --bin rental-load -- --config rental.toml Hertz=hertz.csv
//! ```
//!
//! A company whose file cannot be read or parsed is logged and skipped; the
//! others are still loaded. The exit status is non-zero if any company failed.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use rental_db::{Database, RentalSettings};
use rental_session::{LoadSummary, ManagerSession};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rental-load")]
#[command(about = "Register car rental companies from fleet files")]
struct Args {
    /// SQLite database file (overrides settings)
    #[arg(long)]
    db: Option<PathBuf>,

    /// TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Companies to load, as NAME=FILE
    #[arg(required = true, value_parser = parse_company_file)]
    companies: Vec<(String, PathBuf)>,
}

fn parse_company_file(arg: &str) -> Result<(String, PathBuf), String> {
    match arg.split_once('=') {
        Some((name, path)) if !name.trim().is_empty() && !path.trim().is_empty() => {
            Ok((name.trim().to_string(), PathBuf::from(path.trim())))
        }
        _ => Err(format!("expected NAME=FILE, got '{arg}'")),
    }
}

#[derive(Debug, Serialize)]
struct Report {
    loaded: Vec<LoadSummary>,
    failed: Vec<Failure>,
}

#[derive(Debug, Serialize)]
struct Failure {
    company: String,
    error: String,
}

/// Installs the fmt subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},sqlx=warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut settings = RentalSettings::load(args.config.as_deref())?;
    if let Some(db) = args.db {
        settings.database_path = db;
    }
    init_tracing(&settings.log_level);

    let db = Database::new(settings.db_config()).await?;
    let manager = ManagerSession::new(Arc::new(db.store()));

    let mut report = Report {
        loaded: Vec::new(),
        failed: Vec::new(),
    };

    for (company, path) in args.companies {
        let result = match std::fs::read_to_string(&path) {
            Ok(fleet) => manager
                .load_company(&company, &fleet)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(format!("cannot read {}: {e}", path.display())),
        };

        match result {
            Ok(summary) => report.loaded.push(summary),
            Err(e) => {
                error!(company = %company, file = %path.display(), error = %e, "Company not loaded");
                report.failed.push(Failure { company, error: e });
            }
        }
    }

    info!(
        loaded = report.loaded.len(),
        failed = report.failed.len(),
        "Load finished"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for summary in &report.loaded {
            println!(
                "✓ {}: {} car types, {} cars",
                summary.company, summary.car_types, summary.cars
            );
        }
        for failure in &report.failed {
            println!("✗ {}: {}", failure.company, failure.error);
        }
    }

    db.close().await;

    Ok(if report.failed.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
