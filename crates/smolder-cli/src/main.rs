//! smolder - smoke-test runner CLI
//!
//! ## Commands
//!
//! - `smoke`: run the configured checks against a host and exit 0 on a
//!   passing run, 2 on a failing one (1 on setup faults)

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use url::Url;

use smolder_core::{ErrorGate, Outcome, RunReport, SmokeEngine, DEFAULT_ERROR_TOLERANCE};
use smolder_http::HttpPageProvider;

#[derive(Parser)]
#[command(name = "smolder")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Smoke-test orchestration for web hosts", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run smoke checks against a host
    Smoke {
        /// Base URL of the target host
        #[arg(long)]
        host: Url,

        /// Path to the check-list descriptor (JSON)
        #[arg(long)]
        config: PathBuf,

        /// Errored checks tolerated before the run fails
        #[arg(long, default_value_t = DEFAULT_ERROR_TOLERANCE)]
        error_tolerance: usize,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    smolder_core::init_tracing(cli.json, level);

    let result = match cli.command {
        Commands::Smoke {
            host,
            config,
            error_tolerance,
            timeout,
        } => cmd_smoke(host, &config, error_tolerance, timeout).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Run the smoke checks and map the settlement to an exit code.
async fn cmd_smoke(
    host: Url,
    config: &PathBuf,
    error_tolerance: usize,
    timeout: u64,
) -> Result<ExitCode> {
    let provider = HttpPageProvider::with_timeout(Duration::from_secs(timeout))
        .context("Failed to build HTTP client")?;

    let engine = SmokeEngine::from_config(host.clone(), config, Arc::new(provider))
        .with_context(|| format!("Failed to load check config {config:?}"))?
        .with_gate(ErrorGate::new(error_tolerance));

    println!("Running smoke checks against {host}");
    println!("Config: {}", config.display());
    println!();

    let outcome = engine.run().await.context("Smoke run could not start")?;
    print_report(outcome.report());

    if outcome.is_success() {
        println!("Result: ✓ PASSED");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Result: ✗ FAILED");
        Ok(ExitCode::from(2))
    }
}

fn print_report(report: &RunReport) {
    for outcome in report
        .passed
        .iter()
        .chain(report.failed.iter())
        .chain(report.errors.iter())
    {
        match outcome {
            Outcome::Passed {
                url,
                check,
                expected,
                actual,
            } => println!("  ✓ {check} {url} ({expected}, got {actual})"),
            Outcome::Failed {
                url,
                check,
                expected,
                actual,
            } => println!("  ✗ {check} {url} (expected {expected}, got {actual})"),
            Outcome::Errored { url, check, fault } => {
                println!("  ! {check} {url} (errored: {fault})")
            }
        }
    }

    println!();
    println!("Run ID: {}", report.run_id);
    println!("URLs tested: {}", report.urls_tested);
    println!("Duration: {}ms", report.duration_ms);
    println!(
        "Summary: {} passed, {} failed, {} errored",
        report.passed.len(),
        report.failed.len(),
        report.errors.len()
    );
}
