//! `repoprobe`: command-line front end for the repository analyzer.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load configuration ([`repoprobe::config::load_config`]) and resolve the token.
//! 3. Run the analysis ([`repoprobe::analyze`]) behind a spinner.
//! 4. Render JSON or the terminal report ([`report`]).
//! 5. Exit `0`, or print `Error: …` and exit `1`.

mod cli;
mod report;

use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use cli::{Cli, ReportFormat};
use repoprobe::config::load_config;
use repoprobe::models::AnalysisResult;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cwd = std::env::current_dir()?;
    let config = load_config(&cwd, cli.config.as_deref())?;
    let env_token = std::env::var("GITHUB_TOKEN").ok();
    let client_config = config.client_config(cli.token.as_deref(), env_token.as_deref());

    let progress = (!cli.quiet).then(|| spinner(&cli.repo));
    let outcome = repoprobe::analyze(&cli.repo, client_config).await;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    let result = outcome?;

    if let Some(field) = &cli.field {
        let value = select_field(&result, field)?;
        println!("{}", to_json(&value, cli.pretty)?);
        return Ok(());
    }

    match cli.report {
        ReportFormat::Terminal => report::terminal::render(&result)?,
        ReportFormat::Json => println!("{}", to_json(&result, cli.pretty)?),
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn spinner(repo: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(format!("Analyzing {}", repo));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// One top-level field of the serialized result.
fn select_field(result: &AnalysisResult, field: &str) -> Result<serde_json::Value> {
    let mut value = serde_json::to_value(result)?;
    value
        .get_mut(field)
        .map(serde_json::Value::take)
        .ok_or_else(|| {
            anyhow!(
                "unknown field '{}' (available: {})",
                field,
                AnalysisResult::FIELDS.join(", ")
            )
        })
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}
