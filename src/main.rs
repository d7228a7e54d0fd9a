// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Form Audit - Standalone CLI
 * Runs one audit against a seed URL and prints the outcome
 *
 * (c) 2026 Bountyy Oy
 */

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{error, info, warn, Level};

use formaudit::config::AuditConfig;
use formaudit::engine::AuditEngine;
use formaudit::reporting::render_markdown;
use formaudit::session::CancelHandle;
use formaudit::types::ScanOutcome;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
}

/// Form Audit - unauthenticated crawl and form prober
#[derive(Parser)]
#[command(name = "formaudit")]
#[command(version)]
#[command(about = "Crawls a site, probes its forms and reports weak spots.", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from
    seed_url: String,

    /// Opaque id used to correlate stored progress
    #[arg(long)]
    session_id: Option<String>,

    /// Maximum concurrent page fetches
    #[arg(long)]
    concurrency: Option<usize>,

    /// Maximum pages to fetch (0 = unbounded)
    #[arg(long)]
    max_pages: Option<usize>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Skip the login brute-force prober
    #[arg(long)]
    no_brute_force: bool,

    /// Skip the injection prober
    #[arg(long)]
    no_injection: bool,

    /// Skip the upload prober
    #[arg(long)]
    no_upload: bool,

    /// Output file path (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = build_config(&cli)?;
    let engine = AuditEngine::new(config).context("Failed to initialise audit engine")?;

    let session_id = cli
        .session_id
        .clone()
        .unwrap_or_else(|| format!("scan-{}", chrono::Utc::now().timestamp_millis()));

    let cancel = CancelHandle::new();
    let signal_handle = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, terminating scan");
            signal_handle.cancel();
        }
    });

    info!("Form Audit v{} - session {}", env!("CARGO_PKG_VERSION"), session_id);

    let outcome = match engine
        .run_audit_with_cancel(&cli.seed_url, &session_id, cancel)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Audit failed: {}", e);
            return Err(e.into());
        }
    };

    write_outcome(&outcome, cli.format, cli.output.as_ref())
}

fn build_config(cli: &Cli) -> Result<AuditConfig> {
    let mut config = AuditConfig::from_env()?;

    if let Some(concurrency) = cli.concurrency {
        config.max_concurrency = concurrency;
    }
    if let Some(max_pages) = cli.max_pages {
        config.max_pages = max_pages;
    }
    if let Some(timeout) = cli.timeout {
        config.request_timeout_secs = timeout;
    }
    config.enable_brute_force &= !cli.no_brute_force;
    config.enable_injection &= !cli.no_injection;
    config.enable_upload_probe &= !cli.no_upload;

    Ok(config)
}

fn write_outcome(outcome: &ScanOutcome, format: OutputFormat, output: Option<&PathBuf>) -> Result<()> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(outcome)?,
        OutputFormat::Markdown => render_markdown(&outcome.report),
    };

    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Results written to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
