// =============================================================================
// StockSense — Main Entry Point
// =============================================================================
//
// Interactive menu by default; one-shot subcommands for scripting. Config is
// read from `config.json` (or `--config`) and falls back to defaults.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod action_log;
mod analysis;
mod charts;
mod cli;
mod display;
mod error;
mod forecast;
mod indicators;
mod market_data;
mod menu;
mod report;
mod runtime_config;
mod session;
mod types;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::runtime_config::AppConfig;
use crate::session::Session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // ── 2. Config ────────────────────────────────────────────────────────
    let mut config = AppConfig::load(&cli.config).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    config.apply_env_overrides();

    info!(
        ticker = %config.default_ticker,
        start = %config.start,
        end = %config.end,
        market = %config.market,
        cache = config.cache,
        "StockSense starting"
    );

    // ── 3. Run ───────────────────────────────────────────────────────────
    let mut session = Session::new(config)?;
    session.offline = cli.offline;
    cli::dispatch(cli.command, &cli.config, session).await
}
