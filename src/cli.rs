use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::display;
use crate::menu;
use crate::runtime_config::DEFAULT_CONFIG_PATH;
use crate::session::Session;

#[derive(Parser, Debug)]
#[command(name = "stocksense")]
#[command(about = "Daily stock indicators, baseline forecasts and reports", long_about = None)]
pub struct Cli {
    /// Path to the JSON config file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Use cached data only; never download
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Overrides for the configured ticker and date range.
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// Ticker symbol, e.g. AAPL
    #[arg(short, long)]
    pub ticker: Option<String>,
    /// Start date (YYYY-MM-DD)
    #[arg(short, long)]
    pub start: Option<String>,
    /// End date (YYYY-MM-DD or "today")
    #[arg(short, long)]
    pub end: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive menu (default)
    Menu,
    /// Fetch data into the cache
    Fetch {
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Fetch and print the indicator summary
    Analyze {
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Fetch and print baseline forecasts
    Forecast {
        #[command(flatten)]
        range: RangeArgs,
        /// Forecast horizon in trading days
        #[arg(short, long)]
        days: Option<usize>,
    },
    /// Fetch, analyze and append to the summary report
    Export {
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Write the effective settings to the config file
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
}

impl RangeArgs {
    fn apply(self, session: &mut Session) {
        if let Some(t) = self.ticker {
            session.ticker = t.trim().to_uppercase();
        }
        if let Some(s) = self.start {
            session.start = s;
        }
        if let Some(e) = self.end {
            session.end = e;
        }
    }
}

/// Run one parsed command against `session`. `config_path` is where `init`
/// writes.
pub async fn dispatch(
    command: Option<Commands>,
    config_path: &Path,
    mut session: Session,
) -> Result<()> {
    match command.unwrap_or(Commands::Menu) {
        Commands::Menu => menu::run(session).await,
        Commands::Fetch { range } => {
            range.apply(&mut session);
            let rows = session.fetch().await?;
            println!("✓ Data ready. Rows: {rows}");
            Ok(())
        }
        Commands::Analyze { range } => {
            range.apply(&mut session);
            session.fetch().await?;
            let summary = session.analyze()?;
            println!(
                "{}",
                display::format_summary(&summary, &session.ticker, &session.start, &session.end)
            );
            Ok(())
        }
        Commands::Forecast { range, days } => {
            range.apply(&mut session);
            let days = days.unwrap_or(session.forecast_days);
            session.fetch().await?;
            let out = session.forecast(days)?;
            println!("{}", display::format_forecast(&out.results, &out.dates));
            Ok(())
        }
        Commands::Export { range } => {
            range.apply(&mut session);
            session.fetch().await?;
            let path = session.export()?;
            println!("✓ Report exported to {}", path.display());
            Ok(())
        }
        Commands::Init { force } => {
            session.config().save(config_path, force)?;
            println!("✓ Config written to {}", config_path.display());
            Ok(())
        }
    }
}
