// =============================================================================
// Report Export — one summary row per analysis appended to a CSV file
// =============================================================================

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::analysis::{analyze, AnalysisSummary};
use crate::runtime_config::AppConfig;
use crate::types::{fmt_opt, fmt_opt_date, PriceSeries, NOT_AVAILABLE};

pub const REPORT_FILE_NAME: &str = "report_summary.csv";

/// Flat CSV row. Undefined metrics are written as `N/A`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub ticker: String,
    pub period: String,
    pub last_close: String,
    pub sma_trend: String,
    pub rsi: String,
    pub volatility_30d: String,
    pub max_drawdown: String,
    pub dd_start: String,
    pub dd_end: String,
}

impl ReportRow {
    pub fn new(ticker: &str, start: &str, end: &str, summary: &AnalysisSummary) -> Self {
        Self {
            ticker: ticker.to_string(),
            period: format!("{start} → {end}"),
            last_close: format!("{:.2}", summary.last_close),
            sma_trend: summary.sma_trend.to_string(),
            rsi: summary
                .rsi
                .map_or_else(|| NOT_AVAILABLE.to_string(), |r| r.to_string()),
            volatility_30d: fmt_opt(summary.volatility_30d_pct),
            max_drawdown: fmt_opt(summary.max_drawdown_pct),
            dd_start: fmt_opt_date(summary.drawdown_start),
            dd_end: fmt_opt_date(summary.drawdown_end),
        }
    }
}

/// Analyze `series` and append the summary to `<export_dir>/report_summary.csv`.
///
/// The header is written only when the file is created.
pub fn export_report(
    series: &PriceSeries,
    ticker: &str,
    start: &str,
    end: &str,
    config: &AppConfig,
) -> Result<PathBuf> {
    let summary = analyze(Some(series), config.analysis_options())?;
    let row = ReportRow::new(ticker, start, end, &summary);
    let path = config.export_dir.join(REPORT_FILE_NAME);

    append_row(&path, &row)?;
    info!(ticker, path = %path.display(), "report row appended");
    Ok(path)
}

fn append_row(path: &Path, row: &ReportRow) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create export dir {}", dir.display()))?;
    }

    let is_new = !path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(is_new)
        .from_writer(file);
    writer
        .serialize(row)
        .with_context(|| format!("failed to write report row to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}
