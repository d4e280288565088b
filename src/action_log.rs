use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use tracing::warn;

/// User-level action recorded in the action log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Fetch,
    Analyze,
    Visualize,
    Forecast,
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Error,
}

#[derive(Debug, Serialize)]
struct LogLine<'a> {
    timestamp: String,
    action: Action,
    ticker: &'a str,
    start: &'a str,
    end: &'a str,
    rows: usize,
    status: Status,
    note: &'a str,
}

/// Append-only CSV audit trail: one headerless line per action.
#[derive(Debug, Clone)]
pub struct ActionLog {
    path: PathBuf,
}

impl ActionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one line. A failed write is logged and otherwise ignored.
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &self,
        action: Action,
        ticker: &str,
        start: &str,
        end: &str,
        rows: usize,
        status: Status,
        note: &str,
    ) {
        let line = LogLine {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            action,
            ticker,
            start,
            end,
            rows,
            status,
            note,
        };
        if let Err(e) = self.append(&line) {
            warn!(path = %self.path.display(), error = %e, "could not write action log (ignoring)");
        }
    }

    fn append(&self, line: &LogLine<'_>) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(line).context("failed to serialise log line")?;
        writer.flush().context("failed to flush action log")?;
        Ok(())
    }
}
