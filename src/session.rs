// =============================================================================
// Session — the working set shared by the menu loop and one-shot commands
// =============================================================================
//
// Holds the current ticker / date range and the last fetched series. Every
// action is written to the action log with its outcome; failures are returned
// to the caller for display and never end the session.
// =============================================================================

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;

use crate::action_log::{Action, ActionLog, Status};
use crate::analysis::{analyze, AnalysisSummary};
use crate::charts::generate_all;
use crate::forecast::{check_horizon, forecast_dates, run_baselines, ForecastResult};
use crate::market_data::{DataSource, PriceCache, YahooClient};
use crate::report::export_report;
use crate::runtime_config::AppConfig;
use crate::types::PriceSeries;

/// Baselines plus the weekdays they apply to.
#[derive(Debug, Clone)]
pub struct ForecastOutput {
    pub results: Vec<ForecastResult>,
    pub dates: Vec<NaiveDate>,
}

pub struct Session {
    config: AppConfig,
    source: DataSource,
    log: ActionLog,
    pub ticker: String,
    pub start: String,
    pub end: String,
    pub forecast_days: usize,
    /// Read only from the local cache, never download.
    pub offline: bool,
    data: Option<PriceSeries>,
}

impl Session {
    pub fn new(config: AppConfig) -> Result<Self> {
        let source = DataSource::new(YahooClient::new()?, PriceCache::new(&config.data_dir));
        let log = ActionLog::new(&config.log_file);
        Ok(Self {
            ticker: config.default_ticker.trim().to_uppercase(),
            start: config.start.clone(),
            end: config.end.clone(),
            forecast_days: config.forecast_days,
            offline: false,
            config,
            source,
            log,
            data: None,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Last fetched series, if any.
    pub fn data(&self) -> Option<&PriceSeries> {
        self.data.as_ref()
    }

    fn rows(&self) -> usize {
        self.data.as_ref().map_or(0, PriceSeries::len)
    }

    fn record<T>(&self, action: Action, outcome: &Result<T>, note: &str) {
        let (status, note) = match outcome {
            Ok(_) => (Status::Ok, note.to_string()),
            Err(e) => (Status::Error, format!("{e:#}")),
        };
        self.log.record(
            action,
            &self.ticker,
            &self.start,
            &self.end,
            self.rows(),
            status,
            &note,
        );
    }

    /// Record a failure that happened before the action could run.
    pub fn log_rejected(&self, action: Action, reason: &str) {
        let outcome: Result<()> = Err(anyhow::anyhow!("{reason}"));
        self.record(action, &outcome, "");
    }

    fn require_data(&self) -> Result<&PriceSeries> {
        self.data
            .as_ref()
            .context("no data yet, please fetch first")
    }

    // -------------------------------------------------------------------------
    // Actions
    // -------------------------------------------------------------------------

    /// Fetch (or reload from cache) the current ticker and range.
    pub async fn fetch(&mut self) -> Result<usize> {
        self.ticker = self.ticker.trim().to_uppercase();
        let started = Instant::now();

        let outcome = if self.offline {
            let series = self.source.read_offline(&self.ticker, &self.start, &self.end);
            if series.is_empty() {
                Err(anyhow::anyhow!("no cached data for {} (offline)", self.ticker))
            } else {
                Ok(series)
            }
        } else {
            self.source
                .fetch_data(&self.ticker, &self.start, &self.end, self.config.cache)
                .await
        };

        let note = format!("{}ms", started.elapsed().as_millis());
        match outcome {
            Ok(series) => {
                let rows = series.len();
                info!(
                    ticker = %self.ticker,
                    rows,
                    first = ?series.first_date(),
                    last = ?series.last_date(),
                    "data ready"
                );
                self.data = Some(series);
                self.record(Action::Fetch, &Ok(()), &note);
                Ok(rows)
            }
            Err(e) => {
                // A failed refresh leaves no stale data behind.
                self.data = None;
                let outcome: Result<()> = Err(e);
                self.record(Action::Fetch, &outcome, "");
                outcome.map(|_| 0)
            }
        }
    }

    pub fn analyze(&self) -> Result<AnalysisSummary> {
        let outcome = self
            .require_data()
            .and_then(|s| analyze(Some(s), self.config.analysis_options()).map_err(Into::into));
        self.record(Action::Analyze, &outcome, "");
        outcome
    }

    /// Fails when no data is loaded or `days` is outside the accepted horizon.
    pub fn forecast(&self, days: usize) -> Result<ForecastOutput> {
        let outcome = self.require_data().and_then(|s| {
            let days = check_horizon(days)?;
            Ok(self.baselines(s, days))
        });
        self.record(Action::Forecast, &outcome, &format!("{days}d"));
        outcome
    }

    pub fn visualize(&self) -> Result<Vec<PathBuf>> {
        let outcome = self.require_data().and_then(|s| {
            let forecast = self.baselines(s, check_horizon(self.forecast_days)?);
            generate_all(s, &self.ticker, &self.config, Some(&forecast.results))
        });
        self.record(Action::Visualize, &outcome, "");
        outcome
    }

    pub fn export(&self) -> Result<PathBuf> {
        let outcome = self
            .require_data()
            .and_then(|s| export_report(s, &self.ticker, &self.start, &self.end, &self.config));
        self.record(Action::Export, &outcome, "");
        outcome
    }

    fn baselines(&self, series: &PriceSeries, days: usize) -> ForecastOutput {
        let prices = series.values(self.config.analysis_options().price_field);
        let results = run_baselines(&prices, self.config.ma_window, days);
        let dates = series
            .last_date()
            .map(|last| forecast_dates(last, days))
            .unwrap_or_default();
        ForecastOutput { results, dates }
    }
}
