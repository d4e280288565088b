use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::cleaning::{clean_bars, RawBar};
use super::yahoo::YahooClient;
use crate::types::{PriceBar, PriceSeries};

// ---------------------------------------------------------------------------
// Date range helpers
// ---------------------------------------------------------------------------

/// `"today"` (any case) becomes the local date; anything else is returned
/// trimmed.
pub fn resolve_end(end: &str) -> String {
    let end = end.trim();
    if end.eq_ignore_ascii_case("today") {
        Local::now().date_naive().format("%Y-%m-%d").to_string()
    } else {
        end.to_string()
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date '{value}', expected YYYY-MM-DD"))
}

/// `{TICKER}_{start}_{end}.csv`
pub fn cache_file_name(ticker: &str, start: &str, end: &str) -> String {
    format!("{}_{}_{}.csv", ticker.trim().to_uppercase(), start, end)
}

// ---------------------------------------------------------------------------
// PriceCache -- one CSV file per (ticker, start, end)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct CacheRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open")]
    open: Option<f64>,
    #[serde(rename = "High")]
    high: Option<f64>,
    #[serde(rename = "Low")]
    low: Option<f64>,
    #[serde(rename = "Close")]
    close: Option<f64>,
    #[serde(rename = "Adj Close")]
    adj_close: Option<f64>,
    #[serde(rename = "Volume")]
    volume: Option<f64>,
}

impl From<&PriceBar> for CacheRow {
    fn from(bar: &PriceBar) -> Self {
        Self {
            date: bar.date,
            open: Some(bar.open),
            high: Some(bar.high),
            low: Some(bar.low),
            close: Some(bar.close),
            adj_close: Some(bar.adj_close),
            volume: Some(bar.volume),
        }
    }
}

impl From<CacheRow> for RawBar {
    fn from(row: CacheRow) -> Self {
        Self {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            // Files written without an adjusted column fall back to close.
            adj_close: row.adj_close.or(row.close),
            volume: row.volume,
        }
    }
}

/// Directory of cached price CSVs.
#[derive(Debug, Clone)]
pub struct PriceCache {
    dir: PathBuf,
}

impl PriceCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, ticker: &str, start: &str, end: &str) -> PathBuf {
        self.dir.join(cache_file_name(ticker, start, end))
    }

    /// Read and clean a cached series. `Ok(None)` when no file exists.
    pub fn load(&self, ticker: &str, start: &str, end: &str) -> Result<Option<PriceSeries>> {
        let path = self.path_for(ticker, start, end);
        if !path.exists() {
            return Ok(None);
        }
        read_csv(&path).map(Some)
    }

    /// Write `series` to the cache, creating the directory if needed.
    pub fn save(&self, ticker: &str, start: &str, end: &str, series: &PriceSeries) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create cache dir {}", self.dir.display()))?;

        let path = self.path_for(ticker, start, end);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to open {} for writing", path.display()))?;

        for bar in series.bars() {
            writer
                .serialize(CacheRow::from(bar))
                .with_context(|| format!("failed to write row to {}", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("failed to flush {}", path.display()))?;

        Ok(path)
    }
}

fn read_csv(path: &Path) -> Result<PriceSeries> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let rows = reader
        .deserialize::<CacheRow>()
        .map(|row| row.map(RawBar::from))
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("failed to parse {}", path.display()))?;

    Ok(clean_bars(rows))
}

// ---------------------------------------------------------------------------
// DataSource -- cache-first download
// ---------------------------------------------------------------------------

/// Cache-backed access to daily prices.
#[derive(Debug, Clone)]
pub struct DataSource {
    client: YahooClient,
    cache: PriceCache,
}

impl DataSource {
    pub fn new(client: YahooClient, cache: PriceCache) -> Self {
        Self { client, cache }
    }

    /// Cleaned daily series for `ticker` over `[start, end]`.
    ///
    /// With `use_cache`, a readable non-empty cache file short-circuits the
    /// download; an unreadable one is logged and ignored. A fresh download
    /// that comes back empty is an error. Saving to the cache never fails
    /// the call.
    pub async fn fetch_data(
        &self,
        ticker: &str,
        start: &str,
        end: &str,
        use_cache: bool,
    ) -> Result<PriceSeries> {
        let ticker = ticker.trim().to_uppercase();
        let end = resolve_end(end);
        let start_date = parse_date(start)?;
        let end_date = parse_date(&end)?;
        if start_date >= end_date {
            anyhow::bail!("start {start} must be before end {end}");
        }

        if use_cache {
            match self.cache.load(&ticker, start, &end) {
                Ok(Some(series)) if !series.is_empty() => {
                    info!(ticker = %ticker, rows = series.len(), "loaded from cache");
                    return Ok(series);
                }
                Ok(_) => {}
                Err(e) => warn!(ticker = %ticker, error = %e, "cache read failed, downloading"),
            }
        }

        let raw = self.client.get_daily(&ticker, start_date, end_date).await?;
        let series = clean_bars(raw);
        if series.is_empty() {
            anyhow::bail!("no data returned for {ticker} between {start} and {end}");
        }
        info!(ticker = %ticker, rows = series.len(), "downloaded");

        if use_cache {
            match self.cache.save(&ticker, start, &end, &series) {
                Ok(path) => info!(path = %path.display(), "cache saved"),
                Err(e) => warn!(ticker = %ticker, error = %e, "failed to save cache"),
            }
        }

        Ok(series)
    }

    /// Cache-only read. A missing or unreadable file yields an empty series.
    pub fn read_offline(&self, ticker: &str, start: &str, end: &str) -> PriceSeries {
        let ticker = ticker.trim().to_uppercase();
        let end = resolve_end(end);
        match self.cache.load(&ticker, start, &end) {
            Ok(Some(series)) => series,
            Ok(None) => {
                warn!(ticker = %ticker, start, end = %end, "no cached data available offline");
                PriceSeries::default()
            }
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "cached data unreadable");
                PriceSeries::default()
            }
        }
    }
}
