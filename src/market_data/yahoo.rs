// =============================================================================
// Yahoo Finance chart client — daily OHLCV history over REST
// =============================================================================
//
// GET /v8/finance/chart/{ticker}?period1=..&period2=..&interval=1d
//
// `period1` / `period2` are UNIX seconds at UTC midnight; `period2` is
// exclusive. Bar timestamps are shifted by the exchange `gmtoffset` before
// being truncated to a date, so every bar lands on its local trading day.
// =============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::cleaning::RawBar;

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; stocksense/1.0)";

/// Thin REST client for the Yahoo chart endpoint.
#[derive(Debug, Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(BASE_URL)
    }

    /// Client pointed at another host (mirrors, local fixtures).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Daily bars for `ticker` in `[start, end)`.
    #[instrument(skip(self), name = "yahoo::get_daily")]
    pub async fn get_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>> {
        let url = format!(
            "{}/{}?period1={}&period2={}&interval=1d&includeAdjustedClose=true",
            self.base_url,
            ticker,
            unix_midnight(start),
            unix_midnight(end),
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET chart for {ticker} request failed"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .context("failed to read chart response body")?;

        // Yahoo reports unknown tickers as 404 with a JSON error payload.
        if !status.is_success() {
            match parse_chart(&body) {
                Err(e) => anyhow::bail!("Yahoo chart for {ticker} returned {status}: {e:#}"),
                Ok(_) => anyhow::bail!("Yahoo chart for {ticker} returned {status}"),
            }
        }

        let rows = parse_chart(&body)?;
        debug!(ticker, rows = rows.len(), "chart rows downloaded");
        Ok(rows)
    }
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Response payload
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
    #[serde(default)]
    adjclose: Vec<AdjCloseColumn>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseColumn {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Parse a chart payload into raw rows (columns zipped by timestamp).
///
/// A missing adjusted-close column falls back to the close column. Rows stay
/// unfiltered; dropping incomplete rows is the cleaner's job.
pub fn parse_chart(body: &str) -> Result<Vec<RawBar>> {
    let resp: ChartResponse =
        serde_json::from_str(body).context("failed to parse chart response")?;

    if let Some(err) = resp.chart.error {
        anyhow::bail!("Yahoo API error [{}]: {}", err.code, err.description);
    }

    let Some(data) = resp.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };

    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = data
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|c| c.adjclose)
        .unwrap_or_else(|| quote.close.clone());

    let at = |col: &[Option<f64>], i: usize| col.get(i).copied().flatten();
    let offset = data.meta.gmtoffset;

    let rows = data
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let date = DateTime::from_timestamp(ts + offset, 0)?.date_naive();
            Some(RawBar {
                date,
                open: at(&quote.open, i),
                high: at(&quote.high, i),
                low: at(&quote.low, i),
                close: at(&quote.close, i),
                adj_close: at(&adjclose, i),
                volume: at(&quote.volume, i),
            })
        })
        .collect();

    Ok(rows)
}
