// =============================================================================
// Charts — static SVG line charts written to the export folder
// =============================================================================
//
//   {TICKER}_price.svg     close price
//   {TICKER}_sma20.svg     close + 20-day SMA (gaps while undefined) + EMA
//   {TICKER}_forecast.svg  close + every non-empty baseline forecast
//
// X is the calendar day number so forecast dates line up with history.
// =============================================================================

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use tracing::info;

use crate::forecast::{forecast_dates, ForecastResult};
use crate::indicators::IndicatorSet;
use crate::runtime_config::AppConfig;
use crate::types::{ForecastMethod, PriceField, PriceSeries};

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 500.0;
const MARGIN: f64 = 60.0;
const CHART_SMA_WINDOW: usize = 20;

/// One polyline. `None` values break the line.
#[derive(Debug, Clone)]
pub struct Line {
    pub label: String,
    pub color: &'static str,
    pub points: Vec<(NaiveDate, Option<f64>)>,
}

impl Line {
    fn from_values(
        label: impl Into<String>,
        color: &'static str,
        dates: &[NaiveDate],
        values: &[Option<f64>],
    ) -> Self {
        Self {
            label: label.into(),
            color,
            points: dates.iter().copied().zip(values.iter().copied()).collect(),
        }
    }
}

/// Write the price, SMA and (optionally) forecast charts for `series`.
pub fn generate_all(
    series: &PriceSeries,
    ticker: &str,
    config: &AppConfig,
    forecast: Option<&[ForecastResult]>,
) -> Result<Vec<PathBuf>> {
    if series.is_empty() {
        anyhow::bail!("no data to chart for {ticker}");
    }

    std::fs::create_dir_all(&config.export_dir).with_context(|| {
        format!("failed to create export dir {}", config.export_dir.display())
    })?;

    let ticker = ticker.trim().to_uppercase();
    let indicators = IndicatorSet::new(series, PriceField::Close)?;
    let dates = series.dates();
    let close_line = Line::from_values(
        "Close Price",
        "#1f77b4",
        &dates,
        &indicators.prices().iter().copied().map(Some).collect::<Vec<_>>(),
    );

    let mut written = Vec::new();

    let path = config.export_dir.join(format!("{ticker}_price.svg"));
    write_chart(&path, &format!("{ticker} Closing Price"), &[close_line.clone()])?;
    written.push(path);

    let sma = Line::from_values(
        format!("{CHART_SMA_WINDOW}-Day MA"),
        "#d62728",
        &dates,
        &indicators.sma(CHART_SMA_WINDOW),
    );
    let ema = Line::from_values(
        format!("{CHART_SMA_WINDOW}-Day EMA"),
        "#9467bd",
        &dates,
        &indicators
            .ema(CHART_SMA_WINDOW)
            .into_iter()
            .map(Some)
            .collect::<Vec<_>>(),
    );
    let path = config.export_dir.join(format!("{ticker}_sma20.svg"));
    write_chart(
        &path,
        &format!("{ticker} Price with {CHART_SMA_WINDOW}-Day Moving Averages"),
        &[close_line.clone(), sma, ema],
    )?;
    written.push(path);

    if let (Some(results), Some(last)) = (forecast, series.last_date()) {
        let mut lines = vec![close_line];
        for result in results.iter().filter(|r| !r.is_empty()) {
            let future = forecast_dates(last, result.values.len());
            let color = match result.method {
                ForecastMethod::MovingAverage => "#2ca02c",
                ForecastMethod::LinearTrend => "#ff7f0e",
            };
            let values: Vec<Option<f64>> = result.values.iter().copied().map(Some).collect();
            lines.push(Line::from_values(result.method.to_string(), color, &future, &values));
        }
        let path = config.export_dir.join(format!("{ticker}_forecast.svg"));
        write_chart(&path, &format!("{ticker} Price vs Forecast"), &lines)?;
        written.push(path);
    }

    info!(ticker = %ticker, charts = written.len(), dir = %config.export_dir.display(), "charts written");
    Ok(written)
}

fn write_chart(path: &Path, title: &str, lines: &[Line]) -> Result<()> {
    std::fs::write(path, render_svg(title, lines))
        .with_context(|| format!("failed to write chart {}", path.display()))
}

// ---------------------------------------------------------------------------
// SVG rendering
// ---------------------------------------------------------------------------

fn day_number(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

/// Render `lines` on shared axes.
pub fn render_svg(title: &str, lines: &[Line]) -> String {
    let defined = lines
        .iter()
        .flat_map(|l| l.points.iter())
        .filter_map(|&(d, v)| v.filter(|v| v.is_finite()).map(|v| (day_number(d), v)));

    let (mut x_min, mut x_max, mut y_min, mut y_max) =
        (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
    for (x, y) in defined {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if x_min > x_max {
        (x_min, x_max, y_min, y_max) = (0.0, 1.0, 0.0, 1.0);
    }
    if (x_max - x_min).abs() < f64::EPSILON {
        x_max = x_min + 1.0;
    }
    if (y_max - y_min).abs() < f64::EPSILON {
        y_min -= 1.0;
        y_max += 1.0;
    }

    let plot_w = WIDTH - 2.0 * MARGIN;
    let plot_h = HEIGHT - 2.0 * MARGIN;
    let sx = |x: f64| MARGIN + (x - x_min) / (x_max - x_min) * plot_w;
    let sy = |y: f64| HEIGHT - MARGIN - (y - y_min) / (y_max - y_min) * plot_h;

    let mut svg = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="30" font-family="sans-serif" font-size="18" text-anchor="middle">{}</text>"#,
        WIDTH / 2.0,
        escape(title)
    );

    // Axes and gridlines.
    let _ = writeln!(
        svg,
        r##"<rect x="{MARGIN}" y="{MARGIN}" width="{plot_w}" height="{plot_h}" fill="none" stroke="#444"/>"##
    );
    for i in 0..=4 {
        let value = y_min + (y_max - y_min) * f64::from(i) / 4.0;
        let y = sy(value);
        let _ = writeln!(
            svg,
            r##"<line x1="{MARGIN}" y1="{y:.1}" x2="{}" y2="{y:.1}" stroke="#ddd"/>"##,
            WIDTH - MARGIN
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{:.1}" font-family="sans-serif" font-size="11" text-anchor="end">{value:.2}</text>"#,
            MARGIN - 6.0,
            y + 4.0
        );
    }
    for (x, anchor) in [(x_min, "start"), (x_max, "end")] {
        let label = NaiveDate::from_num_days_from_ce_opt(x as i32)
            .map(|d| d.to_string())
            .unwrap_or_default();
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{}" font-family="sans-serif" font-size="11" text-anchor="{anchor}">{label}</text>"#,
            sx(x),
            HEIGHT - MARGIN + 18.0
        );
    }

    for (i, line) in lines.iter().enumerate() {
        for segment in segments(&line.points) {
            let pts: Vec<String> = segment
                .iter()
                .map(|&(d, v)| format!("{:.1},{:.1}", sx(day_number(d)), sy(v)))
                .collect();
            let _ = writeln!(
                svg,
                r#"<polyline fill="none" stroke="{}" stroke-width="1.5" points="{}"/>"#,
                line.color,
                pts.join(" ")
            );
        }

        // Legend.
        let ly = MARGIN + 16.0 * i as f64 + 12.0;
        let _ = writeln!(
            svg,
            r#"<line x1="{}" y1="{ly}" x2="{}" y2="{ly}" stroke="{}" stroke-width="3"/>"#,
            MARGIN + 10.0,
            MARGIN + 30.0,
            line.color
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" font-family="sans-serif" font-size="12">{}</text>"#,
            MARGIN + 36.0,
            ly + 4.0,
            escape(&line.label)
        );
    }

    svg.push_str("</svg>\n");
    svg
}

/// Split points into runs of consecutive defined values.
fn segments(points: &[(NaiveDate, Option<f64>)]) -> Vec<Vec<(NaiveDate, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for &(d, v) in points {
        match v.filter(|v| v.is_finite()) {
            Some(v) => current.push((d, v)),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
