use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::analysis::AnalysisSummary;
use crate::forecast::ForecastResult;
use crate::types::{fmt_opt, fmt_opt_date, NOT_AVAILABLE};

const RULE_WIDTH: usize = 50;

pub fn rule(ch: char) -> String {
    std::iter::repeat(ch).take(RULE_WIDTH).collect()
}

/// Multi-line summary block for the terminal.
pub fn format_summary(summary: &AnalysisSummary, ticker: &str, start: &str, end: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule('='));
    let _ = writeln!(out, " Analysis: {ticker}  ({start} → {end})");
    let _ = writeln!(out, "{}", rule('-'));
    let _ = writeln!(out, " {:<18} {:.2}", "Last close", summary.last_close);
    let _ = writeln!(out, " {:<18} {}", "SMA trend", summary.sma_trend);
    let _ = writeln!(
        out,
        " {:<18} {}",
        "RSI(14)",
        summary
            .rsi
            .map_or_else(|| NOT_AVAILABLE.to_string(), |r| r.to_string())
    );
    let _ = writeln!(
        out,
        " {:<18} {}",
        "Volatility (30d)",
        summary
            .volatility_30d_pct
            .map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v:.2}%"))
    );
    let _ = writeln!(
        out,
        " {:<18} {}",
        "Max drawdown",
        summary
            .max_drawdown_pct
            .map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v:.2}%"))
    );
    let _ = writeln!(
        out,
        " {:<18} {} → {}",
        "Drawdown period",
        fmt_opt_date(summary.drawdown_start),
        fmt_opt_date(summary.drawdown_end)
    );
    let _ = write!(out, "{}", rule('='));
    out
}

/// One column per method, one row per forecast date.
pub fn format_forecast(results: &[ForecastResult], dates: &[NaiveDate]) -> String {
    let mut out = String::new();
    let _ = write!(out, "{:<12}", "Date");
    for r in results {
        let _ = write!(out, " {:>16}", r.method.to_string());
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", rule('-'));

    for (i, date) in dates.iter().enumerate() {
        let _ = write!(out, "{:<12}", date.to_string());
        for r in results {
            let _ = write!(out, " {:>16}", fmt_opt(r.values.get(i).copied()));
        }
        let _ = writeln!(out);
    }

    for r in results.iter().filter(|r| r.is_empty()) {
        let _ = writeln!(out, "[!] {}: not enough history", r.method);
    }
    out.trim_end().to_string()
}
