use chrono::NaiveDate;
use tracing::debug;

use crate::types::{PriceBar, PriceSeries};

// ---------------------------------------------------------------------------
// Raw rows
// ---------------------------------------------------------------------------

/// One row as delivered by a data source, before cleaning. Any price may be
/// missing (holidays, halted sessions, partial days).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<f64>,
}

impl RawBar {
    /// Complete bar, or `None` when the close or adjusted close is missing
    /// or not finite. Missing open/high/low fall back to the close.
    fn complete(self) -> Option<PriceBar> {
        let close = self.close.filter(|v| v.is_finite())?;
        let adj_close = self.adj_close.filter(|v| v.is_finite())?;
        let or_close = |v: Option<f64>| v.filter(|v| v.is_finite()).unwrap_or(close);

        Some(PriceBar {
            date: self.date,
            open: or_close(self.open),
            high: or_close(self.high),
            low: or_close(self.low),
            close,
            adj_close,
            volume: self.volume.filter(|v| v.is_finite()).unwrap_or(0.0),
        })
    }
}

/// Turn raw rows into a [`PriceSeries`]: rows without a close are dropped,
/// duplicate dates keep the last occurrence, dates end up ascending.
pub fn clean_bars(raw: Vec<RawBar>) -> PriceSeries {
    let total = raw.len();
    let bars: Vec<PriceBar> = raw.into_iter().filter_map(RawBar::complete).collect();
    let kept = bars.len();

    let series = PriceSeries::from_bars(bars);
    debug!(
        raw = total,
        incomplete = total - kept,
        duplicates = kept - series.len(),
        rows = series.len(),
        "price rows cleaned"
    );
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PriceField;

    fn raw(day: u32, close: Option<f64>) -> RawBar {
        RawBar {
            date: NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            close,
            adj_close: close,
            ..RawBar::default()
        }
    }

    #[test]
    fn drops_rows_missing_close() {
        let series = clean_bars(vec![raw(1, Some(1.0)), raw(2, None), raw(3, Some(f64::NAN))]);
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn drops_rows_missing_adjusted_close() {
        let mut row = raw(1, Some(5.0));
        row.adj_close = None;
        assert!(clean_bars(vec![row]).is_empty());
    }

    #[test]
    fn duplicate_dates_keep_last_and_sort() {
        let series = clean_bars(vec![
            raw(5, Some(50.0)),
            raw(2, Some(20.0)),
            raw(5, Some(55.0)),
        ]);
        assert_eq!(series.values(PriceField::Close), vec![20.0, 55.0]);
        assert_eq!(
            series.first_date(),
            Some(NaiveDate::from_ymd_opt(2024, 2, 2).unwrap())
        );
    }

    #[test]
    fn missing_ohl_fall_back_to_close() {
        let series = clean_bars(vec![raw(1, Some(9.0))]);
        let bar = &series.bars()[0];
        assert_eq!((bar.open, bar.high, bar.low), (9.0, 9.0, 9.0));
        assert_eq!(bar.volume, 0.0);
    }
}
