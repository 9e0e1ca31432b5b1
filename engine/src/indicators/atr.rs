// Average True Range (ATR) and the stop prices derived from it
use super::LevelCalculator;
use crate::config::PolicyParams;
use serde_json::Value;
use shared::models::{BarSeries, MarketBar};
use shared::snapshot::AtrEstimate;

pub struct AverageTrueRange {
    name: String,
    period: usize,
    stop_multiplier: f64,
}

impl AverageTrueRange {
    pub fn new(params: &PolicyParams) -> Self {
        Self {
            name: format!("ATR({})", params.atr_period),
            period: params.atr_period,
            stop_multiplier: params.atr_stop_multiplier,
        }
    }
}

/// Largest of the session range and the two gaps against the previous close.
pub fn true_range(bar: &MarketBar, prev_close: f64) -> f64 {
    (bar.high - bar.low)
        .max((bar.high - prev_close).abs())
        .max((bar.low - prev_close).abs())
}

impl LevelCalculator for AverageTrueRange {
    type Output = Option<AtrEstimate>;

    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period, "stop_multiplier": self.stop_multiplier })
    }

    /// Simple mean of `period` true ranges, not Wilder's smoothing.
    fn calculate(&self, bars: &BarSeries) -> Option<AtrEstimate> {
        if self.period == 0 || bars.len() < self.period + 1 {
            return None;
        }
        let latest = bars.latest()?;

        // chaining needs oldest first; sort a private copy, the series stays as it is
        let mut chain: Vec<MarketBar> = bars.recent(self.period + 1).to_vec();
        chain.sort_by_key(|bar| bar.date);

        let total: f64 = chain
            .windows(2)
            .map(|pair| true_range(&pair[1], pair[0].close))
            .sum();
        let value = total / self.period as f64;

        Some(AtrEstimate {
            value,
            buy_stop: latest.close - self.stop_multiplier * value,
            sell_stop: latest.close + self.stop_multiplier * value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    const EPS: f64 = 1e-9;

    // (high, low, close) tuples, oldest first
    fn create_series_oldest_first(rows: &[(f64, f64, f64)]) -> BarSeries {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = rows
            .iter()
            .enumerate()
            .map(|(i, &(high, low, close))| MarketBar::new(base + Duration::days(i as i64), close, high, low, close))
            .collect();
        BarSeries::from_unordered(bars)
    }

    #[test]
    fn test_true_range_picks_largest_spread() {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bar = MarketBar::new(base, 10.0, 12.0, 9.0, 11.0);
        assert_eq!(true_range(&bar, 10.0), 3.0); // high - low
        assert_eq!(true_range(&bar, 6.0), 6.0); // gap up: high - prev close
        assert_eq!(true_range(&bar, 15.0), 6.0); // gap down: prev close - low
    }

    #[test]
    fn test_atr_hand_computed_fifteen_sessions() {
        // oldest bar only supplies the first previous close
        let mut rows = vec![(101.0, 99.0, 100.0)];
        // 10 quiet sessions: range 2, no gaps -> TR 2
        for _ in 0..10 {
            rows.push((101.0, 99.0, 100.0));
        }
        // gap up: prev close 100, high 106, low 104 -> TR 6
        rows.push((106.0, 104.0, 105.0));
        // wide session: range 8 -> TR 8
        rows.push((109.0, 101.0, 102.0));
        // gap down: prev close 102, high 97, low 95 -> TR 7
        rows.push((97.0, 95.0, 96.0));
        // inside session: range 3, |98-96| = 2, |95-96| = 1 -> TR 3
        rows.push((98.0, 95.0, 97.0));
        assert_eq!(rows.len(), 15);

        let series = create_series_oldest_first(&rows);
        let before = series.clone();
        let atr = AverageTrueRange::new(&PolicyParams::extended()).calculate(&series).unwrap();

        let expected = (10.0 * 2.0 + 6.0 + 8.0 + 7.0 + 3.0) / 14.0;
        assert!((atr.value - expected).abs() < EPS);
        assert!((atr.buy_stop - (97.0 - 1.5 * expected)).abs() < EPS);
        assert!((atr.sell_stop - (97.0 + 1.5 * expected)).abs() < EPS);
        // the caller's ordering is untouched
        assert_eq!(series, before);
        assert!(series.as_slice().windows(2).all(|w| w[0].date > w[1].date));
    }

    #[test]
    fn test_atr_classic_multiplier() {
        let rows = vec![(101.0, 99.0, 100.0); 15];
        let atr = AverageTrueRange::new(&PolicyParams::classic())
            .calculate(&create_series_oldest_first(&rows))
            .unwrap();
        assert!((atr.value - 2.0).abs() < EPS);
        assert!((atr.buy_stop - 96.0).abs() < EPS);
        assert!((atr.sell_stop - 104.0).abs() < EPS);
    }

    #[test]
    fn test_atr_only_uses_latest_window() {
        // an old volatile session must not leak into the window
        let mut rows = vec![(200.0, 50.0, 100.0)];
        rows.extend(vec![(101.0, 99.0, 100.0); 15]);
        let atr = AverageTrueRange::new(&PolicyParams::extended())
            .calculate(&create_series_oldest_first(&rows))
            .unwrap();
        assert!((atr.value - 2.0).abs() < EPS);
    }

    #[test]
    fn test_atr_insufficient_data() {
        let rows = vec![(101.0, 99.0, 100.0); 14];
        assert!(AverageTrueRange::new(&PolicyParams::extended())
            .calculate(&create_series_oldest_first(&rows))
            .is_none());
    }
}
