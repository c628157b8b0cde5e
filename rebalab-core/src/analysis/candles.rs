//! Red-candle scan: the largest close-to-low and high-to-low spans among
//! losing candles.

use chrono::{DateTime, Utc};

use crate::domain::Candle;

/// One losing candle with its close-to-low and high-to-low spans.
#[derive(Debug, Clone, PartialEq)]
pub struct RedCandle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// close - low, in price units.
    pub close_low_diff: f64,
    /// close - low as a percentage of the close.
    pub close_low_pct: f64,
    /// high - low, in price units.
    pub high_low_diff: f64,
    /// high - low as a percentage of the low.
    pub high_low_pct: f64,
}

/// Top-N red candles under both rankings.
#[derive(Debug, Clone, PartialEq)]
pub struct RedCandleReport {
    /// Largest close-to-low differences, descending.
    pub by_close_low: Vec<RedCandle>,
    /// Largest high-to-low differences, descending.
    pub by_high_low: Vec<RedCandle>,
}

/// Scan for red candles (close below open) and rank the `top_n` largest by
/// close-to-low difference and, separately, by high-to-low difference.
///
/// Malformed candles (NaN prices, inverted ranges) are excluded before
/// ranking.
pub fn largest_red_candles(candles: &[Candle], top_n: usize) -> RedCandleReport {
    let reds: Vec<RedCandle> = candles
        .iter()
        .filter(|c| c.is_sane() && c.is_red())
        .map(|c| RedCandle {
            timestamp: c.timestamp,
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
            close_low_diff: c.close - c.low,
            close_low_pct: (c.close - c.low) / c.close * 100.0,
            high_low_diff: c.high - c.low,
            high_low_pct: (c.high - c.low) / c.low * 100.0,
        })
        .collect();

    RedCandleReport {
        by_close_low: top_by(&reds, top_n, |c| c.close_low_diff),
        by_high_low: top_by(&reds, top_n, |c| c.high_low_diff),
    }
}

fn top_by(reds: &[RedCandle], top_n: usize, key: impl Fn(&RedCandle) -> f64) -> Vec<RedCandle> {
    let mut ranked = reds.to_vec();
    ranked.sort_by(|a, b| {
        key(b)
            .partial_cmp(&key(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(top_n);
    ranked
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candle(hour: u32, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap(),
            open,
            high,
            low,
            close,
            volume: 10.0,
            quote_volume: 10.0 * open,
        }
    }

    #[test]
    fn ranks_by_close_low_difference_not_body_drop() {
        let candles = vec![
            candle(0, 100.0, 100.0, 97.0, 98.0),  // close-low 1.0
            candle(1, 100.0, 106.0, 99.0, 105.0), // green, excluded
            candle(2, 100.0, 100.0, 94.5, 95.0),  // close-low 0.5, biggest body drop
            candle(3, 100.0, 100.0, 90.0, 99.0),  // close-low 9.0, smallest body drop
        ];
        let report = largest_red_candles(&candles, 10);

        assert_eq!(report.by_close_low.len(), 3);
        assert_eq!(report.by_close_low[0].timestamp, candles[3].timestamp);
        assert_eq!(report.by_close_low[1].timestamp, candles[0].timestamp);
        assert_eq!(report.by_close_low[2].timestamp, candles[2].timestamp);
        assert!((report.by_close_low[0].close_low_diff - 9.0).abs() < 1e-9);
    }

    #[test]
    fn ranks_by_high_low_difference_separately() {
        let candles = vec![
            candle(0, 108.0, 110.0, 100.0, 101.0), // range 10, close-low 1
            candle(1, 102.0, 103.0, 95.0, 99.0),   // range 8, close-low 4
        ];
        let report = largest_red_candles(&candles, 10);

        assert_eq!(report.by_close_low[0].timestamp, candles[1].timestamp);
        assert_eq!(report.by_high_low[0].timestamp, candles[0].timestamp);
    }

    #[test]
    fn pct_denominators_are_close_and_low() {
        let report = largest_red_candles(&[candle(0, 100.0, 104.0, 80.0, 90.0)], 1);
        let red = &report.by_close_low[0];

        assert!((red.close_low_pct - 10.0 / 90.0 * 100.0).abs() < 1e-9);
        assert!((red.high_low_pct - 24.0 / 80.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn truncates_both_rankings_to_top_n() {
        let candles = vec![
            candle(0, 100.0, 100.0, 99.0, 99.5),
            candle(1, 100.0, 100.0, 98.0, 99.0),
            candle(2, 100.0, 100.0, 97.0, 98.5),
        ];
        let report = largest_red_candles(&candles, 2);
        assert_eq!(report.by_close_low.len(), 2);
        assert_eq!(report.by_high_low.len(), 2);
    }

    #[test]
    fn skips_malformed_candles() {
        let mut bad = candle(0, 100.0, 100.0, 95.0, 96.0);
        bad.low = 200.0; // inverted range
        let candles = vec![bad, candle(1, 100.0, 100.0, 94.0, 95.0)];
        let report = largest_red_candles(&candles, 10);

        assert_eq!(report.by_close_low.len(), 1);
        assert_eq!(report.by_close_low[0].timestamp, candles[1].timestamp);
    }

    #[test]
    fn empty_input_yields_empty() {
        let report = largest_red_candles(&[], 5);
        assert!(report.by_close_low.is_empty());
        assert!(report.by_high_low.is_empty());
    }
}
