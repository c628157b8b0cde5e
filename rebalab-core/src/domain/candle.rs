//! Candle — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candle for a single symbol over a single sampling interval.
///
/// Volumes are kept in both base-asset and quote-currency units because the
/// exchange exports carry both; the engine itself only consumes `close`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Volume in base-asset units.
    pub volume: f64,
    /// Volume in quote-currency units.
    pub quote_volume: f64,
}

impl Candle {
    /// Returns true if any price field is NaN (void candle).
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, OHLC within [low, high], prices positive.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }

    /// A red candle closes below its open.
    pub fn is_red(&self) -> bool {
        self.close < self.open
    }
}
