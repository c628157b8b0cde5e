//! Time-bucket resampling of candle series.
//!
//! Each bucket keeps the last candle observed inside it; empty buckets are
//! forward-filled from the previous bucket, so the output is a gapless grid
//! from the first to the last observed bucket. Buckets are aligned to the
//! Unix epoch. Output candle timestamps are the bucket start times.

use crate::domain::Candle;
use crate::schedule::Period;
use chrono::DateTime;
use std::collections::BTreeMap;

/// Resample a series (sorted ascending) to the given granularity.
pub fn resample(candles: &[Candle], granularity: Period) -> Vec<Candle> {
    let step = granularity.seconds().max(1);

    let mut buckets: BTreeMap<i64, &Candle> = BTreeMap::new();
    for candle in candles {
        let bucket = candle.timestamp.timestamp().div_euclid(step) * step;
        buckets.insert(bucket, candle);
    }

    let (first, last) = match (buckets.keys().next(), buckets.keys().next_back()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Vec::new(),
    };

    let mut out = Vec::with_capacity(((last - first) / step + 1) as usize);
    let mut carried: Option<&Candle> = None;
    let mut t = first;
    while t <= last {
        if let Some(&candle) = buckets.get(&t) {
            carried = Some(candle);
        }
        if let (Some(candle), Some(timestamp)) = (carried, DateTime::from_timestamp(t, 0)) {
            out.push(Candle {
                timestamp,
                ..candle.clone()
            });
        }
        t += step;
    }
    out
}

// ─── Tests ───────────────────────────────────────────────────────────
