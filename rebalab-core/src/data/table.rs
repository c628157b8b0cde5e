//! Multi-symbol close-price alignment.
//!
//! Joins per-symbol candle series into a single table on the timestamps
//! present for every symbol. Rows where any symbol's close is NaN are
//! dropped, so downstream consumers see a gapless table. The engine still
//! guards against bad prices on its own.

use super::DataError;
use crate::domain::{Candle, Symbol};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

/// Aligned close prices for multiple symbols on a common timeline.
///
/// Timestamps are strictly increasing; every close column has exactly one
/// value per timestamp. Symbols are kept sorted for deterministic layout.
#[derive(Debug, Clone)]
pub struct PriceTable {
    timestamps: Vec<DateTime<Utc>>,
    closes: HashMap<Symbol, Vec<f64>>,
    symbols: Vec<Symbol>,
}

impl PriceTable {
    /// Build a table from pre-aligned columns, validating the shape.
    pub fn new(
        timestamps: Vec<DateTime<Utc>>,
        closes: HashMap<Symbol, Vec<f64>>,
    ) -> Result<Self, DataError> {
        for (i, pair) in timestamps.windows(2).enumerate() {
            if pair[0] >= pair[1] {
                return Err(DataError::UnsortedTimestamps { index: i + 1 });
            }
        }
        for (symbol, column) in &closes {
            if column.len() != timestamps.len() {
                return Err(DataError::ColumnMismatch {
                    symbol: symbol.clone(),
                    len: column.len(),
                    expected: timestamps.len(),
                });
            }
        }
        let mut symbols: Vec<Symbol> = closes.keys().cloned().collect();
        symbols.sort();
        Ok(Self {
            timestamps,
            closes,
            symbols,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// The common time axis, sorted ascending.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Tracked symbols, sorted.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn contains_symbol(&self, symbol: &str) -> bool {
        self.closes.contains_key(symbol)
    }

    /// Close price for a symbol at a row. NaN for unknown symbols or
    /// out-of-range rows, which the engine treats as an unpriceable entry.
    pub fn price(&self, symbol: &str, row: usize) -> f64 {
        self.closes
            .get(symbol)
            .and_then(|column| column.get(row))
            .copied()
            .unwrap_or(f64::NAN)
    }

    /// Full close column for a symbol.
    pub fn column(&self, symbol: &str) -> Option<&[f64]> {
        self.closes.get(symbol).map(|c| c.as_slice())
    }
}

/// Join per-symbol candle series on their common timestamps.
///
/// An optional inclusive `[start, end]` range filters each series first.
/// Every symbol's data must span the whole requested range; a symbol that
/// starts after `start` or ends before `end` is reported together with its
/// actual coverage rather than silently truncating the run to the overlap.
/// Zero overlapping timestamps across symbols is fatal for the run
/// (`DataError::EmptyIntersection`).
pub fn build_price_table(
    series: &HashMap<Symbol, Vec<Candle>>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<PriceTable, DataError> {
    if series.is_empty() {
        return Err(DataError::NoSeries);
    }

    let mut close_maps: HashMap<&str, BTreeMap<DateTime<Utc>, f64>> = HashMap::new();
    for (symbol, candles) in series {
        let (coverage_start, coverage_end) = match (candles.first(), candles.last()) {
            (Some(first), Some(last)) => (first.timestamp, last.timestamp),
            _ => {
                return Err(DataError::EmptySeries {
                    symbol: symbol.clone(),
                })
            }
        };

        let mut map = BTreeMap::new();
        for candle in candles {
            let after_start = start.map_or(true, |s| candle.timestamp >= s);
            let before_end = end.map_or(true, |e| candle.timestamp <= e);
            if after_start && before_end {
                map.insert(candle.timestamp, candle.close);
            }
        }
        let starts_late = start.map_or(false, |s| coverage_start > s);
        let ends_early = end.map_or(false, |e| coverage_end < e);
        if map.is_empty() || starts_late || ends_early {
            return Err(DataError::RangeNotCovered {
                symbol: symbol.clone(),
                coverage_start,
                coverage_end,
            });
        }
        close_maps.insert(symbol.as_str(), map);
    }

    let mut symbols: Vec<Symbol> = series.keys().cloned().collect();
    symbols.sort();

    // Row survives only if every symbol has a non-NaN close at its timestamp.
    let anchor = &close_maps[symbols[0].as_str()];
    let rows: Vec<DateTime<Utc>> = anchor
        .keys()
        .filter(|ts| {
            symbols.iter().all(|symbol| {
                close_maps[symbol.as_str()]
                    .get(ts)
                    .map_or(false, |close| !close.is_nan())
            })
        })
        .copied()
        .collect();

    if rows.is_empty() {
        return Err(DataError::EmptyIntersection);
    }

    let mut closes = HashMap::new();
    for symbol in &symbols {
        let map = &close_maps[symbol.as_str()];
        let column: Vec<f64> = rows
            .iter()
            .map(|ts| map.get(ts).copied().unwrap_or(f64::NAN))
            .collect();
        closes.insert(symbol.clone(), column);
    }

    PriceTable::new(rows, closes)
}

// ─── Tests ───────────────────────────────────────────────────────────
