//! CSV candle reader for exchange history exports.
//!
//! Reads the CryptoDataDownload export layout, one file per symbol:
//! - the first line is a URL banner, not a header (detected and skipped)
//! - headers are matched case-insensitively (`unix`, `open`, ..., `Volume BTC`)
//! - `unix` timestamps may be in seconds or milliseconds; magnitude decides
//! - rows are newest-first in the source files and are sorted ascending here
//!
//! Prices that fail to parse become NaN rather than hard errors; the table
//! builder drops NaN rows and the engine guards against the rest. A row
//! without a usable timestamp cannot be placed at all and is an error.

use super::DataError;
use crate::domain::Candle;
use chrono::DateTime;
use std::path::Path;

/// Unix values at or above this are taken to be milliseconds.
const MILLIS_CUTOFF: f64 = 1e12;

/// Read and parse one symbol's CSV export.
pub fn read_symbol_csv(path: &Path) -> Result<Vec<Candle>, DataError> {
    let raw = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_candles(&raw, path)
}

/// Parse candles from raw export text.
///
/// `path` is used for error context only.
pub fn parse_candles(input: &str, path: &Path) -> Result<Vec<Candle>, DataError> {
    // A banner line carries no commas; a header line always does.
    let body = match input.find('\n') {
        Some(pos) if !input[..pos].contains(',') => &input[pos + 1..],
        _ => input,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| DataError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let find = |name: &str| headers.iter().position(|h| h == name);

    let unix_col = find("unix").ok_or_else(|| DataError::MissingTimestampColumn {
        path: path.to_path_buf(),
    })?;
    let require = |name: &str| {
        find(name).ok_or_else(|| DataError::MissingColumn {
            column: name.to_string(),
            path: path.to_path_buf(),
        })
    };
    let open_col = require("open")?;
    let high_col = require("high")?;
    let low_col = require("low")?;
    let close_col = require("close")?;

    // Exports carry two volume columns: base asset first, quote second
    // (e.g. "Volume BTC", "Volume USDT"). Either may be absent.
    let volume_cols: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.starts_with("volume"))
        .map(|(i, _)| i)
        .collect();
    let base_volume_col = volume_cols.first().copied();
    let quote_volume_col = volume_cols.get(1).copied();

    let mut candles = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|source| DataError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let raw_unix: f64 = record
            .get(unix_col)
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| DataError::MalformedRow {
                row: i + 1,
                path: path.to_path_buf(),
                detail: "unparseable unix timestamp".to_string(),
            })?;
        let secs = if raw_unix.abs() >= MILLIS_CUTOFF {
            (raw_unix / 1000.0) as i64
        } else {
            raw_unix as i64
        };
        let timestamp =
            DateTime::from_timestamp(secs, 0).ok_or_else(|| DataError::MalformedRow {
                row: i + 1,
                path: path.to_path_buf(),
                detail: format!("unix timestamp {raw_unix} out of range"),
            })?;

        let price = |col: usize| -> f64 {
            record
                .get(col)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(f64::NAN)
        };
        let volume = |col: Option<usize>| -> f64 {
            col.and_then(|c| record.get(c))
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0.0)
        };

        candles.push(Candle {
            timestamp,
            open: price(open_col),
            high: price(high_col),
            low: price(low_col),
            close: price(close_col),
            volume: volume(base_volume_col),
            quote_volume: volume(quote_volume_col),
        });
    }

    candles.sort_by_key(|c| c.timestamp);
    Ok(candles)
}

// ─── Tests ───────────────────────────────────────────────────────────
