//! Data ingestion: CSV reading, resampling, and table alignment.

pub mod reader;
pub mod resample;
pub mod table;

pub use reader::{parse_candles, read_symbol_csv};
pub use resample::resample;
pub use table::{build_price_table, PriceTable};

use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for data loading and table assembly.
///
/// These are designed to be displayable directly in CLI output.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("no 'unix' timestamp column in {}", .path.display())]
    MissingTimestampColumn { path: PathBuf },

    #[error("missing required column '{column}' in {}", .path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error("row {row} in {}: {detail}", .path.display())]
    MalformedRow {
        row: usize,
        path: PathBuf,
        detail: String,
    },

    #[error("no candle series provided")]
    NoSeries,

    #[error("symbol '{symbol}' has no candles")]
    EmptySeries { symbol: String },

    #[error("symbol '{symbol}' has no data in the requested range (available {coverage_start} to {coverage_end})")]
    RangeNotCovered {
        symbol: String,
        coverage_start: chrono::DateTime<chrono::Utc>,
        coverage_end: chrono::DateTime<chrono::Utc>,
    },

    #[error("no overlapping timestamps across symbols")]
    EmptyIntersection,

    #[error("close column for '{symbol}' has {len} rows, expected {expected}")]
    ColumnMismatch {
        symbol: String,
        len: usize,
        expected: usize,
    },

    #[error("timestamps are not strictly increasing at row {index}")]
    UnsortedTimestamps { index: usize },
}
