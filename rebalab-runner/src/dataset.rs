//! Dataset assembly: per-symbol CSV loading, resampling, and hashing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rebalab_core::data::{build_price_table, read_symbol_csv, resample, DataError, PriceTable};
use rebalab_core::domain::Candle;
use rebalab_core::schedule::Period;
use thiserror::Error;

/// Errors from locating and loading symbol data.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no csv for symbol '{symbol}' under {}", .dir.display())]
    MissingSymbolFile { symbol: String, dir: PathBuf },

    #[error("cannot read data directory {}: {source}", .dir.display())]
    DataDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Data(#[from] DataError),
}

/// An aligned table plus the hash that identifies its exact content.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub table: PriceTable,
    /// blake3 over timestamps and every close column, in symbol order.
    pub hash: String,
    pub granularity: Period,
}

/// Load, resample, and align one CSV per symbol from `data_dir`.
pub fn load_dataset(
    data_dir: &Path,
    symbols: &[String],
    granularity: Period,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<Dataset, LoadError> {
    let mut series: HashMap<String, Vec<Candle>> = HashMap::new();
    for symbol in symbols {
        let path = find_symbol_file(data_dir, symbol)?;
        let candles = read_symbol_csv(&path)?;
        series.insert(symbol.clone(), resample(&candles, granularity));
    }

    let table = build_price_table(&series, start, end)?;
    let hash = dataset_hash(&table);
    Ok(Dataset {
        table,
        hash,
        granularity,
    })
}

/// Find the CSV for a symbol: `<symbol>.csv` exactly, else any `.csv` whose
/// name contains the symbol (exchange exports like
/// `Binance_BTCUSDT_minute.csv` match this way).
pub fn find_symbol_file(data_dir: &Path, symbol: &str) -> Result<PathBuf, LoadError> {
    let exact = data_dir.join(format!("{symbol}.csv"));
    if exact.is_file() {
        return Ok(exact);
    }

    let entries = std::fs::read_dir(data_dir).map_err(|source| LoadError::DataDir {
        dir: data_dir.to_path_buf(),
        source,
    })?;
    let needle = symbol.to_lowercase();
    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if name.ends_with(".csv") && name.contains(&needle) {
            return Ok(path);
        }
    }

    Err(LoadError::MissingSymbolFile {
        symbol: symbol.to_string(),
        dir: data_dir.to_path_buf(),
    })
}

/// Content hash of a table: timestamps, then each symbol name and close
/// column in sorted-symbol order.
pub fn dataset_hash(table: &PriceTable) -> String {
    let mut hasher = blake3::Hasher::new();
    for timestamp in table.timestamps() {
        hasher.update(&timestamp.timestamp().to_le_bytes());
    }
    for symbol in table.symbols() {
        hasher.update(symbol.as_bytes());
        if let Some(column) = table.column(symbol) {
            for close in column {
                hasher.update(&close.to_le_bytes());
            }
        }
    }
    format!("{}", hasher.finalize().to_hex())
}

// ─── Tests ───────────────────────────────────────────────────────────
