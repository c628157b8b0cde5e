//! Serializable batch configuration.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rebalab_core::schedule::{Period, ScheduleError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a batch run (content-addressable hash).
pub type RunId = String;

/// Errors from loading or validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no symbols configured")]
    NoSymbols,

    #[error("initial capital must be positive, got {0}")]
    NonPositiveCapital(f64),

    #[error("fee rate must be in [0, 1), got {0}")]
    BadFeeRate(f64),

    #[error("start date {start} is after end date {end}")]
    BadDateRange { start: NaiveDate, end: NaiveDate },

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Serializable configuration for one scenario batch.
///
/// This struct captures all parameters needed to reproduce a batch:
/// - Universe of symbols and the date range
/// - Rebalance periods to compare
/// - Fee rate and initial capital
/// - Candle granularity and data/output locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    /// Symbols to include in the portfolio
    pub symbols: Vec<String>,

    /// Backtest start date (inclusive); None means from the data's start
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Backtest end date (inclusive); None means to the data's end
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    /// Rebalance periods to compare, e.g. ["1D", "1W"]
    #[serde(default = "default_periods")]
    pub periods: Vec<String>,

    /// Proportional fee per trade, both directions
    #[serde(default = "default_fee_rate")]
    pub fee_rate: f64,

    /// Initial capital
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,

    /// Candle granularity the table is resampled to
    #[serde(default = "default_granularity")]
    pub granularity: String,

    /// Directory holding one CSV export per symbol
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory artifacts are written under
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_periods() -> Vec<String> {
    vec!["1D".to_string(), "1W".to_string()]
}

fn default_fee_rate() -> f64 {
    0.001
}

fn default_initial_capital() -> f64 {
    100_000.0
}

fn default_granularity() -> String {
    "1min".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("runs")
}

/// Same defaults the TOML deserializer fills in, with no symbols and an
/// open date range. Callers overriding individual fields (the CLI flag
/// path) start here.
impl Default for RunConfig {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            start_date: None,
            end_date: None,
            periods: default_periods(),
            fee_rate: default_fee_rate(),
            initial_capital: default_initial_capital(),
            granularity: default_granularity(),
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
        }
    }
}

impl RunConfig {
    /// Load a configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&text)?)
    }

    /// Check everything that can be rejected before touching data.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(ConfigError::NonPositiveCapital(self.initial_capital));
        }
        if !(self.fee_rate.is_finite() && (0.0..1.0).contains(&self.fee_rate)) {
            return Err(ConfigError::BadFeeRate(self.fee_rate));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ConfigError::BadDateRange { start, end });
            }
        }
        self.periods()?;
        self.parsed_granularity()?;
        Ok(())
    }

    /// Parsed rebalance periods, in configured order.
    pub fn periods(&self) -> Result<Vec<Period>, ConfigError> {
        self.periods
            .iter()
            .map(|spec| Period::parse(spec).map_err(ConfigError::from))
            .collect()
    }

    /// Parsed candle granularity.
    pub fn parsed_granularity(&self) -> Result<Period, ConfigError> {
        Ok(Period::parse(&self.granularity)?)
    }

    /// Inclusive lower bound on candle timestamps, if a start date is set.
    pub fn start_bound(&self) -> Option<DateTime<Utc>> {
        self.start_date
            .map(|date| date.and_time(NaiveTime::MIN).and_utc())
    }

    /// Inclusive upper bound on candle timestamps: the last second of the
    /// configured end date.
    pub fn end_bound(&self) -> Option<DateTime<Utc>> {
        self.end_date.map(|date| {
            date.and_time(NaiveTime::MIN).and_utc() + Duration::days(1) - Duration::seconds(1)
        })
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two batches with identical configs get the same RunId, so artifact
    /// directories are content-addressed.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        let hash = blake3::hash(json.as_bytes());
        format!("{}", hash.to_hex())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
