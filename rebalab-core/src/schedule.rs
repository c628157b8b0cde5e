//! Rebalance period grammar and schedule generation.
//!
//! A `Period` is parsed from a `<count><unit>` specifier (`1D`, `4H`,
//! `15min`, `30S`, `W`), case-insensitive, count defaulting to 1. A
//! `RebalanceSchedule` is the set of table timestamps at which the engine
//! rebalances: a regular grid at the period frequency from the table's first
//! to last timestamp, intersected with the timestamps actually present, with
//! the first timestamp always included so an initial allocation step occurs.
//!
//! Unrecognized specifiers are configuration errors surfaced here, before
//! any walk begins.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from the period grammar.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("unrecognized rebalance period '{0}': expected <count><unit> with unit W, D, H, min, or S (e.g. 1D, 4H, 15min)")]
    UnrecognizedPeriod(String),

    #[error("rebalance period '{0}' must have a positive count")]
    ZeroCount(String),
}

/// Time unit of a rebalance period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodUnit {
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
}

/// A rebalance (or sampling) frequency: a count of a time unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    count: u32,
    unit: PeriodUnit,
}

impl Period {
    pub fn new(count: u32, unit: PeriodUnit) -> Self {
        Self { count, unit }
    }

    /// Parse a period specifier.
    ///
    /// Accepts `<count><unit>` with an optional count (default 1) and the
    /// word aliases `weekly`, `daily`, `hourly`. The unit `M` is rejected
    /// rather than guessed at (months and minutes both start with it).
    pub fn parse(spec: &str) -> Result<Self, ScheduleError> {
        let trimmed = spec.trim();
        match trimmed.to_lowercase().as_str() {
            "weekly" => return Ok(Self::new(1, PeriodUnit::Weeks)),
            "daily" => return Ok(Self::new(1, PeriodUnit::Days)),
            "hourly" => return Ok(Self::new(1, PeriodUnit::Hours)),
            _ => {}
        }

        let digits_end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, unit_str) = trimmed.split_at(digits_end);

        let count = if digits.is_empty() {
            1
        } else {
            digits
                .parse::<u32>()
                .map_err(|_| ScheduleError::UnrecognizedPeriod(spec.to_string()))?
        };
        if count == 0 {
            return Err(ScheduleError::ZeroCount(spec.to_string()));
        }

        let unit = match unit_str.trim().to_lowercase().as_str() {
            "w" | "week" | "weeks" => PeriodUnit::Weeks,
            "d" | "day" | "days" => PeriodUnit::Days,
            "h" | "hr" | "hour" | "hours" => PeriodUnit::Hours,
            "t" | "min" | "minute" | "minutes" => PeriodUnit::Minutes,
            "s" | "sec" | "second" | "seconds" => PeriodUnit::Seconds,
            _ => return Err(ScheduleError::UnrecognizedPeriod(spec.to_string())),
        };

        Ok(Self::new(count, unit))
    }

    /// The period as a chrono duration.
    pub fn duration(&self) -> Duration {
        let n = self.count as i64;
        match self.unit {
            PeriodUnit::Weeks => Duration::weeks(n),
            PeriodUnit::Days => Duration::days(n),
            PeriodUnit::Hours => Duration::hours(n),
            PeriodUnit::Minutes => Duration::minutes(n),
            PeriodUnit::Seconds => Duration::seconds(n),
        }
    }

    /// The period length in seconds (always >= 1).
    pub fn seconds(&self) -> i64 {
        self.duration().num_seconds()
    }
}

impl FromStr for Period {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::parse(s)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self.unit {
            PeriodUnit::Weeks => "W",
            PeriodUnit::Days => "D",
            PeriodUnit::Hours => "H",
            PeriodUnit::Minutes => "min",
            PeriodUnit::Seconds => "S",
        };
        write!(f, "{}{}", self.count, token)
    }
}

/// The set of timestamps at which a run rebalances.
///
/// Always a subset of the price table's timestamps, and always containing
/// the table's first timestamp (the initial allocation step). The hold-only
/// schedule is exactly that single first timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebalanceSchedule {
    points: BTreeSet<DateTime<Utc>>,
}

impl RebalanceSchedule {
    /// Build a periodic schedule over the given table timestamps.
    ///
    /// Generates the grid first, first+period, first+2*period, ... up to the
    /// last timestamp, keeps grid points that exist in the table, and adds
    /// the first timestamp unconditionally. Timestamps must be sorted
    /// ascending (the price table guarantees this).
    pub fn periodic(timestamps: &[DateTime<Utc>], period: Period) -> Self {
        let mut points = BTreeSet::new();
        if let (Some(&first), Some(&last)) = (timestamps.first(), timestamps.last()) {
            let available: HashSet<&DateTime<Utc>> = timestamps.iter().collect();
            let step = period.duration();
            let mut t = first;
            while t <= last {
                if available.contains(&t) {
                    points.insert(t);
                }
                t = t + step;
            }
            points.insert(first);
        }
        Self { points }
    }

    /// The no-rebalancing schedule: only the initial allocation step.
    pub fn hold_only(timestamps: &[DateTime<Utc>]) -> Self {
        let mut points = BTreeSet::new();
        if let Some(&first) = timestamps.first() {
            points.insert(first);
        }
        Self { points }
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        self.points.contains(timestamp)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Scheduled timestamps in ascending order.
    pub fn points(&self) -> impl Iterator<Item = &DateTime<Utc>> {
        self.points.iter()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
