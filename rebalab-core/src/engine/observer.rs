//! Simulation event observers.
//!
//! The engine never prints; every allocation, trade, and skip is reported
//! through `SimulationObserver`, so console narration and test capture live
//! outside the walk.

use crate::domain::TradeSide;
use chrono::{DateTime, Utc};

/// Why the engine skipped a symbol at a rebalance timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    /// Price missing (NaN) or exactly zero at this row. The symbol stays
    /// eligible at later rebalance timestamps.
    Unpriced { price: f64 },
    /// Absolute rebalance delta below the materiality threshold.
    Immaterial { delta: f64 },
}

/// Callback interface for engine events.
pub trait SimulationObserver: Send {
    /// Called once per rebalance timestamp, before any trades execute.
    fn on_allocation(&self, timestamp: DateTime<Utc>, total_value: f64, target_per_symbol: f64);

    /// Called for every executed trade.
    fn on_trade(
        &self,
        timestamp: DateTime<Utc>,
        symbol: &str,
        side: TradeSide,
        shares: f64,
        price: f64,
        fee: f64,
    );

    /// Called when a symbol is skipped at a rebalance timestamp.
    fn on_skip(&self, timestamp: DateTime<Utc>, symbol: &str, reason: SkipReason);
}

/// Observer that ignores all events. Used by tests and parallel batches.
pub struct NoopObserver;

impl SimulationObserver for NoopObserver {
    fn on_allocation(&self, _timestamp: DateTime<Utc>, _total_value: f64, _target: f64) {}

    fn on_trade(
        &self,
        _timestamp: DateTime<Utc>,
        _symbol: &str,
        _side: TradeSide,
        _shares: f64,
        _price: f64,
        _fee: f64,
    ) {
    }

    fn on_skip(&self, _timestamp: DateTime<Utc>, _symbol: &str, _reason: SkipReason) {}
}

/// Observer that narrates the walk to stdout.
pub struct StdoutObserver;

impl SimulationObserver for StdoutObserver {
    fn on_allocation(&self, timestamp: DateTime<Utc>, total_value: f64, target_per_symbol: f64) {
        println!(
            "[{timestamp}] rebalance: portfolio value {total_value:.2}, target {target_per_symbol:.2} per symbol"
        );
    }

    fn on_trade(
        &self,
        _timestamp: DateTime<Utc>,
        symbol: &str,
        side: TradeSide,
        shares: f64,
        price: f64,
        fee: f64,
    ) {
        println!("  {side} {shares:.6} {symbol} @ {price:.4} (fee {fee:.4})");
    }

    fn on_skip(&self, _timestamp: DateTime<Utc>, symbol: &str, reason: SkipReason) {
        match reason {
            SkipReason::Unpriced { price } => {
                println!("  skip {symbol}: unusable price {price}");
            }
            SkipReason::Immaterial { delta } => {
                println!("  skip {symbol}: delta {delta:.6} below materiality");
            }
        }
    }
}
