//! Portfolio state and trade accounting.
//!
//! `PortfolioState` carries holdings and cash for one simulation run;
//! `TradeLedger` counts executed trades and accumulates fees. Both are
//! created per run and never shared — the engine owns the only mutable
//! references for the duration of a walk.

use super::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Direction of an executed rebalance trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "BUY"),
            TradeSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Holdings and cash for a single simulation run.
///
/// Share quantities are fractional and non-negative under the equal-weight
/// policy (targets are never negative, so sells never exceed the position).
#[derive(Debug, Clone)]
pub struct PortfolioState {
    holdings: HashMap<Symbol, f64>,
    cash: f64,
}

impl PortfolioState {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            holdings: HashMap::new(),
            cash: initial_cash,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Current share quantity for a symbol (0.0 if never traded).
    pub fn holding(&self, symbol: &str) -> f64 {
        self.holdings.get(symbol).copied().unwrap_or(0.0)
    }

    /// Apply a buy: holdings increase, cash decreases by trade value plus fee.
    pub fn apply_buy(&mut self, symbol: &str, shares: f64, trade_value: f64, fee: f64) {
        *self.holdings.entry(symbol.to_string()).or_insert(0.0) += shares;
        self.cash -= trade_value + fee;
    }

    /// Apply a sell: holdings decrease, cash increases by trade value minus fee.
    pub fn apply_sell(&mut self, symbol: &str, shares: f64, trade_value: f64, fee: f64) {
        *self.holdings.entry(symbol.to_string()).or_insert(0.0) -= shares;
        self.cash += trade_value - fee;
    }
}

/// Per-symbol trade counts plus the running fee total for one run.
///
/// `total_fees` is monotonically non-decreasing: every executed trade adds
/// its fee, in both directions, never waived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeLedger {
    pub buys: HashMap<Symbol, u32>,
    pub sells: HashMap<Symbol, u32>,
    pub total_fees: f64,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_buy(&mut self, symbol: &str, fee: f64) {
        *self.buys.entry(symbol.to_string()).or_insert(0) += 1;
        self.total_fees += fee;
    }

    pub fn record_sell(&mut self, symbol: &str, fee: f64) {
        *self.sells.entry(symbol.to_string()).or_insert(0) += 1;
        self.total_fees += fee;
    }

    /// Total number of executed trades across all symbols and directions.
    pub fn total_trades(&self) -> u32 {
        self.buys.values().sum::<u32>() + self.sells.values().sum::<u32>()
    }

    /// (buys, sells) for one symbol.
    pub fn trades_for(&self, symbol: &str) -> (u32, u32) {
        (
            self.buys.get(symbol).copied().unwrap_or(0),
            self.sells.get(symbol).copied().unwrap_or(0),
        )
    }
}
