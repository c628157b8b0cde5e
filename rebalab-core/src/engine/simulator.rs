//! The rebalancing simulation walk.
//!
//! A single pass over the price table, threading the portfolio state, trade
//! ledger, and value history through each row:
//!
//! 1. Rebalance (scheduled rows only): mark the portfolio to market, divide
//!    the total equally across symbols, and trade each symbol toward its
//!    target, funding from the shared cash pool and charging the
//!    proportional fee in both directions.
//! 2. Mark-to-market (every row): append (timestamp, total value) to the
//!    history. Between rebalances no trading occurs.
//!
//! Each run owns its own accumulators; nothing is shared across runs except
//! the read-only table and schedule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::observer::{SimulationObserver, SkipReason};
use crate::data::PriceTable;
use crate::domain::{PortfolioState, TradeLedger, TradeSide};
use crate::schedule::RebalanceSchedule;

/// Minimum absolute dollar rebalance delta that produces a trade. Deltas
/// below this leave holdings and cash untouched for that symbol.
pub const MATERIALITY_THRESHOLD: f64 = 0.01;

/// Errors from a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("price table has no rows")]
    EmptyTable,

    #[error("price table has no symbols")]
    NoSymbols,

    #[error("symbol '{0}' not present in the price table")]
    UnknownSymbol(String),

    #[error("symbol '{symbol}' has a zero or missing price at the period boundary")]
    UnpricedBoundary { symbol: String },
}

/// Engine knobs for one simulation run.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    pub initial_capital: f64,
    /// Fraction of each trade's dollar magnitude charged as fee, both
    /// directions, never waived.
    pub fee_rate: f64,
}

/// One (timestamp, portfolio value) history entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuePoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Immutable summary of a completed run, derived from the history's first
/// and last entries plus the finalized ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub initial_value: f64,
    pub final_value: f64,
    pub return_pct: f64,
    pub ledger: TradeLedger,
}

impl SimulationResult {
    pub fn compute(history: &[ValuePoint], ledger: TradeLedger) -> Self {
        let initial_value = history.first().map(|p| p.value).unwrap_or(0.0);
        let final_value = history.last().map(|p| p.value).unwrap_or(0.0);
        let return_pct = if initial_value != 0.0 {
            (final_value - initial_value) / initial_value * 100.0
        } else {
            0.0
        };
        Self {
            initial_value,
            final_value,
            return_pct,
            ledger,
        }
    }
}

/// Everything one run produces: the per-row history plus the summary.
///
/// The history is computed exactly once; reporting and artifact export both
/// consume this same outcome.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub history: Vec<ValuePoint>,
    pub result: SimulationResult,
}

/// Walk the table once under the given schedule.
///
/// The history has exactly one entry per table row. The schedule's first
/// point establishes the initial equal-weight position; a hold-only
/// schedule trades only there.
pub fn simulate(
    table: &PriceTable,
    schedule: &RebalanceSchedule,
    config: &SimConfig,
    observer: &dyn SimulationObserver,
) -> Result<SimulationOutcome, SimError> {
    if table.is_empty() {
        return Err(SimError::EmptyTable);
    }
    if table.symbols().is_empty() {
        return Err(SimError::NoSymbols);
    }

    let mut state = PortfolioState::new(config.initial_capital);
    let mut ledger = TradeLedger::new();
    let mut history = Vec::with_capacity(table.len());

    for (row, &timestamp) in table.timestamps().iter().enumerate() {
        if schedule.contains(&timestamp) {
            rebalance_row(
                table,
                row,
                timestamp,
                config.fee_rate,
                &mut state,
                &mut ledger,
                observer,
            );
        }
        history.push(ValuePoint {
            timestamp,
            value: mark_to_market(&state, table, row),
        });
    }

    let result = SimulationResult::compute(&history, ledger);
    Ok(SimulationOutcome { history, result })
}

/// cash + Σ(holdings × price), counting only finite prices. A holding
/// without a usable price this row contributes nothing to the mark.
fn mark_to_market(state: &PortfolioState, table: &PriceTable, row: usize) -> f64 {
    let mut value = state.cash();
    for symbol in table.symbols() {
        let price = table.price(symbol, row);
        if price.is_finite() {
            value += state.holding(symbol) * price;
        }
    }
    value
}

/// One rebalance step: trade every symbol toward the equal-weight target.
///
/// Symbol order does not affect the arithmetic; each trade is funded from
/// and returns to the shared cash pool, and fees are symbol-local.
fn rebalance_row(
    table: &PriceTable,
    row: usize,
    timestamp: DateTime<Utc>,
    fee_rate: f64,
    state: &mut PortfolioState,
    ledger: &mut TradeLedger,
    observer: &dyn SimulationObserver,
) {
    let total_value = mark_to_market(state, table, row);
    let target = total_value / table.symbols().len() as f64;
    observer.on_allocation(timestamp, total_value, target);

    for symbol in table.symbols() {
        let price = table.price(symbol, row);
        if !price.is_finite() || price == 0.0 {
            observer.on_skip(timestamp, symbol, SkipReason::Unpriced { price });
            continue;
        }

        let held_value = state.holding(symbol) * price;
        let delta_value = target - held_value;
        if delta_value.abs() < MATERIALITY_THRESHOLD {
            observer.on_skip(timestamp, symbol, SkipReason::Immaterial { delta: delta_value });
            continue;
        }

        let shares = delta_value / price;
        let trade_value = (shares * price).abs();
        let fee = trade_value * fee_rate;
        if shares > 0.0 {
            state.apply_buy(symbol, shares, trade_value, fee);
            ledger.record_buy(symbol, fee);
            observer.on_trade(timestamp, symbol, TradeSide::Buy, shares, price, fee);
        } else {
            state.apply_sell(symbol, -shares, trade_value, fee);
            ledger.record_sell(symbol, fee);
            observer.on_trade(timestamp, symbol, TradeSide::Sell, -shares, price, fee);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
