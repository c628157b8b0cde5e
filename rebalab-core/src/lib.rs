//! Rebalab Core — price tables, rebalance schedules, the simulation walk,
//! baselines, and series analysis.
//!
//! This crate contains the heart of the rebalancing backtester:
//! - Domain types (candles, portfolio state, trade ledger)
//! - Candle ingestion from exchange CSV exports, with resampling
//! - Timestamp-aligned close-price tables across symbols
//! - Period grammar and rebalance schedules
//! - Row-by-row simulation walk with equal-weight rebalancing
//! - Buy-and-hold baseline accounting
//! - Volatility and red-candle diagnostics

pub mod analysis;
pub mod data;
pub mod domain;
pub mod engine;
pub mod schedule;
