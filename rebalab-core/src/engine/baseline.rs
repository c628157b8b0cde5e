//! Buy-and-hold baselines.
//!
//! One lump-sum entry at the first row, held through the last row. Fees are
//! charged once each way: the entry fee on the initial capital, the exit fee
//! on the pre-fee terminal value (not the netted value). Each baseline
//! record reports exactly two trades.

use super::simulator::{SimConfig, SimError, SimulationResult};
use crate::data::PriceTable;
use crate::domain::TradeLedger;

/// Terminal value of holding a single asset for the whole period.
pub fn buy_and_hold(
    table: &PriceTable,
    symbol: &str,
    config: &SimConfig,
) -> Result<SimulationResult, SimError> {
    if table.is_empty() {
        return Err(SimError::EmptyTable);
    }
    if !table.contains_symbol(symbol) {
        return Err(SimError::UnknownSymbol(symbol.to_string()));
    }

    let entry_price = table.price(symbol, 0);
    let exit_price = table.price(symbol, table.len() - 1);
    if !entry_price.is_finite() || entry_price == 0.0 || !exit_price.is_finite() {
        return Err(SimError::UnpricedBoundary {
            symbol: symbol.to_string(),
        });
    }

    let gross_value = config.initial_capital * (exit_price / entry_price);
    let entry_fee = config.fee_rate * config.initial_capital;
    let exit_fee = config.fee_rate * gross_value;
    let final_value = gross_value - entry_fee - exit_fee;
    let return_pct = if config.initial_capital != 0.0 {
        (final_value - config.initial_capital) / config.initial_capital * 100.0
    } else {
        0.0
    };

    let mut ledger = TradeLedger::new();
    ledger.record_buy(symbol, entry_fee);
    ledger.record_sell(symbol, exit_fee);

    Ok(SimulationResult {
        initial_value: config.initial_capital,
        final_value,
        return_pct,
        ledger,
    })
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::HashMap;

    fn ts(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, 0, 0).unwrap()
    }

    fn table(prices: &[f64]) -> PriceTable {
        let timestamps: Vec<_> = (0..prices.len() as u32).map(ts).collect();
        let mut closes = HashMap::new();
        closes.insert("BTC".to_string(), prices.to_vec());
        PriceTable::new(timestamps, closes).unwrap()
    }

    fn config(capital: f64, fee: f64) -> SimConfig {
        SimConfig {
            initial_capital: capital,
            fee_rate: fee,
        }
    }

    #[test]
    fn fee_free_return_tracks_price_ratio() {
        let result = buy_and_hold(&table(&[100.0, 125.0]), "BTC", &config(1_000.0, 0.0)).unwrap();

        assert!((result.final_value - 1_250.0).abs() < 1e-9);
        assert!((result.return_pct - 25.0).abs() < 1e-9);
    }

    #[test]
    fn exit_fee_charged_on_pre_fee_terminal_value() {
        // capital 1000, fee 1%, price 100 -> 110: gross 1100,
        // fees = 10 (entry) + 11 (exit on the un-netted 1100) = 21.
        let result = buy_and_hold(&table(&[100.0, 110.0]), "BTC", &config(1_000.0, 0.01)).unwrap();

        assert!((result.ledger.total_fees - 21.0).abs() < 1e-9);
        assert!((result.final_value - 1_079.0).abs() < 1e-9);
        assert!((result.return_pct - 7.9).abs() < 1e-9);
    }

    #[test]
    fn reports_exactly_one_buy_and_one_sell() {
        let result = buy_and_hold(&table(&[100.0, 90.0]), "BTC", &config(1_000.0, 0.001)).unwrap();

        assert_eq!(result.ledger.trades_for("BTC"), (1, 1));
        assert_eq!(result.ledger.total_trades(), 2);
    }

    #[test]
    fn unknown_symbol_is_an_error() {
        let err = buy_and_hold(&table(&[100.0, 110.0]), "DOGE", &config(1_000.0, 0.0));
        assert!(matches!(err, Err(SimError::UnknownSymbol(_))));
    }

    #[test]
    fn zero_entry_price_is_an_error() {
        let err = buy_and_hold(&table(&[0.0, 110.0]), "BTC", &config(1_000.0, 0.0));
        assert!(matches!(err, Err(SimError::UnpricedBoundary { .. })));
    }
}
