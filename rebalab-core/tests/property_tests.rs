//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. History shape — exactly one value point per table row
//! 2. Zero-fee conservation — trading reshuffles value, never creates it
//! 3. Fee accounting — hold-only fees equal fee_rate * capital exactly
//! 4. Idempotence — a second pass at unchanged prices trades nothing
//! 5. Equal-weight split — the first allocation puts total/n into each symbol
//! 6. Schedule containment — periodic points are always existing table rows
//! 7. Fee drag — at positive fee a rebalance never raises the row's value,
//!    and cumulative fees only grow

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rebalab_core::data::PriceTable;
use rebalab_core::domain::TradeSide;
use rebalab_core::engine::{simulate, NoopObserver, SimConfig, SimulationObserver, SkipReason};
use rebalab_core::schedule::{Period, RebalanceSchedule};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..1000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_capital() -> impl Strategy<Value = f64> {
    (10_000.0..1_000_000.0_f64).prop_map(|c| c.round())
}

fn arb_fee() -> impl Strategy<Value = f64> {
    0.0001..0.01_f64
}

/// Between 1 and 3 symbols, each with the same 2..15 row price path.
fn arb_columns() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (1usize..=3, 2usize..=15).prop_flat_map(|(syms, rows)| {
        prop::collection::vec(prop::collection::vec(arb_price(), rows..=rows), syms..=syms)
    })
}

/// Helper: table with generated columns named S0, S1, ... on a daily grid.
fn make_table(columns: &[Vec<f64>]) -> PriceTable {
    let rows = columns[0].len();
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let timestamps: Vec<DateTime<Utc>> =
        (0..rows).map(|i| start + Duration::days(i as i64)).collect();
    let closes: HashMap<String, Vec<f64>> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| (format!("S{i}"), col.clone()))
        .collect();
    PriceTable::new(timestamps, closes).unwrap()
}

/// Observer that records pre-trade allocation marks, per-trade fees, and
/// executed trade values.
#[derive(Default)]
struct SpyObserver {
    fee_total: Mutex<f64>,
    fees: Mutex<Vec<f64>>,
    allocations: Mutex<Vec<(DateTime<Utc>, f64)>>,
    trade_values: Mutex<Vec<(String, TradeSide, f64)>>,
    immaterial_skips: Mutex<usize>,
}

impl SimulationObserver for SpyObserver {
    fn on_allocation(&self, timestamp: DateTime<Utc>, total_value: f64, _target: f64) {
        self.allocations
            .lock()
            .unwrap()
            .push((timestamp, total_value));
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
        *self.fee_total.lock().unwrap() += fee;
        self.fees.lock().unwrap().push(fee);
        self.trade_values
            .lock()
            .unwrap()
            .push((symbol.to_string(), side, (shares * price).abs()));
    }

    fn on_skip(&self, _timestamp: DateTime<Utc>, _symbol: &str, reason: SkipReason) {
        if matches!(reason, SkipReason::Immaterial { .. }) {
            *self.immaterial_skips.lock().unwrap() += 1;
        }
    }
}

// ── 1. History shape ─────────────────────────────────────────────────

proptest! {
    /// Every table row contributes exactly one history entry, trades or not.
    #[test]
    fn history_has_one_point_per_row(columns in arb_columns(), fee in arb_fee()) {
        let table = make_table(&columns);
        let schedule = RebalanceSchedule::periodic(
            table.timestamps(),
            Period::parse("1D").unwrap(),
        );
        let config = SimConfig { initial_capital: 100_000.0, fee_rate: fee };

        let outcome = simulate(&table, &schedule, &config, &NoopObserver).unwrap();
        prop_assert_eq!(outcome.history.len(), table.len());
        for pair in outcome.history.windows(2) {
            prop_assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }
}

// ── 2. Zero-fee conservation ─────────────────────────────────────────

proptest! {
    /// At zero fee the first allocation converts cash into positions without
    /// changing total value.
    #[test]
    fn zero_fee_first_row_preserves_capital(
        columns in arb_columns(),
        capital in arb_capital(),
    ) {
        let table = make_table(&columns);
        let schedule = RebalanceSchedule::hold_only(table.timestamps());
        let config = SimConfig { initial_capital: capital, fee_rate: 0.0 };

        let outcome = simulate(&table, &schedule, &config, &NoopObserver).unwrap();
        let first = outcome.history[0].value;
        prop_assert!(
            (first - capital).abs() < 1e-6 * capital,
            "first row value {first} drifted from capital {capital}"
        );
    }

    /// Constant prices mean every run ends where it started, whatever the
    /// schedule.
    #[test]
    fn constant_prices_conserve_value(
        row in prop::collection::vec(arb_price(), 1..=3),
        rows in 2usize..=10,
        capital in arb_capital(),
    ) {
        let columns: Vec<Vec<f64>> =
            row.iter().map(|&p| vec![p; rows]).collect();
        let table = make_table(&columns);
        let schedule = RebalanceSchedule::periodic(
            table.timestamps(),
            Period::parse("1D").unwrap(),
        );
        let config = SimConfig { initial_capital: capital, fee_rate: 0.0 };

        let outcome = simulate(&table, &schedule, &config, &NoopObserver).unwrap();
        prop_assert!(
            (outcome.result.final_value - capital).abs() < 1e-6 * capital,
            "final {} != capital {capital}",
            outcome.result.final_value
        );
    }
}

// ── 3. Fee accounting ────────────────────────────────────────────────

proptest! {
    /// Hold-only with every symbol priced trades once per symbol, paying
    /// fee_rate on each full target. Total fees are exactly
    /// fee_rate * capital, and the ledger agrees with the observer.
    #[test]
    fn hold_only_fees_are_fee_rate_times_capital(
        columns in arb_columns(),
        capital in arb_capital(),
        fee in arb_fee(),
    ) {
        let table = make_table(&columns);
        let schedule = RebalanceSchedule::hold_only(table.timestamps());
        let config = SimConfig { initial_capital: capital, fee_rate: fee };
        let spy = SpyObserver::default();

        let outcome = simulate(&table, &schedule, &config, &spy).unwrap();
        let expected_fees = fee * capital;
        let ledger_fees = outcome.result.ledger.total_fees;

        prop_assert!(
            (ledger_fees - expected_fees).abs() < 1e-6 * expected_fees.max(1.0),
            "ledger fees {ledger_fees}, expected {expected_fees}"
        );
        let observed = *spy.fee_total.lock().unwrap();
        prop_assert!((observed - ledger_fees).abs() < 1e-9);
        prop_assert_eq!(outcome.result.ledger.total_trades() as usize, columns.len());
    }
}

// ── 4. Idempotence ───────────────────────────────────────────────────

proptest! {
    /// Rebalancing again at unchanged prices produces immaterial skips for
    /// every symbol and no further trades.
    #[test]
    fn repeat_row_trades_nothing(
        row in prop::collection::vec(arb_price(), 1..=3),
        capital in arb_capital(),
    ) {
        let columns: Vec<Vec<f64>> = row.iter().map(|&p| vec![p, p]).collect();
        let table = make_table(&columns);
        let schedule = RebalanceSchedule::periodic(
            table.timestamps(),
            Period::parse("1D").unwrap(),
        );
        prop_assert_eq!(schedule.len(), 2);

        let config = SimConfig { initial_capital: capital, fee_rate: 0.0 };
        let spy = SpyObserver::default();
        let outcome = simulate(&table, &schedule, &config, &spy).unwrap();

        prop_assert_eq!(outcome.result.ledger.total_trades() as usize, row.len());
        prop_assert_eq!(*spy.immaterial_skips.lock().unwrap(), row.len());
    }
}

// ── 5. Equal-weight split ────────────────────────────────────────────

proptest! {
    /// The first allocation buys total/n worth of every symbol.
    #[test]
    fn first_allocation_splits_equally(
        columns in arb_columns(),
        capital in arb_capital(),
    ) {
        let table = make_table(&columns);
        let schedule = RebalanceSchedule::hold_only(table.timestamps());
        let config = SimConfig { initial_capital: capital, fee_rate: 0.0 };
        let spy = SpyObserver::default();

        simulate(&table, &schedule, &config, &spy).unwrap();

        let trades = spy.trade_values.lock().unwrap();
        let target = capital / columns.len() as f64;
        prop_assert_eq!(trades.len(), columns.len());
        for (symbol, side, value) in trades.iter() {
            prop_assert_eq!(*side, TradeSide::Buy);
            prop_assert!(
                (value - target).abs() < 1e-6 * target,
                "{symbol}: trade value {value}, target {target}"
            );
        }
    }
}

// ── 6. Schedule containment ──────────────────────────────────────────

proptest! {
    /// Periodic schedule points are drawn from the table's own timestamps,
    /// and the first timestamp is always scheduled.
    #[test]
    fn periodic_points_are_table_rows(
        rows in 1usize..=40,
        step_days in 1i64..=7,
    ) {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let timestamps: Vec<DateTime<Utc>> =
            (0..rows).map(|i| start + Duration::days(i as i64)).collect();
        let period = Period::parse(&format!("{step_days}D")).unwrap();

        let schedule = RebalanceSchedule::periodic(&timestamps, period);
        prop_assert!(schedule.contains(&timestamps[0]));
        for point in schedule.points() {
            prop_assert!(timestamps.contains(point));
        }
    }
}

// ── 7. Fee drag ──────────────────────────────────────────────────────

proptest! {
    /// Trades move value between cash and positions at the row's own
    /// prices, so the only thing a rebalance can do to total value is pay
    /// fees: every row's post-trade mark stays at or below the pre-trade
    /// mark the observer saw, and the fee stream is non-negative with a
    /// non-decreasing running total that lands on the ledger's figure.
    #[test]
    fn positive_fee_only_bleeds_value(
        columns in arb_columns(),
        capital in arb_capital(),
        fee in arb_fee(),
    ) {
        let table = make_table(&columns);
        // Daily period on a daily grid: every row rebalances.
        let schedule = RebalanceSchedule::periodic(
            table.timestamps(),
            Period::parse("1D").unwrap(),
        );
        prop_assert_eq!(schedule.len(), table.len());

        let config = SimConfig { initial_capital: capital, fee_rate: fee };
        let spy = SpyObserver::default();
        let outcome = simulate(&table, &schedule, &config, &spy).unwrap();

        let allocations = spy.allocations.lock().unwrap();
        prop_assert_eq!(allocations.len(), table.len());
        for &(timestamp, pre_value) in allocations.iter() {
            let point = outcome
                .history
                .iter()
                .find(|p| p.timestamp == timestamp)
                .unwrap();
            prop_assert!(
                point.value <= pre_value + 1e-9 * capital,
                "{timestamp}: post-trade value {} above pre-trade {pre_value}",
                point.value
            );
        }

        let fees = spy.fees.lock().unwrap();
        let mut cumulative = 0.0;
        for &paid in fees.iter() {
            prop_assert!(paid >= 0.0, "negative fee {paid}");
            prop_assert!(cumulative + paid >= cumulative);
            cumulative += paid;
        }
        prop_assert!(
            (cumulative - outcome.result.ledger.total_fees).abs() <= 1e-9 * capital.max(1.0),
            "observer fees {cumulative}, ledger {}",
            outcome.result.ledger.total_fees
        );
    }
}
