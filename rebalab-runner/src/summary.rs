//! Ranked batch summary.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::runner::BatchOutcome;

/// One scenario's headline numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRow {
    pub scenario: String,
    pub return_pct: f64,
    pub initial_value: f64,
    pub final_value: f64,
    pub trades: u32,
    pub fees: f64,
}

/// All completed scenarios of a batch, ranked by return descending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    rows: Vec<SummaryRow>,
}

impl Summary {
    pub fn from_batch(outcome: &BatchOutcome) -> Self {
        let mut rows: Vec<SummaryRow> = outcome
            .runs
            .iter()
            .map(|run| SummaryRow {
                scenario: run.scenario.label(),
                return_pct: run.result.return_pct,
                initial_value: run.result.initial_value,
                final_value: run.result.final_value,
                trades: run.result.ledger.total_trades(),
                fees: run.result.ledger.total_fees,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.return_pct
                .partial_cmp(&a.return_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self { rows }
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    /// The highest-return scenario, if any completed.
    pub fn best(&self) -> Option<&SummaryRow> {
        self.rows.first()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<24} {:>10} {:>14} {:>8} {:>12}",
            "Scenario", "Return %", "Final Value", "Trades", "Fees"
        )?;
        writeln!(f, "{}", "-".repeat(72))?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<24} {:>+10.2} {:>14.2} {:>8} {:>12.2}",
                row.scenario, row.return_pct, row.final_value, row.trades, row.fees
            )?;
        }
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
