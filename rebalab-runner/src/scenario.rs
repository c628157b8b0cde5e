//! Scenario planning: which runs a batch compares.

use rebalab_core::schedule::Period;
use serde::{Deserialize, Serialize};

/// One strategy variant in a comparison batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Scenario {
    /// Equal-weight portfolio, rebalanced at the given period.
    Rebalance { period: Period },

    /// Equal-weight portfolio bought once at the start and held.
    HoldOnly,

    /// All-in on a single symbol, entry and exit only.
    BuyAndHold { symbol: String },
}

impl Scenario {
    /// Human-readable label used in summaries and console output.
    pub fn label(&self) -> String {
        match self {
            Scenario::Rebalance { period } => format!("rebalance {period}"),
            Scenario::HoldOnly => "no rebalancing".to_string(),
            Scenario::BuyAndHold { symbol } => format!("buy & hold {symbol}"),
        }
    }

    /// Filesystem-safe label used in artifact names.
    pub fn slug(&self) -> String {
        match self {
            Scenario::Rebalance { period } => format!("rebalance_{period}").to_lowercase(),
            Scenario::HoldOnly => "hold_only".to_string(),
            Scenario::BuyAndHold { symbol } => format!("buy_hold_{}", symbol.to_lowercase()),
        }
    }

    /// Whether this scenario produces a per-row value history.
    pub fn has_history(&self) -> bool {
        !matches!(self, Scenario::BuyAndHold { .. })
    }
}

/// The standard comparison set: one rebalance scenario per period, the
/// hold-only portfolio, and a buy-and-hold baseline per symbol.
pub fn plan_scenarios(periods: &[Period], symbols: &[String]) -> Vec<Scenario> {
    let mut scenarios: Vec<Scenario> = periods
        .iter()
        .map(|&period| Scenario::Rebalance { period })
        .collect();
    scenarios.push(Scenario::HoldOnly);
    scenarios.extend(symbols.iter().map(|symbol| Scenario::BuyAndHold {
        symbol: symbol.clone(),
    }));
    scenarios
}

// ─── Tests ───────────────────────────────────────────────────────────
