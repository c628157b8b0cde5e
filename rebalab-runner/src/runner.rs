//! Batch runner — wires together dataset, scenarios, and the engine.
//!
//! Two entry points:
//! - `run_from_config()`: loads data from disk, then runs. Used by the CLI.
//! - `ScenarioBatch::run()`: takes a pre-built table + scenario list. No I/O.
//!
//! A batch never fails as a whole: each scenario's `Result` is collected
//! separately, so one bad baseline leaves the rest of the comparison intact.

use rayon::prelude::*;
use thiserror::Error;

use rebalab_core::data::PriceTable;
use rebalab_core::engine::{
    buy_and_hold, simulate, NoopObserver, SimConfig, SimError, SimulationObserver,
    SimulationResult, StdoutObserver, ValuePoint,
};
use rebalab_core::schedule::RebalanceSchedule;

use crate::config::{ConfigError, RunConfig};
use crate::dataset::{load_dataset, Dataset, LoadError};
use crate::scenario::{plan_scenarios, Scenario};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Load(#[from] LoadError),
    #[error("simulation error: {0}")]
    Sim(#[from] SimError),
}

/// One completed scenario: its summary plus the per-row history when the
/// scenario walks the table (baselines have none).
#[derive(Debug, Clone)]
pub struct ScenarioRun {
    pub scenario: Scenario,
    pub result: SimulationResult,
    pub history: Option<Vec<ValuePoint>>,
}

/// Everything a batch produced: completed runs in scenario order, plus the
/// scenarios that failed and why.
#[derive(Debug)]
pub struct BatchOutcome {
    pub runs: Vec<ScenarioRun>,
    pub failures: Vec<(Scenario, RunError)>,
}

impl BatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Executes a list of scenarios against one table, in parallel by default.
///
/// Verbose mode narrates every allocation and trade to stdout, which forces
/// sequential execution so the narration stays readable.
pub struct ScenarioBatch {
    config: SimConfig,
    parallel: bool,
    verbose: bool,
}

impl ScenarioBatch {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            parallel: true,
            verbose: false,
        }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enables console narration (implies sequential execution).
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run every scenario, collecting per-scenario results.
    pub fn run(&self, table: &PriceTable, scenarios: &[Scenario]) -> BatchOutcome {
        let results: Vec<(Scenario, Result<ScenarioRun, RunError>)> =
            if self.verbose || !self.parallel {
                let observer: &dyn SimulationObserver = if self.verbose {
                    &StdoutObserver
                } else {
                    &NoopObserver
                };
                scenarios
                    .iter()
                    .map(|scenario| {
                        if self.verbose {
                            println!("=== {} ===", scenario.label());
                        }
                        let run = run_scenario(table, scenario, &self.config, observer);
                        (scenario.clone(), run)
                    })
                    .collect()
            } else {
                scenarios
                    .par_iter()
                    .map(|scenario| {
                        let run = run_scenario(table, scenario, &self.config, &NoopObserver);
                        (scenario.clone(), run)
                    })
                    .collect()
            };

        let mut runs = Vec::new();
        let mut failures = Vec::new();
        for (scenario, result) in results {
            match result {
                Ok(run) => runs.push(run),
                Err(err) => failures.push((scenario, err)),
            }
        }
        BatchOutcome { runs, failures }
    }
}

/// Run one scenario against a pre-built table.
pub fn run_scenario(
    table: &PriceTable,
    scenario: &Scenario,
    config: &SimConfig,
    observer: &dyn SimulationObserver,
) -> Result<ScenarioRun, RunError> {
    match scenario {
        Scenario::Rebalance { period } => {
            let schedule = RebalanceSchedule::periodic(table.timestamps(), *period);
            let outcome = simulate(table, &schedule, config, observer)?;
            Ok(ScenarioRun {
                scenario: scenario.clone(),
                result: outcome.result,
                history: Some(outcome.history),
            })
        }
        Scenario::HoldOnly => {
            let schedule = RebalanceSchedule::hold_only(table.timestamps());
            let outcome = simulate(table, &schedule, config, observer)?;
            Ok(ScenarioRun {
                scenario: scenario.clone(),
                result: outcome.result,
                history: Some(outcome.history),
            })
        }
        Scenario::BuyAndHold { symbol } => {
            let result = buy_and_hold(table, symbol, config)?;
            Ok(ScenarioRun {
                scenario: scenario.clone(),
                result,
                history: None,
            })
        }
    }
}

/// Load the dataset named by the config and run the standard comparison
/// batch against it.
///
/// This is the high-level entry point used by the CLI. For pre-loaded
/// tables, use `ScenarioBatch::run()` directly.
pub fn run_from_config(
    config: &RunConfig,
    verbose: bool,
) -> Result<(Dataset, BatchOutcome), RunError> {
    config.validate()?;
    let periods = config.periods()?;
    let granularity = config.parsed_granularity()?;

    let dataset = load_dataset(
        &config.data_dir,
        &config.symbols,
        granularity,
        config.start_bound(),
        config.end_bound(),
    )?;

    let scenarios = plan_scenarios(&periods, &config.symbols);
    let batch = ScenarioBatch::new(SimConfig {
        initial_capital: config.initial_capital,
        fee_rate: config.fee_rate,
    })
    .with_verbose(verbose);

    let outcome = batch.run(&dataset.table, &scenarios);
    Ok((dataset, outcome))
}

// ─── Tests ───────────────────────────────────────────────────────────
