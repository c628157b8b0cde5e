//! Rebalancing engine — schedule-driven walk, baselines, and observers.
//!
//! The engine consumes an aligned price table (from the data pipeline) and a
//! rebalance schedule, then runs the two-phase row loop:
//!
//! 1. Rebalance (scheduled rows): trade each symbol toward the equal-weight
//!    target through the shared cash pool
//! 2. Mark-to-market (every row): portfolio valuation, history accounting
//!
//! The walk is a strict sequential fold with per-run state; parallelism
//! across runs is the caller's concern.

pub mod baseline;
pub mod observer;
pub mod simulator;

pub use baseline::buy_and_hold;
pub use observer::{NoopObserver, SimulationObserver, SkipReason, StdoutObserver};
pub use simulator::{
    simulate, SimConfig, SimError, SimulationOutcome, SimulationResult, ValuePoint,
    MATERIALITY_THRESHOLD,
};
