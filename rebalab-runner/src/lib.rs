//! Rebalab Runner — scenario orchestration on top of `rebalab-core`.
//!
//! This crate builds on the core engine to provide:
//! - TOML-backed run configuration with content-addressed run IDs
//! - Dataset assembly (per-symbol CSV discovery, resampling, hashing)
//! - Scenario planning (rebalance periods, hold-only, per-symbol baselines)
//! - Parallel batch execution with per-scenario failure isolation
//! - Ranked summaries and the full artifact set (manifest, CSV, Parquet)

pub mod config;
pub mod dataset;
pub mod reporting;
pub mod runner;
pub mod scenario;
pub mod summary;

pub use config::{ConfigError, RunConfig, RunId};
pub use dataset::{dataset_hash, load_dataset, Dataset, LoadError};
pub use reporting::{ArtifactManager, ArtifactPaths, FailureNote, RunManifest};
pub use runner::{run_from_config, run_scenario, BatchOutcome, RunError, ScenarioBatch, ScenarioRun};
pub use scenario::{plan_scenarios, Scenario};
pub use summary::{Summary, SummaryRow};
