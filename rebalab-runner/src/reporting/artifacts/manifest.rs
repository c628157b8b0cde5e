//! Batch manifest export (JSON).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::RunConfig;
use crate::dataset::Dataset;
use crate::runner::BatchOutcome;
use crate::summary::{Summary, SummaryRow};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub config: RunConfig,
    pub dataset_hash: String,
    pub rows: usize,
    pub symbols: Vec<String>,
    /// Completed scenarios, ranked by return descending.
    pub results: Vec<SummaryRow>,
    /// Scenarios that failed, with the error rendered as text.
    pub failures: Vec<FailureNote>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureNote {
    pub scenario: String,
    pub error: String,
}

impl RunManifest {
    pub fn new(config: &RunConfig, dataset: &Dataset, outcome: &BatchOutcome) -> Self {
        Self {
            run_id: config.run_id(),
            created_at: chrono::Utc::now(),
            config: config.clone(),
            dataset_hash: dataset.hash.clone(),
            rows: dataset.table.len(),
            symbols: dataset.table.symbols().to_vec(),
            results: Summary::from_batch(outcome).rows().to_vec(),
            failures: outcome
                .failures
                .iter()
                .map(|(scenario, error)| FailureNote {
                    scenario: scenario.label(),
                    error: error.to_string(),
                })
                .collect(),
        }
    }
}

pub fn write_manifest(path: &Path, manifest: &RunManifest) -> Result<()> {
    let json =
        serde_json::to_string_pretty(manifest).context("Failed to serialize batch manifest")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write manifest to {}", path.display()))?;
    Ok(())
}
