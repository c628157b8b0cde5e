//! Artifact manager for persisting batch outputs.
//!
//! Every batch gets a content-addressed directory under the output root:
//!
//! ```text
//! runs/<run_id>/
//!   manifest.json             config, dataset hash, ranked results
//!   summary.csv               one row per completed scenario
//!   history_<slug>.csv        portfolio value per table row
//!   history_<slug>.parquet    same series, columnar
//! ```

mod history;
mod manifest;
mod summary;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::RunConfig;
use crate::dataset::Dataset;
use crate::runner::BatchOutcome;
use crate::summary::Summary;

pub use manifest::{FailureNote, RunManifest};

/// Artifact paths returned after export.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub run_dir: PathBuf,
    pub manifest: PathBuf,
    pub summary_csv: PathBuf,
    /// (scenario slug, csv path, parquet path) per history-bearing run.
    pub histories: Vec<(String, PathBuf, PathBuf)>,
}

/// Manages writing all artifacts for a batch.
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    output_dir: PathBuf,
}

impl ArtifactManager {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)
            .context("Failed to create artifact output directory")?;
        Ok(Self { output_dir })
    }

    /// Save the complete artifact set for one batch.
    pub fn save_batch(
        &self,
        config: &RunConfig,
        dataset: &Dataset,
        outcome: &BatchOutcome,
    ) -> Result<ArtifactPaths> {
        let run_dir = self.output_dir.join(config.run_id());
        std::fs::create_dir_all(&run_dir).context("Failed to create batch artifact directory")?;

        let manifest_path = run_dir.join("manifest.json");
        let run_manifest = RunManifest::new(config, dataset, outcome);
        manifest::write_manifest(&manifest_path, &run_manifest)?;

        let summary_csv = run_dir.join("summary.csv");
        summary::write_summary_csv(&summary_csv, &Summary::from_batch(outcome))?;

        let mut histories = Vec::new();
        for run in &outcome.runs {
            if let Some(points) = &run.history {
                let slug = run.scenario.slug();
                let csv_path = run_dir.join(format!("history_{slug}.csv"));
                let parquet_path = run_dir.join(format!("history_{slug}.parquet"));
                history::write_history_csv(&csv_path, points)?;
                history::write_history_parquet(&parquet_path, points)?;
                histories.push((slug, csv_path, parquet_path));
            }
        }

        Ok(ArtifactPaths {
            run_dir,
            manifest: manifest_path,
            summary_csv,
            histories,
        })
    }
}
