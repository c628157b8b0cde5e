//! Ranked summary export (CSV).

use anyhow::{Context, Result};
use std::path::Path;

use crate::summary::Summary;

pub fn write_summary_csv(path: &Path, summary: &Summary) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create summary CSV {}", path.display()))?;
    for row in summary.rows() {
        writer
            .serialize(row)
            .context("Failed to serialize summary row")?;
    }
    writer.flush().context("Failed to flush summary CSV")?;
    Ok(())
}
