//! Portfolio value history export (CSV/Parquet).

use anyhow::{Context, Result};
use polars::prelude::{Column, DataFrame, NamedFrom, ParquetWriter, Series};
use rebalab_core::engine::ValuePoint;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn write_history_csv(path: &Path, points: &[ValuePoint]) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create history CSV {}", path.display()))?;
    writeln!(file, "timestamp,value")?;
    for point in points {
        writeln!(
            file,
            "{},{:.4}",
            point.timestamp.format(TIMESTAMP_FORMAT),
            point.value
        )?;
    }
    Ok(())
}

pub fn write_history_parquet(path: &Path, points: &[ValuePoint]) -> Result<()> {
    let timestamps: Vec<String> = points
        .iter()
        .map(|p| p.timestamp.format(TIMESTAMP_FORMAT).to_string())
        .collect();
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();

    let mut df = DataFrame::new(vec![
        Column::Series(Series::new("timestamp".into(), timestamps).into()),
        Column::Series(Series::new("value".into(), values).into()),
    ])
    .context("Failed to build history dataframe")?;

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create history parquet {}", path.display()))?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .context("Failed to write history parquet")?;
    Ok(())
}
