// src/output.rs

use crate::model::{ChurnOutput, DailyCodeChurn};
use crate::report::MetricMeasures;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

/// All records, ordered by date then file name
pub fn daily_records(output: &ChurnOutput) -> Vec<&DailyCodeChurn> {
    output.values().flat_map(|files| files.values()).collect()
}

pub fn write_daily_churn<W: Write>(writer: W, output: &ChurnOutput) -> Result<(), OutputError> {
    write_json(writer, &daily_records(output))
}

pub fn write_measures<W: Write>(writer: W, measures: &[MetricMeasures]) -> Result<(), OutputError> {
    write_json(writer, measures)
}

pub fn create(path: &Path) -> Result<BufWriter<File>, OutputError> {
    Ok(BufWriter::new(File::create(path)?))
}

fn write_json<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> Result<(), OutputError> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
