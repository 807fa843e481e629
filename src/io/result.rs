//! Read/write result JSON files.
//!
//! Result JSON is the portable form of one evaluation:
//! - which emulator produced it (family, schema, quantity)
//! - the redshift bins and wavenumbers
//! - the output grid, one row per redshift
//!
//! `mgemu plot --result` re-renders it without loading any network.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::pipeline::RunOutput;
use crate::domain::{ModelFamily, Quantity, SchemaVersion};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultFile {
    pub tool: String,
    pub generated: DateTime<Utc>,
    pub family: ModelFamily,
    pub schema: SchemaVersion,
    pub quantity: Quantity,
    pub z: Vec<f64>,
    pub k: Vec<f64>,
    /// `values[i][j]` is the output at `z[i]`, `k[j]`.
    pub values: Vec<Vec<f64>>,
}

impl ResultFile {
    pub fn from_run(run: &RunOutput) -> Self {
        Self {
            tool: "mgemu".to_string(),
            generated: Utc::now(),
            family: run.family,
            schema: run.schema,
            quantity: run.quantity,
            z: run.z.clone(),
            k: run.result.k.clone(),
            values: (0..run.result.zbins()).map(|i| run.result.row(i)).collect(),
        }
    }
}

/// Write a result JSON file.
pub fn write_result_json(path: &Path, run: &RunOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create result JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &ResultFile::from_run(run))
        .map_err(|e| AppError::new(4, format!("Failed to write result JSON: {e}")))?;
    Ok(())
}

/// Read a result JSON file.
pub fn read_result_json(path: &Path) -> Result<ResultFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(4, format!("Failed to open result JSON '{}': {e}", path.display())))?;
    let result: ResultFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid result JSON: {e}")))?;

    if result.values.len() != result.z.len() || result.values.iter().any(|row| row.len() != result.k.len()) {
        return Err(AppError::new(
            2,
            format!(
                "Invalid result JSON: expected {} rows of {} values.",
                result.z.len(),
                result.k.len()
            ),
        ));
    }
    Ok(result)
}
