//! Export evaluation results to CSV.
//!
//! Long format (`z,k,value`), one line per (redshift, wavenumber) pair, so the
//! file loads directly into spreadsheets or dataframes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::app::pipeline::RunOutput;
use crate::error::AppError;

/// Write a run's output grid to a CSV file.
pub fn write_results_csv(path: &Path, run: &RunOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut file = BufWriter::new(file);

    writeln!(file, "family,schema,z,k,value")
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;

    for (i, z) in run.z.iter().enumerate() {
        for (j, k) in run.result.k.iter().enumerate() {
            writeln!(
                file,
                "{},{},{z},{k},{:.10e}",
                run.family.key(),
                run.schema.tag(),
                run.result.values[(i, j)],
            )
            .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
        }
    }

    file.flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
