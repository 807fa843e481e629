//! Shared "evaluate" pipeline used by the `boost` and `linear` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! store check -> registry load -> resolve/evaluate -> result
//!
//! The command handlers can then focus on presentation (printing vs exports).

use crate::data::ModelStore;
use crate::domain::{BoostResult, ModelFamily, Quantity, RunConfig, SchemaVersion};
use crate::emu::MgBoost;
use crate::error::AppError;

/// All computed outputs of a single evaluation run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub family: ModelFamily,
    pub schema: SchemaVersion,
    pub quantity: Quantity,
    /// Redshift of each output row.
    pub z: Vec<f64>,
    pub result: BoostResult,
}

/// Load the emulator named by `config` and evaluate it.
pub fn run_eval(config: &RunConfig) -> Result<RunOutput, AppError> {
    let emu = load_emulator(config)?;
    run_eval_with_emulator(&emu, config)
}

/// Load the facade for `config`, with a clear hint when the store is absent.
pub fn load_emulator(config: &RunConfig) -> Result<MgBoost, AppError> {
    let store = ModelStore::new(&config.store_root);
    if !store.is_present(config.schema) {
        return Err(AppError::new(
            3,
            format!(
                "No emulator networks found under '{}'. Run `mgemu fetch --schema {} --archive <zip>` \
                 (or set MGEMU_DATA_URL_{} and run `mgemu fetch --schema {}`) first.",
                store.schema_dir(config.schema).display(),
                config.schema.tag(),
                config.schema.tag().to_uppercase(),
                config.schema.tag()
            ),
        ));
    }
    Ok(MgBoost::new(&store, config.family, config.schema, config.verbose)?)
}

/// Evaluate with an already-loaded emulator.
pub fn run_eval_with_emulator(emu: &MgBoost, config: &RunConfig) -> Result<RunOutput, AppError> {
    let result = emu.evaluate(config.quantity, &config.params)?;

    if result.values.iter().any(|v| !v.is_finite()) {
        return Err(AppError::new(4, "Non-finite emulator output."));
    }

    // The resolver sizes the bins from `z`, so rows map one-to-one onto it.
    let z = config.params.z.clone().unwrap_or_default();
    if z.len() != result.zbins() {
        return Err(AppError::new(2, "Redshifts (z) are required to label the output rows."));
    }

    Ok(RunOutput {
        family: emu.family(),
        schema: emu.registry().schema(),
        quantity: config.quantity,
        z,
        result,
    })
}
