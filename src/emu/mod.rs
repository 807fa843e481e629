//! Emulator facade.
//!
//! `MgBoost` owns one `Registry` (loaded once, read-only afterwards) and
//! dispatches calls to the resolver and evaluator:
//!
//! ```no_run
//! use mg_emu::data::{ensure_model_store, StoreConfig};
//! use mg_emu::domain::{CosmoParams, ModelFamily, SchemaVersion};
//! use mg_emu::emu::MgBoost;
//!
//! let store = ensure_model_store(&StoreConfig::from_env(), SchemaVersion::V2)?;
//! let emu = MgBoost::new(&store, ModelFamily::Fr, SchemaVersion::V2, true)?;
//! let params = CosmoParams::default()
//!     .with("Omega_m", [0.31])
//!     .with("Omega_b", [0.049])
//!     .with("H0", [67.7])
//!     .with("ns", [0.966])
//!     .with("Omega_nu", [0.0])
//!     .with("As", [2.1e-9])
//!     .with("fR0", [1e-5])
//!     .with("z", [0.0, 0.5, 1.0])
//!     .with("k", [0.05, 0.1, 0.5]);
//! let result = emu.nonlinear_boost(&params)?;
//! assert_eq!(result.values.shape(), (3, 3));
//! # Ok::<(), mg_emu::error::EmuError>(())
//! ```
//!
//! A facade holds no mutable state, so repeated calls with the same inputs
//! return identical results. Use one instance per thread.

pub mod evaluator;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod registry;
pub mod resolver;

pub use evaluator::*;
pub use registry::*;
pub use resolver::*;

use crate::data::ModelStore;
use crate::domain::{BoostResult, CosmoParams, ModelFamily, Quantity, SchemaVersion};
use crate::error::EmuError;

/// Public entry point for one model family.
#[derive(Debug, Clone)]
pub struct MgBoost {
    registry: Registry,
}

impl MgBoost {
    /// Load the networks for `family` from `store`.
    pub fn new(
        store: &ModelStore,
        family: ModelFamily,
        schema: SchemaVersion,
        verbose: bool,
    ) -> Result<Self, EmuError> {
        Ok(Self {
            registry: Registry::load(store, family, schema, verbose)?,
        })
    }

    pub fn from_registry(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn family(&self) -> ModelFamily {
        self.registry.family()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Nonlinear power-spectrum boost, shape `[len(z), len(k)]`.
    pub fn nonlinear_boost(&self, params: &CosmoParams) -> Result<BoostResult, EmuError> {
        evaluate_nonlinear_boost(&self.registry, &params.to_coordinates())
    }

    /// μ-Σ-DE linear power spectrum; other families fail with `InvalidModel`.
    pub fn linear_power_spectrum(&self, params: &CosmoParams) -> Result<BoostResult, EmuError> {
        evaluate_linear_power_spectrum(&self.registry, &params.to_coordinates())
    }

    pub fn evaluate(&self, quantity: Quantity, params: &CosmoParams) -> Result<BoostResult, EmuError> {
        match quantity {
            Quantity::NonlinearBoost => self.nonlinear_boost(params),
            Quantity::LinearPowerSpectrum => self.linear_power_spectrum(params),
        }
    }
}
