//! Emulator registry: the networks one facade owns, keyed by role.
//!
//! Single-network families load one `model_tot`. μ-Σ-DE has no combined
//! network and loads `model_nl_boost` + `model_lin_ps` instead; its `keys`
//! gain a synthetic `sigma0` that the boost network itself does not consume.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::data::ModelStore;
use crate::domain::{ModelFamily, Role, SchemaVersion};
use crate::error::EmuError;
use crate::math::bounds;
use crate::models::EmulatorModel;

/// Which file backs each role for a family under a schema.
pub fn model_files(family: ModelFamily, schema: SchemaVersion) -> Result<Vec<(Role, &'static str)>, EmuError> {
    let files = match (family, schema) {
        (ModelFamily::Fr, _) => vec![(Role::Tot, "fr")],
        (ModelFamily::Dgp, _) => vec![(Role::Tot, "dgp")],
        (ModelFamily::Gamma, _) => vec![(Role::Tot, "gamma")],
        (ModelFamily::MuSigmaDe, SchemaVersion::V2) => vec![
            (Role::NlBoost, "musigma_nonlinearboost"),
            (Role::LinPs, "musigma_linear_log10ps"),
        ],
        (ModelFamily::MuSigmaDe, SchemaVersion::V3) => {
            return Err(EmuError::InvalidModel {
                family: family.key().to_string(),
                operation: format!("schema {}", schema.tag()),
            });
        }
    };
    Ok(files)
}

/// Loaded networks plus the derived parameter list and output grid.
#[derive(Debug, Clone)]
pub struct Registry {
    family: ModelFamily,
    schema: SchemaVersion,
    models: BTreeMap<Role, EmulatorModel>,
    keys: Vec<String>,
    k: Vec<f64>,
}

impl Registry {
    /// Load every network `family` needs from `store`.
    pub fn load(
        store: &ModelStore,
        family: ModelFamily,
        schema: SchemaVersion,
        verbose: bool,
    ) -> Result<Self, EmuError> {
        if verbose {
            info!(family = family.key(), schema = schema.tag(), "Loading nonlinear emulator...");
        } else {
            debug!(family = family.key(), schema = schema.tag(), "loading emulator");
        }

        let mut models = Vec::new();
        for (role, file) in model_files(family, schema)? {
            let path = store.model_path(schema, file);
            let model = EmulatorModel::from_json_file(&path)?;
            debug!(
                role = role.as_str(),
                path = %path.display(),
                modes = model.modes().len(),
                parameters = ?model.parameters(),
                "network loaded"
            );
            models.push((role, model));
        }
        let registry = Self::from_models(family, schema, models)?;

        if verbose {
            info!("Nonlinear emulator loaded in memory.");
        }
        Ok(registry)
    }

    /// Assemble a registry from already-loaded networks.
    pub fn from_models(
        family: ModelFamily,
        schema: SchemaVersion,
        models: Vec<(Role, EmulatorModel)>,
    ) -> Result<Self, EmuError> {
        let models: BTreeMap<Role, EmulatorModel> = models.into_iter().collect();
        let require = |role: Role| {
            models.get(&role).ok_or_else(|| {
                EmuError::load(
                    PathBuf::from(role.as_str()),
                    format!("{} registry has no {} network", family.key(), role.as_str()),
                )
            })
        };

        let (keys, k) = match family {
            ModelFamily::MuSigmaDe => {
                let nl = require(Role::NlBoost)?;
                let lin = require(Role::LinPs)?;
                let mut keys = Vec::new();
                push_unique(&mut keys, nl.parameters().iter().map(String::as_str));
                push_unique(&mut keys, ["sigma0"]);
                push_unique(&mut keys, lin.parameters().iter().map(String::as_str));
                check_covers(lin, nl)?;
                (keys, nl.modes().to_vec())
            }
            _ => {
                let tot = require(Role::Tot)?;
                (tot.parameters().to_vec(), tot.modes().to_vec())
            }
        };

        Ok(Self {
            family,
            schema,
            models,
            keys,
            k,
        })
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    /// Parameters a caller must supply, in resolution order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Canonical output grid (h/Mpc).
    pub fn k(&self) -> &[f64] {
        &self.k
    }

    pub fn model(&self, role: Role) -> Result<&EmulatorModel, EmuError> {
        self.models.get(&role).ok_or_else(|| EmuError::InvalidModel {
            family: self.family.key().to_string(),
            operation: role.as_str().to_string(),
        })
    }

    /// Grid of the network in `role`, if loaded.
    pub fn grid(&self, role: Role) -> Option<&[f64]> {
        self.models.get(&role).map(|m| m.modes())
    }

    pub fn roles(&self) -> impl Iterator<Item = (Role, &EmulatorModel)> {
        self.models.iter().map(|(role, model)| (*role, model))
    }
}

fn push_unique<'a>(keys: &mut Vec<String>, names: impl IntoIterator<Item = &'a str>) {
    for name in names {
        if !keys.iter().any(|k| k == name) {
            keys.push(name.to_string());
        }
    }
}

/// The linear spectrum is resampled onto the boost grid, so it must span it.
fn check_covers(lin: &EmulatorModel, nl: &EmulatorModel) -> Result<(), EmuError> {
    let (lin_min, lin_max) = bounds(lin.modes()).unwrap_or((f64::NAN, f64::NAN));
    let (nl_min, nl_max) = bounds(nl.modes()).unwrap_or((f64::NAN, f64::NAN));
    if nl_min >= lin_min && nl_max <= lin_max {
        return Ok(());
    }
    Err(EmuError::load(
        PathBuf::from(lin.name()),
        format!(
            "linear grid [{lin_min}, {lin_max}] does not cover boost grid [{nl_min}, {nl_max}]"
        ),
    ))
}
