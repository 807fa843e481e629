//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - built from CLI flags or library calls alike
//! - passed through the resolver/evaluator without copying model state
//! - exported to JSON/CSV

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::ValueEnum;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Gravity / dark-energy model family an emulator was trained for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum ModelFamily {
    /// Hu–Sawicki f(R) gravity (`fR0`).
    #[serde(rename = "fr")]
    #[value(name = "fr")]
    Fr,
    /// Normal-branch DGP braneworld (`omegarc`).
    #[serde(rename = "dgp")]
    #[value(name = "dgp")]
    Dgp,
    /// Growth-index parametrisation (`gamma`).
    #[serde(rename = "gamma")]
    #[value(name = "gamma")]
    Gamma,
    /// Phenomenological μ-Σ modified gravity with dark energy.
    ///
    /// Has no combined network: the boost is a ratio of two networks' output.
    #[serde(rename = "musigma-de")]
    #[value(name = "musigma-de")]
    MuSigmaDe,
}

impl ModelFamily {
    pub const ALL: [ModelFamily; 4] = [
        ModelFamily::Fr,
        ModelFamily::Dgp,
        ModelFamily::Gamma,
        ModelFamily::MuSigmaDe,
    ];

    /// Stable identifier used on the command line and in exports.
    pub fn key(self) -> &'static str {
        match self {
            ModelFamily::Fr => "fr",
            ModelFamily::Dgp => "dgp",
            ModelFamily::Gamma => "gamma",
            ModelFamily::MuSigmaDe => "musigma-de",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelFamily::Fr => "f(R)",
            ModelFamily::Dgp => "nDGP",
            ModelFamily::Gamma => "growth index γ",
            ModelFamily::MuSigmaDe => "μ-Σ + DE",
        }
    }
}

impl std::fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// On-disk emulator schema generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    V2,
    V3,
}

impl SchemaVersion {
    /// Name of the store subdirectory holding this schema's networks.
    pub fn dir_name(self) -> &'static str {
        match self {
            SchemaVersion::V2 => "models_v2",
            SchemaVersion::V3 => "models_v3",
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            SchemaVersion::V2 => "v2",
            SchemaVersion::V3 => "v3",
        }
    }
}

/// Logical role a loaded network plays inside a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// Combined network predicting the boost directly.
    Tot,
    /// μ-Σ nonlinear boost over the linear spectrum.
    NlBoost,
    /// μ-Σ linear power spectrum, stored as log10.
    LinPs,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Tot => "model_tot",
            Role::NlBoost => "model_nl_boost",
            Role::LinPs => "model_lin_ps",
        }
    }
}

/// Which quantity a result holds (for reports and exports).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    NonlinearBoost,
    LinearPowerSpectrum,
}

impl Quantity {
    pub fn label(self) -> &'static str {
        match self {
            Quantity::NonlinearBoost => "B(k, z)",
            Quantity::LinearPowerSpectrum => "P_lin(k, z) [(Mpc/h)^3]",
        }
    }
}

/// Cosmological and gravity parameters accepted by every emulator.
///
/// Each field is absent by default. Which ones are actually required depends
/// on the loaded network; a missing required one is reported at call time.
/// Values are one entry per redshift bin; a single value is broadcast.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CosmoParams {
    pub omega_m: Option<Vec<f64>>,
    pub omega_b: Option<Vec<f64>>,
    pub h0: Option<Vec<f64>>,
    pub ns: Option<Vec<f64>>,
    pub omega_nu: Option<Vec<f64>>,
    pub a_s: Option<Vec<f64>>,
    pub f_r0: Option<Vec<f64>>,
    pub omegarc: Option<Vec<f64>>,
    pub gamma: Option<Vec<f64>>,
    pub q1: Option<Vec<f64>>,
    pub mu0: Option<Vec<f64>>,
    pub sigma0: Option<Vec<f64>>,
    /// Parameters without a dedicated field (e.g. `w0`, `wa`).
    pub extra: BTreeMap<String, Vec<f64>>,
    pub z: Option<Vec<f64>>,
    /// Wavenumbers in h/Mpc at which to report the result. `None` keeps the
    /// emulator's native grid.
    pub k: Option<Vec<f64>>,
}

impl CosmoParams {
    /// Set a parameter by its emulator name (`Omega_m`, `fR0`, ...).
    ///
    /// Unknown names land in `extra`; `k` sets the query grid.
    pub fn set(&mut self, name: &str, values: Vec<f64>) {
        let slot = match name {
            "Omega_m" => &mut self.omega_m,
            "Omega_b" => &mut self.omega_b,
            "H0" => &mut self.h0,
            "ns" => &mut self.ns,
            "Omega_nu" => &mut self.omega_nu,
            "As" => &mut self.a_s,
            "fR0" => &mut self.f_r0,
            "omegarc" => &mut self.omegarc,
            "gamma" => &mut self.gamma,
            "q1" => &mut self.q1,
            "mu0" => &mut self.mu0,
            "sigma0" => &mut self.sigma0,
            "z" => &mut self.z,
            "k" => &mut self.k,
            other => {
                self.extra.insert(other.to_string(), values);
                return;
            }
        };
        *slot = Some(values);
    }

    /// Builder-style `set`.
    pub fn with(mut self, name: &str, values: impl Into<Vec<f64>>) -> Self {
        self.set(name, values.into());
        self
    }

    /// Flatten into the name-keyed coordinate set the resolver works on.
    pub fn to_coordinates(&self) -> CoordinateSet {
        let named = [
            ("Omega_m", &self.omega_m),
            ("Omega_b", &self.omega_b),
            ("H0", &self.h0),
            ("ns", &self.ns),
            ("Omega_nu", &self.omega_nu),
            ("As", &self.a_s),
            ("fR0", &self.f_r0),
            ("omegarc", &self.omegarc),
            ("gamma", &self.gamma),
            ("q1", &self.q1),
            ("mu0", &self.mu0),
            ("sigma0", &self.sigma0),
            ("z", &self.z),
        ];

        // `extra` only fills names whose typed field is unset.
        let mut coords = CoordinateSet::new();
        for (name, value) in &self.extra {
            coords.insert(name, Some(value.clone()));
        }
        for (name, value) in named {
            if value.is_some() || coords.get(name).is_none() {
                coords.insert(name, value.clone());
            }
        }
        if self.k.is_some() {
            coords.k = self.k.clone();
        }
        coords
    }
}

/// Loosely-typed caller input: parameter name -> values (or absent).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateSet {
    values: BTreeMap<String, Option<Vec<f64>>>,
    /// Query wavenumbers; never a model parameter.
    pub k: Option<Vec<f64>>,
}

impl CoordinateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter. A `k` entry is routed to the query grid.
    pub fn insert(&mut self, name: &str, value: Option<Vec<f64>>) {
        if name == "k" {
            self.k = value;
        } else {
            self.values.insert(name.to_string(), value);
        }
    }

    /// Insert a scalar parameter (broadcast later).
    pub fn insert_scalar(&mut self, name: &str, value: f64) {
        self.insert(name, Some(vec![value]));
    }

    /// Values bound to `name`, if present.
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.values.get(name).and_then(|v| v.as_deref())
    }

    /// Names of parameters with a present value.
    pub fn available(&self) -> impl Iterator<Item = &str> {
        self.values
            .iter()
            .filter(|(_, v)| v.is_some())
            .map(|(name, _)| name.as_str())
    }
}

/// Parameters restricted to exactly what one emulator needs, in its order.
///
/// Every column has `zbins` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParameters {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    zbins: usize,
}

impl ResolvedParameters {
    pub(crate) fn new(names: Vec<String>, columns: Vec<Vec<f64>>, zbins: usize) -> Self {
        debug_assert_eq!(names.len(), columns.len());
        debug_assert!(columns.iter().all(|c| c.len() == zbins));
        Self { names, columns, zbins }
    }

    pub fn zbins(&self) -> usize {
        self.zbins
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }

    /// Copy with `name` forced to `value` in every bin (no-op if absent).
    pub fn with_constant(&self, name: &str, value: f64) -> Self {
        let mut out = self.clone();
        if let Some(i) = out.names.iter().position(|n| n == name) {
            out.columns[i] = vec![value; out.zbins];
        }
        out
    }
}

/// Emulator output on a wavenumber grid.
#[derive(Debug, Clone, PartialEq)]
pub struct BoostResult {
    /// Wavenumbers in h/Mpc.
    pub k: Vec<f64>,
    /// Shape `[zbins, k.len()]`.
    pub values: DMatrix<f64>,
}

impl BoostResult {
    pub fn zbins(&self) -> usize {
        self.values.nrows()
    }

    pub fn row(&self, bin: usize) -> Vec<f64> {
        self.values.row(bin).iter().copied().collect()
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub family: ModelFamily,
    pub schema: SchemaVersion,
    pub store_root: PathBuf,
    pub verbose: bool,
    pub quantity: Quantity,
    pub params: CosmoParams,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}
