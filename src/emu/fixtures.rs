//! Small hand-built networks and an on-disk store for tests.

use std::fs::{self, File};
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::ModelStore;
use crate::domain::{CosmoParams, SchemaVersion};
use crate::models::NetworkSpec;
use crate::models::network::tests::linear_spec;

pub const FR_PARAMS: &[&str] = &["Omega_m", "H0", "fR0", "z"];
pub const FR_MODES: &[f64] = &[0.01, 0.1, 1.0, 5.0];
pub const NL_MODES: &[f64] = &[0.01, 0.1, 1.0];
pub const LIN_MODES: &[f64] = &[0.005, 0.05, 0.5, 2.0];

pub fn fr_spec() -> NetworkSpec {
    linear_spec(
        FR_PARAMS,
        FR_MODES,
        vec![
            vec![0.1, 0.2, 0.3, 0.4],
            vec![0.0, 0.001, 0.002, 0.003],
            vec![100.0, 1000.0, 5000.0, 2000.0],
            vec![-0.01, -0.02, -0.05, -0.1],
        ],
        vec![1.0; 4],
    )
}

pub fn dgp_spec() -> NetworkSpec {
    let mut spec = fr_spec();
    spec.parameters[2] = "omegarc".to_string();
    spec
}

pub fn nl_boost_spec() -> NetworkSpec {
    linear_spec(
        &["Omega_m", "mu0", "z"],
        NL_MODES,
        vec![
            vec![0.1, 0.2, 0.3],
            vec![0.05, 0.3, 0.6],
            vec![-0.02, -0.05, -0.1],
        ],
        vec![1.0; 3],
    )
}

pub fn lin_ps_spec() -> NetworkSpec {
    linear_spec(
        &["Omega_m", "mu0", "sigma0", "z"],
        LIN_MODES,
        vec![
            vec![0.5; 4],
            vec![0.1; 4],
            vec![0.05, 0.1, 0.1, 0.05],
            vec![-0.3; 4],
        ],
        vec![3.0, 3.5, 2.5, 1.0],
    )
}

/// Network with one hidden layer and seeded random weights.
pub fn random_spec(seed: u64, parameters: &[&str], modes: &[f64], hidden: usize) -> NetworkSpec {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut matrix = |rows: usize, cols: usize| -> Vec<Vec<f64>> {
        (0..rows)
            .map(|_| (0..cols).map(|_| rng.gen_range(-1.0..1.0)).collect())
            .collect()
    };
    let n_in = parameters.len();
    let n_out = modes.len();
    let weights = vec![matrix(n_in, hidden), matrix(hidden, n_out)];
    NetworkSpec {
        parameters: parameters.iter().map(|p| p.to_string()).collect(),
        modes: modes.to_vec(),
        parameters_mean: vec![0.5; n_in],
        parameters_std: vec![0.25; n_in],
        features_mean: vec![1.0; n_out],
        features_std: vec![0.1; n_out],
        weights,
        biases: vec![vec![0.01; hidden], vec![0.0; n_out]],
        alphas: vec![vec![1.5; hidden]],
        betas: vec![vec![0.2; hidden]],
    }
}

pub fn fr_params(z: &[f64]) -> CosmoParams {
    CosmoParams::default()
        .with("Omega_m", [0.3])
        .with("H0", [67.0])
        .with("fR0", [1e-5])
        .with("z", z)
}

pub fn musigma_params(z: &[f64], mu0: f64, sigma0: f64) -> CosmoParams {
    CosmoParams::default()
        .with("Omega_m", [0.31])
        .with("mu0", [mu0])
        .with("sigma0", [sigma0])
        .with("z", z)
}

pub fn write_model(store: &ModelStore, schema: SchemaVersion, file: &str, spec: &NetworkSpec) {
    fs::create_dir_all(store.schema_dir(schema)).expect("create schema dir");
    let out = File::create(store.model_path(schema, file)).expect("create model file");
    serde_json::to_writer(out, spec).expect("write model file");
}

/// Store with `fr`, `dgp` and both μ-Σ networks under v2, and `fr` under v3.
/// There is deliberately no `gamma` network.
pub fn write_store(root: &Path) -> ModelStore {
    let store = ModelStore::new(root);
    write_model(&store, SchemaVersion::V2, "fr", &fr_spec());
    write_model(&store, SchemaVersion::V2, "dgp", &dgp_spec());
    write_model(&store, SchemaVersion::V2, "musigma_nonlinearboost", &nl_boost_spec());
    write_model(&store, SchemaVersion::V2, "musigma_linear_log10ps", &lin_ps_spec());
    write_model(&store, SchemaVersion::V3, "fr", &fr_spec());
    store
}
