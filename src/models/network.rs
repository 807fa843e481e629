//! Dense emulator network (inference only).
//!
//! Every emulator in the store is a fully-connected network trained offline:
//!
//! ```text
//! x      = (params - params_mean) / params_std
//! h_l    = act_l(W_l^T h_{l-1} + b_l)          hidden layers
//! out    = W_L^T h_{L-1} + b_L                 linear output layer
//! y      = out * features_std + features_mean
//! act(v) = (β + σ(α v) (1 - β)) v              per-unit α, β
//! ```
//!
//! `y` is one value per training mode (wavenumber). Networks trained on
//! `log10` spectra are read back through `ten_to_predictions`.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::domain::ResolvedParameters;
use crate::error::EmuError;
use crate::math::is_strictly_increasing;

/// Serialized network as stored in the model directory.
///
/// Weight matrices are row-major `[n_in][n_out]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub parameters: Vec<String>,
    pub modes: Vec<f64>,
    pub parameters_mean: Vec<f64>,
    pub parameters_std: Vec<f64>,
    pub features_mean: Vec<f64>,
    pub features_std: Vec<f64>,
    pub weights: Vec<Vec<Vec<f64>>>,
    pub biases: Vec<Vec<f64>>,
    #[serde(default)]
    pub alphas: Vec<Vec<f64>>,
    #[serde(default)]
    pub betas: Vec<Vec<f64>>,
}

#[derive(Debug, Clone)]
struct Layer {
    /// `[n_out, n_in]` so a column batch is `weights * x`.
    weights: DMatrix<f64>,
    bias: DVector<f64>,
    /// `(alpha, beta)` for hidden layers; `None` for the linear output layer.
    activation: Option<(DVector<f64>, DVector<f64>)>,
}

/// A loaded, immutable emulator network.
#[derive(Debug, Clone)]
pub struct EmulatorModel {
    name: String,
    parameters: Vec<String>,
    modes: Vec<f64>,
    params_mean: DVector<f64>,
    params_std: DVector<f64>,
    features_mean: DVector<f64>,
    features_std: DVector<f64>,
    layers: Vec<Layer>,
}

impl EmulatorModel {
    /// Read and validate a network from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, EmuError> {
        let file = File::open(path).map_err(|e| EmuError::load(path, e.to_string()))?;
        let spec: NetworkSpec = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| EmuError::load(path, format!("invalid network file: {e}")))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_spec(&name, spec).map_err(|reason| EmuError::load(path, reason))
    }

    /// Build a network from its serialized form, checking every shape.
    pub fn from_spec(name: &str, spec: NetworkSpec) -> Result<Self, String> {
        let n_in = spec.parameters.len();
        let n_modes = spec.modes.len();

        if n_in == 0 {
            return Err("network declares no parameters".to_string());
        }
        let mut seen = HashSet::new();
        if let Some(dup) = spec.parameters.iter().find(|p| !seen.insert(p.as_str())) {
            return Err(format!("duplicate parameter '{dup}'"));
        }
        if !is_strictly_increasing(&spec.modes) {
            return Err("modes must be finite and strictly increasing".to_string());
        }
        check_len("parameters_mean", &spec.parameters_mean, n_in)?;
        check_len("parameters_std", &spec.parameters_std, n_in)?;
        check_len("features_mean", &spec.features_mean, n_modes)?;
        check_len("features_std", &spec.features_std, n_modes)?;
        if spec.parameters_std.iter().any(|s| *s == 0.0) {
            return Err("parameters_std contains zero".to_string());
        }

        let n_layers = spec.weights.len();
        if n_layers == 0 {
            return Err("network has no layers".to_string());
        }
        if spec.biases.len() != n_layers {
            return Err(format!(
                "{} weight matrices but {} bias vectors",
                n_layers,
                spec.biases.len()
            ));
        }
        if spec.alphas.len() != n_layers - 1 || spec.betas.len() != n_layers - 1 {
            return Err(format!(
                "expected {} activation vectors, found alphas={} betas={}",
                n_layers - 1,
                spec.alphas.len(),
                spec.betas.len()
            ));
        }

        let mut layers = Vec::with_capacity(n_layers);
        let mut width = n_in;
        for (l, rows) in spec.weights.iter().enumerate() {
            if rows.len() != width {
                return Err(format!("layer {l}: expected {width} input rows, found {}", rows.len()));
            }
            let n_out = rows.first().map(|r| r.len()).unwrap_or(0);
            if n_out == 0 || rows.iter().any(|r| r.len() != n_out) {
                return Err(format!("layer {l}: ragged or empty weight matrix"));
            }
            let flat: Vec<f64> = rows.iter().flatten().copied().collect();
            check_finite(&format!("layer {l} weights"), &flat)?;
            // Stored [n_in][n_out] row-major; keep the transpose.
            let weights = DMatrix::from_row_slice(width, n_out, &flat).transpose();

            check_len(&format!("layer {l} bias"), &spec.biases[l], n_out)?;
            let bias = DVector::from_column_slice(&spec.biases[l]);

            let activation = if l + 1 < n_layers {
                check_len(&format!("layer {l} alpha"), &spec.alphas[l], n_out)?;
                check_len(&format!("layer {l} beta"), &spec.betas[l], n_out)?;
                Some((
                    DVector::from_column_slice(&spec.alphas[l]),
                    DVector::from_column_slice(&spec.betas[l]),
                ))
            } else {
                None
            };

            layers.push(Layer {
                weights,
                bias,
                activation,
            });
            width = n_out;
        }
        if width != n_modes {
            return Err(format!(
                "output layer has {width} units but {n_modes} modes are declared"
            ));
        }

        Ok(Self {
            name: name.to_string(),
            parameters: spec.parameters,
            modes: spec.modes,
            params_mean: DVector::from_vec(spec.parameters_mean),
            params_std: DVector::from_vec(spec.parameters_std),
            features_mean: DVector::from_vec(spec.features_mean),
            features_std: DVector::from_vec(spec.features_std),
            layers,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wavenumber grid (h/Mpc) the network predicts on.
    pub fn modes(&self) -> &[f64] {
        &self.modes
    }

    /// Parameter names in training order.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Evaluate the network for every z-bin. Shape `[zbins, modes.len()]`.
    pub fn predictions(&self, params: &ResolvedParameters) -> Result<DMatrix<f64>, EmuError> {
        let zbins = params.zbins();
        let mut x = DMatrix::zeros(self.parameters.len(), zbins);
        for (p, name) in self.parameters.iter().enumerate() {
            let column = params.get(name).ok_or_else(|| EmuError::MissingParameter {
                missing: vec![name.clone()],
            })?;
            for (bin, value) in column.iter().enumerate() {
                x[(p, bin)] = (value - self.params_mean[p]) / self.params_std[p];
            }
        }

        for layer in &self.layers {
            let mut h = &layer.weights * &x;
            for mut col in h.column_iter_mut() {
                col += &layer.bias;
            }
            if let Some((alpha, beta)) = &layer.activation {
                for mut col in h.column_iter_mut() {
                    for (i, v) in col.iter_mut().enumerate() {
                        *v = activate(*v, alpha[i], beta[i]);
                    }
                }
            }
            x = h;
        }

        for mut col in x.column_iter_mut() {
            col.component_mul_assign(&self.features_std);
            col += &self.features_mean;
        }
        Ok(x.transpose())
    }

    /// `10 ** predictions`, for networks trained on log10 quantities.
    pub fn ten_to_predictions(&self, params: &ResolvedParameters) -> Result<DMatrix<f64>, EmuError> {
        Ok(self.predictions(params)?.map(|v| 10f64.powf(v)))
    }
}

fn activate(v: f64, alpha: f64, beta: f64) -> f64 {
    let sigmoid = 1.0 / (1.0 + (-alpha * v).exp());
    (beta + sigmoid * (1.0 - beta)) * v
}

fn check_len(what: &str, values: &[f64], expected: usize) -> Result<(), String> {
    if values.len() != expected {
        return Err(format!("{what}: expected {expected} values, found {}", values.len()));
    }
    check_finite(what, values)
}

fn check_finite(what: &str, values: &[f64]) -> Result<(), String> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(format!("{what}: non-finite value"))
    }
}
