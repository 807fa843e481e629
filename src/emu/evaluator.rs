//! Boost evaluation: drive the networks and resample onto the caller's `k`.
//!
//! Two strategies, selected by family:
//!
//! - single network: the `model_tot` prediction *is* the boost.
//! - μ-Σ-DE: `P_nl = B_nl * 10^{P_lin}` (linear spectrum resampled onto the
//!   boost grid), computed once for the requested cosmology and once with
//!   `mu0 = sigma0 = 0`; the boost is their ratio.
//!
//! Requested wavenumbers are range-checked before any network runs. All
//! resampling is linear, per redshift bin, and never extrapolates.

use nalgebra::DMatrix;

use crate::domain::{BoostResult, CoordinateSet, ModelFamily, ResolvedParameters, Role};
use crate::emu::registry::Registry;
use crate::emu::resolver::resolve;
use crate::error::EmuError;
use crate::math::{bounds, interp_row};

/// Nonlinear boost `[zbins, nk]` on the caller's `k` (or the native grid).
pub fn evaluate_nonlinear_boost(registry: &Registry, coords: &CoordinateSet) -> Result<BoostResult, EmuError> {
    let pp = resolve(coords, registry.keys())?;
    let query = coords.k.as_deref();
    if let Some(k) = query {
        check_range("nonlinear emulator", k, registry.k())?;
    }

    let raw = match registry.family() {
        ModelFamily::MuSigmaDe => musigma_boost(registry, &pp)?,
        ModelFamily::Fr | ModelFamily::Dgp | ModelFamily::Gamma => {
            registry.model(Role::Tot)?.predictions(&pp)?
        }
    };

    resample(registry.k(), raw, query)
}

/// μ-Σ-DE linear power spectrum `10^{model_lin_ps}` on the caller's `k`.
///
/// Requested `k` is checked against the linear network's own grid.
pub fn evaluate_linear_power_spectrum(
    registry: &Registry,
    coords: &CoordinateSet,
) -> Result<BoostResult, EmuError> {
    if registry.family() != ModelFamily::MuSigmaDe {
        return Err(EmuError::InvalidModel {
            family: registry.family().key().to_string(),
            operation: "linear power spectrum".to_string(),
        });
    }

    let pp = resolve(coords, registry.keys())?;
    let lin = registry.model(Role::LinPs)?;
    let query = coords.k.as_deref();
    if let Some(k) = query {
        check_range("linear power spectrum emulator", k, lin.modes())?;
    }

    let ps = lin.ten_to_predictions(&pp)?;
    resample(lin.modes(), ps, query)
}

fn musigma_boost(registry: &Registry, pp: &ResolvedParameters) -> Result<DMatrix<f64>, EmuError> {
    let full = nonlinear_spectrum(registry, pp)?;
    let lcdm = pp.with_constant("mu0", 0.0).with_constant("sigma0", 0.0);
    let reference = nonlinear_spectrum(registry, &lcdm)?;
    Ok(full.component_div(&reference))
}

/// `B_nl(k) * P_lin(k)` on the boost grid.
fn nonlinear_spectrum(registry: &Registry, pp: &ResolvedParameters) -> Result<DMatrix<f64>, EmuError> {
    let nl = registry.model(Role::NlBoost)?;
    let lin = registry.model(Role::LinPs)?;

    let boost = nl.predictions(pp)?;
    let ps_lin = lin.ten_to_predictions(pp)?;
    let ps_lin = interp_rows(lin.modes(), &ps_lin, nl.modes())?;
    Ok(boost.component_mul(&ps_lin))
}

fn resample(grid: &[f64], values: DMatrix<f64>, query: Option<&[f64]>) -> Result<BoostResult, EmuError> {
    match query {
        Some(k) => Ok(BoostResult {
            k: k.to_vec(),
            values: interp_rows(grid, &values, k)?,
        }),
        None => Ok(BoostResult {
            k: grid.to_vec(),
            values,
        }),
    }
}

/// Interpolate each row of `values` (sampled on `grid`) at `targets`.
fn interp_rows(grid: &[f64], values: &DMatrix<f64>, targets: &[f64]) -> Result<DMatrix<f64>, EmuError> {
    let mut out = DMatrix::zeros(values.nrows(), targets.len());
    for (bin, row) in values.row_iter().enumerate() {
        let ys: Vec<f64> = row.iter().copied().collect();
        let resampled = interp_row(grid, &ys, targets).ok_or_else(|| out_of_range("emulator grid", targets, grid))?;
        for (j, v) in resampled.into_iter().enumerate() {
            out[(bin, j)] = v;
        }
    }
    Ok(out)
}

/// Requested `k` must be non-empty, finite, and inside `[min(grid), max(grid)]`.
fn check_range(what: &'static str, k: &[f64], grid: &[f64]) -> Result<(), EmuError> {
    if k.is_empty() {
        return Err(EmuError::InvalidInput("requested k is empty".to_string()));
    }
    if k.iter().any(|v| !v.is_finite()) {
        return Err(EmuError::InvalidInput("requested k contains non-finite values".to_string()));
    }
    let (k_min, k_max) = bounds(k).unwrap_or((f64::NAN, f64::NAN));
    let (g_min, g_max) = bounds(grid).unwrap_or((f64::NAN, f64::NAN));
    if k_min >= g_min && k_max <= g_max {
        Ok(())
    } else {
        Err(out_of_range(what, k, grid))
    }
}

fn out_of_range(what: &'static str, k: &[f64], grid: &[f64]) -> EmuError {
    let (requested_min, requested_max) = bounds(k).unwrap_or((f64::NAN, f64::NAN));
    let (valid_min, valid_max) = bounds(grid).unwrap_or((f64::NAN, f64::NAN));
    EmuError::Range {
        grid: what,
        requested_min,
        requested_max,
        valid_min,
        valid_max,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::domain::SchemaVersion;
    use crate::emu::fixtures;

    fn fr_registry(dir: &std::path::Path) -> Registry {
        let store = fixtures::write_store(dir);
        Registry::load(&store, ModelFamily::Fr, SchemaVersion::V2, false).unwrap()
    }

    fn musigma_registry(dir: &std::path::Path) -> Registry {
        let store = fixtures::write_store(dir);
        Registry::load(&store, ModelFamily::MuSigmaDe, SchemaVersion::V2, false).unwrap()
    }

    #[test]
    fn native_grid_returns_raw_predictions() {
        let dir = tempdir().unwrap();
        let reg = fr_registry(dir.path());
        let coords = fixtures::fr_params(&[0.0, 1.0]).to_coordinates();

        let out = evaluate_nonlinear_boost(&reg, &coords).unwrap();
        let pp = resolve(&coords, reg.keys()).unwrap();
        let raw = reg.model(Role::Tot).unwrap().predictions(&pp).unwrap();
        assert_eq!(out.k, fixtures::FR_MODES);
        assert_eq!(out.values, raw);
    }

    #[test]
    fn query_equal_to_grid_is_a_no_op() {
        let dir = tempdir().unwrap();
        let reg = fr_registry(dir.path());
        let native = evaluate_nonlinear_boost(&reg, &fixtures::fr_params(&[0.5]).to_coordinates()).unwrap();
        let coords = fixtures::fr_params(&[0.5])
            .with("k", fixtures::FR_MODES)
            .to_coordinates();
        let out = evaluate_nonlinear_boost(&reg, &coords).unwrap();
        assert_eq!(out.values, native.values);
    }

    #[test]
    fn query_between_nodes_is_linear_per_bin() {
        let dir = tempdir().unwrap();
        let reg = fr_registry(dir.path());
        let native = evaluate_nonlinear_boost(&reg, &fixtures::fr_params(&[0.0, 2.0]).to_coordinates()).unwrap();

        let k_mid = 0.5 * (fixtures::FR_MODES[1] + fixtures::FR_MODES[2]);
        let coords = fixtures::fr_params(&[0.0, 2.0])
            .with("k", [k_mid])
            .to_coordinates();
        let out = evaluate_nonlinear_boost(&reg, &coords).unwrap();
        assert_eq!(out.values.shape(), (2, 1));
        for bin in 0..2 {
            let expected = 0.5 * (native.values[(bin, 1)] + native.values[(bin, 2)]);
            assert_relative_eq!(out.values[(bin, 0)], expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn out_of_range_k_reports_both_bounds() {
        let dir = tempdir().unwrap();
        let reg = fr_registry(dir.path());
        let coords = fixtures::fr_params(&[0.0])
            .with("k", [0.05, 20.0])
            .to_coordinates();
        let err = evaluate_nonlinear_boost(&reg, &coords).unwrap_err();
        assert_eq!(
            err,
            EmuError::Range {
                grid: "nonlinear emulator",
                requested_min: 0.05,
                requested_max: 20.0,
                valid_min: fixtures::FR_MODES[0],
                valid_max: fixtures::FR_MODES[fixtures::FR_MODES.len() - 1],
            }
        );
    }

    #[test]
    fn k_below_grid_is_rejected() {
        let dir = tempdir().unwrap();
        let reg = fr_registry(dir.path());
        let coords = fixtures::fr_params(&[0.0])
            .with("k", [1e-4])
            .to_coordinates();
        assert!(matches!(
            evaluate_nonlinear_boost(&reg, &coords),
            Err(EmuError::Range { .. })
        ));
    }

    #[test]
    fn musigma_lcdm_limit_is_exactly_one() {
        let dir = tempdir().unwrap();
        let reg = musigma_registry(dir.path());
        let coords = fixtures::musigma_params(&[0.0, 0.5, 1.0], 0.0, 0.0).to_coordinates();
        let out = evaluate_nonlinear_boost(&reg, &coords).unwrap();
        assert_eq!(out.values.shape(), (3, fixtures::NL_MODES.len()));
        assert!(out.values.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn musigma_boost_is_ratio_of_spectra() {
        let dir = tempdir().unwrap();
        let reg = musigma_registry(dir.path());
        let coords = fixtures::musigma_params(&[0.5], 0.3, 0.2).to_coordinates();
        let out = evaluate_nonlinear_boost(&reg, &coords).unwrap();

        let pp = resolve(&coords, reg.keys()).unwrap();
        let lcdm = pp.with_constant("mu0", 0.0).with_constant("sigma0", 0.0);
        let full = nonlinear_spectrum(&reg, &pp).unwrap();
        let base = nonlinear_spectrum(&reg, &lcdm).unwrap();
        for j in 0..fixtures::NL_MODES.len() {
            assert_relative_eq!(out.values[(0, j)], full[(0, j)] / base[(0, j)], max_relative = 1e-12);
        }
        assert!(out.values.iter().any(|&v| (v - 1.0).abs() > 1e-6));
    }

    #[test]
    fn musigma_query_k_resamples_the_ratio() {
        let dir = tempdir().unwrap();
        let reg = musigma_registry(dir.path());
        let params = fixtures::musigma_params(&[0.0, 1.0], 0.3, 0.2);
        let native = evaluate_nonlinear_boost(&reg, &params.to_coordinates()).unwrap();

        let nodes = [fixtures::NL_MODES[0], fixtures::NL_MODES[2]];
        let out = evaluate_nonlinear_boost(&reg, &params.clone().with("k", nodes).to_coordinates()).unwrap();
        assert_eq!(out.k, nodes);
        assert_eq!(out.values.shape(), (2, 2));
        for bin in 0..2 {
            assert_eq!(out.values[(bin, 0)], native.values[(bin, 0)]);
            assert_eq!(out.values[(bin, 1)], native.values[(bin, 2)]);
        }

        let between = evaluate_nonlinear_boost(&reg, &params.with("k", [0.05, 0.5]).to_coordinates()).unwrap();
        assert_eq!(between.values.shape(), (2, 2));
    }

    #[test]
    fn musigma_query_k_is_bounded_by_the_boost_grid() {
        let dir = tempdir().unwrap();
        let reg = musigma_registry(dir.path());

        // Inside the linear grid but below the boost grid.
        let coords = fixtures::musigma_params(&[0.0], 0.1, 0.1)
            .with("k", [fixtures::LIN_MODES[0]])
            .to_coordinates();
        match evaluate_nonlinear_boost(&reg, &coords).unwrap_err() {
            EmuError::Range { valid_min, valid_max, .. } => {
                assert_eq!(valid_min, fixtures::NL_MODES[0]);
                assert_eq!(valid_max, fixtures::NL_MODES[fixtures::NL_MODES.len() - 1]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn musigma_requires_sigma0() {
        let dir = tempdir().unwrap();
        let reg = musigma_registry(dir.path());
        let mut params = fixtures::musigma_params(&[0.0], 0.1, 0.1);
        params.sigma0 = None;
        let err = evaluate_nonlinear_boost(&reg, &params.to_coordinates()).unwrap_err();
        assert_eq!(
            err,
            EmuError::MissingParameter {
                missing: vec!["sigma0".to_string()]
            }
        );
    }

    #[test]
    fn linear_spectrum_uses_its_own_grid() {
        let dir = tempdir().unwrap();
        let reg = musigma_registry(dir.path());

        // Inside the linear grid but below the boost grid.
        let k_lin = fixtures::LIN_MODES[0];
        let coords = fixtures::musigma_params(&[0.0], 0.1, 0.1)
            .with("k", [k_lin])
            .to_coordinates();
        let out = evaluate_linear_power_spectrum(&reg, &coords).unwrap();
        assert_eq!(out.k, vec![k_lin]);
        assert!(out.values[(0, 0)] > 0.0);

        let coords = fixtures::musigma_params(&[0.0], 0.1, 0.1)
            .with("k", [10.0])
            .to_coordinates();
        match evaluate_linear_power_spectrum(&reg, &coords).unwrap_err() {
            EmuError::Range { valid_min, valid_max, .. } => {
                assert_eq!(valid_min, fixtures::LIN_MODES[0]);
                assert_eq!(valid_max, fixtures::LIN_MODES[fixtures::LIN_MODES.len() - 1]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn linear_spectrum_is_musigma_only() {
        let dir = tempdir().unwrap();
        let reg = fr_registry(dir.path());
        let err = evaluate_linear_power_spectrum(&reg, &fixtures::fr_params(&[0.0]).to_coordinates()).unwrap_err();
        assert!(matches!(err, EmuError::InvalidModel { .. }));
    }
}
