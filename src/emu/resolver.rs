//! Parameter resolution: caller coordinates -> exactly what a network needs.
//!
//! Different families are trained on different parameter subsets (DGP needs
//! `omegarc`, f(R) needs `fR0`). Nothing is defaulted: a missing parameter
//! would otherwise feed the network meaningless input with no error signal.

use std::collections::HashSet;

use crate::domain::{CoordinateSet, ResolvedParameters};
use crate::error::EmuError;

/// Restrict `coords` to `required`, in that order.
///
/// - `k` is never a parameter (it lives outside the value map).
/// - every missing name is reported at once, in `required` order.
/// - the bin count is the length of `z` (or of the longest column when `z`
///   is not among the inputs); single values are broadcast to every bin.
pub fn resolve(coords: &CoordinateSet, required: &[String]) -> Result<ResolvedParameters, EmuError> {
    let available: HashSet<&str> = coords.available().collect();
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !available.contains(name.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(EmuError::MissingParameter { missing });
    }

    let zbins = match coords.get("z") {
        Some(z) => z.len(),
        None => required
            .iter()
            .filter_map(|name| coords.get(name))
            .map(<[f64]>::len)
            .max()
            .unwrap_or(0),
    };
    if zbins == 0 {
        return Err(EmuError::InvalidInput("at least one redshift bin is required".to_string()));
    }

    let mut columns = Vec::with_capacity(required.len());
    for name in required {
        let values = coords.get(name).unwrap_or_default();
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(EmuError::InvalidInput(format!("parameter '{name}' has non-finite value {bad}")));
        }
        let column = match values.len() {
            n if n == zbins => values.to_vec(),
            1 => vec![values[0]; zbins],
            n => {
                return Err(EmuError::InvalidInput(format!(
                    "parameter '{name}' has {n} values but there are {zbins} redshift bins"
                )));
            }
        };
        columns.push(column);
    }

    Ok(ResolvedParameters::new(required.to_vec(), columns, zbins))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn reports_exactly_the_missing_keys() {
        let mut coords = CoordinateSet::new();
        coords.insert_scalar("Omega_m", 0.3);
        coords.insert("fR0", None);
        coords.insert("z", Some(vec![0.0, 1.0]));

        let err = resolve(&coords, &keys(&["Omega_m", "H0", "fR0", "z"])).unwrap_err();
        assert_eq!(
            err,
            EmuError::MissingParameter {
                missing: keys(&["H0", "fR0"])
            }
        );
    }

    #[test]
    fn restricts_and_orders_to_required() {
        let mut coords = CoordinateSet::new();
        coords.insert("z", Some(vec![0.0, 0.5, 1.0]));
        coords.insert_scalar("Omega_m", 0.31);
        coords.insert_scalar("unused", 7.0);
        coords.insert("k", Some(vec![0.1]));
        coords.insert("omegarc", Some(vec![0.1, 0.2, 0.3]));

        let pp = resolve(&coords, &keys(&["omegarc", "Omega_m", "z"])).unwrap();
        assert_eq!(pp.names(), ["omegarc", "Omega_m", "z"]);
        assert_eq!(pp.zbins(), 3);
        assert_eq!(pp.get("Omega_m"), Some(&[0.31, 0.31, 0.31][..]));
        assert_eq!(pp.get("unused"), None);
        assert_eq!(pp.get("k"), None);
    }

    #[test]
    fn k_is_never_a_parameter() {
        let mut coords = CoordinateSet::new();
        coords.insert("k", Some(vec![0.1]));
        coords.insert_scalar("z", 0.0);
        let err = resolve(&coords, &keys(&["k", "z"])).unwrap_err();
        assert_eq!(err, EmuError::MissingParameter { missing: keys(&["k"]) });
    }

    #[test]
    fn ragged_and_non_finite_inputs_are_rejected() {
        let mut coords = CoordinateSet::new();
        coords.insert("z", Some(vec![0.0, 1.0]));
        coords.insert("H0", Some(vec![67.0, 68.0, 69.0]));
        let err = resolve(&coords, &keys(&["H0", "z"])).unwrap_err();
        assert!(matches!(err, EmuError::InvalidInput(_)));

        let mut coords = CoordinateSet::new();
        coords.insert("z", Some(vec![0.0]));
        coords.insert_scalar("H0", f64::NAN);
        assert!(matches!(
            resolve(&coords, &keys(&["H0", "z"])),
            Err(EmuError::InvalidInput(_))
        ));

        let mut coords = CoordinateSet::new();
        coords.insert("z", Some(vec![]));
        assert!(matches!(
            resolve(&coords, &keys(&["z"])),
            Err(EmuError::InvalidInput(_))
        ));
    }
}
