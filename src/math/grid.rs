//! Wavenumber grid generation.

use crate::error::EmuError;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
///
/// The endpoints are returned exactly so a grid spanning an emulator's full
/// `[k_min, k_max]` never trips the range check through rounding.
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, EmuError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(EmuError::InvalidInput(format!(
            "invalid k range: min={min}, max={max} (must be finite, >0, and max>min)"
        )));
    }
    if steps < 2 {
        return Err(EmuError::InvalidInput("k grid needs at least 2 points".to_string()));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    out.push(min);
    for i in 1..steps - 1 {
        out.push((ln_min + step * i as f64).exp());
    }
    out.push(max);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(0.01, 5.0, 7).unwrap();
        assert_eq!(v.len(), 7);
        assert_eq!(v[0], 0.01);
        assert_eq!(v[6], 5.0);
        assert!(v.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn log_space_rejects_bad_ranges() {
        assert!(log_space(0.0, 1.0, 5).is_err());
        assert!(log_space(1.0, 0.5, 5).is_err());
        assert!(log_space(0.1, 1.0, 1).is_err());
    }
}
