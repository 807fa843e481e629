//! Error types.
//!
//! - `EmuError` is what the library returns: one variant per failure family so
//!   callers can match on it.
//! - `AppError` is the binary's error: a message plus the process exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading or evaluating an emulator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmuError {
    /// One or more parameters the emulator was trained on are absent.
    #[error("emulator coordinates need the following parameters: {}", missing.join(", "))]
    MissingParameter { missing: Vec<String> },

    /// Requested wavenumbers fall outside the grid the network predicts on.
    #[error(
        "{grid} requires {valid_min} <= k <= {valid_max} h/Mpc; \
         requested k spans [{requested_min}, {requested_max}] h/Mpc"
    )]
    Range {
        grid: &'static str,
        requested_min: f64,
        requested_max: f64,
        valid_min: f64,
        valid_max: f64,
    },

    /// The operation is not defined for this model family (or schema).
    #[error("{operation} is not available for model family '{family}'")]
    InvalidModel { family: String, operation: String },

    /// A persisted network is missing, unreadable or inconsistent.
    #[error("failed to load emulator '{}': {reason}", path.display())]
    ModelLoad { path: PathBuf, reason: String },

    /// Caller input is malformed (ragged arrays, empty or non-finite values).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Model store bootstrap failed (download, extraction, filesystem).
    #[error("model store error: {0}")]
    Store(String),
}

impl EmuError {
    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        EmuError::ModelLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<EmuError> for AppError {
    fn from(err: EmuError) -> Self {
        let exit_code = match &err {
            EmuError::MissingParameter { .. }
            | EmuError::Range { .. }
            | EmuError::InvalidModel { .. }
            | EmuError::InvalidInput(_) => 2,
            EmuError::ModelLoad { .. } | EmuError::Store(_) => 3,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameter_message_names_every_key() {
        let err = EmuError::MissingParameter {
            missing: vec!["fR0".to_string(), "z".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "emulator coordinates need the following parameters: fR0, z"
        );
    }

    #[test]
    fn exit_codes_follow_error_family() {
        let input: AppError = EmuError::InvalidInput("bad".into()).into();
        assert_eq!(input.exit_code(), 2);

        let load: AppError = EmuError::load("models_v2/fr.json", "missing").into();
        assert_eq!(load.exit_code(), 3);
        assert!(load.to_string().contains("models_v2/fr.json"));
    }
}
