// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by the blob, the service registry and the pipeline itself.

use super::ConfigError;
use thiserror::Error;

/// Crate-wide result type, defaulting to [`PipelineError`].
pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

/// Every failure the pipeline surfaces to the embedding program.
///
/// Unmet service requirements and unused parameters are not errors; they are
/// only reported through the log.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A blob was asked for a key it does not hold.
    #[error("No key named '{key}' found in Blob. Available keys: {}", .available.join(", "))]
    MissingKey { key: String, available: Vec<String> },

    /// A blob entry exists but holds a value of another type.
    #[error("Blob entry '{key}' is not a {expected}")]
    BlobTypeMismatch { key: String, expected: &'static str },

    /// A module asked for a parameter nobody supplied.
    #[error("{module} requires the parameter '{parameter}'.")]
    MissingRequiredParameter { module: String, parameter: String },

    /// A parameter is present but has an unusable value.
    #[error("Invalid value for parameter '{parameter}' of module '{module}': {reason}")]
    InvalidParameter {
        module: String,
        parameter: String,
        reason: String,
    },

    /// Lookup of a capability nobody registered.
    #[error("No service named '{name}' is registered")]
    ServiceNotFound { name: String },

    /// The registered capability has a different type than requested.
    #[error("Service '{name}' is not a {expected}")]
    ServiceTypeMismatch { name: String, expected: &'static str },

    /// Two attached modules would share a name.
    #[error("A module named '{name}' is already attached to the pipeline")]
    DuplicateModuleName { name: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failure raised by user stage code.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_lists_available_keys() {
        let err = PipelineError::MissingKey {
            key: "c".to_string(),
            available: vec!["a".to_string(), "b".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'c'"));
        assert!(msg.contains("a, b"));
    }

    #[test]
    fn missing_parameter_names_module_and_parameter() {
        let err = PipelineError::MissingRequiredParameter {
            module: "Observer".to_string(),
            parameter: "needed_key".to_string(),
        };
        assert_eq!(err.to_string(), "Observer requires the parameter 'needed_key'.");
    }

    #[test]
    fn anyhow_errors_pass_through_transparently() {
        let err: PipelineError = anyhow::anyhow!("pump ran dry").into();
        assert_eq!(err.to_string(), "pump ran dry");
    }
}
