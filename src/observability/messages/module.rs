// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for module attachment and parameter handling.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// A stage is being attached.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_sluice::observability::messages::module::ModuleAttached;
///
/// let msg = ModuleAttached { module: "pump", kind: "module" };
/// assert_eq!(msg.to_string(), "Attaching module 'pump'");
/// ```
pub struct ModuleAttached<'a> {
    pub module: &'a str,
    pub kind: &'a str,
}

impl Display for ModuleAttached<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Attaching module '{}'", self.module)
    }
}

impl StructuredLog for ModuleAttached<'_> {
    fn log(&self) {
        tracing::info!(module = self.module, kind = self.kind, "{}", self);
    }
}

/// A configuration file section applies to the module being attached.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct ApplyingModuleConfiguration<'a> {
    pub module: &'a str,
}

impl Display for ApplyingModuleConfiguration<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Applying pipeline configuration file for module '{}'",
            self.module
        )
    }
}

impl StructuredLog for ApplyingModuleConfiguration<'_> {
    fn log(&self) {
        tracing::debug!(module = self.module, "{}", self);
    }
}

/// A configuration file value replaced an attach-time value.
///
/// # Log Level
/// `warn!` - The attach-time value is silently discarded otherwise
pub struct ParameterOverridden<'a> {
    pub module: &'a str,
    pub parameter: &'a str,
}

impl Display for ParameterOverridden<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Overwriting parameter '{}' in module '{}' from the pipeline configuration file.",
            self.parameter, self.module
        )
    }
}

impl StructuredLog for ParameterOverridden<'_> {
    fn log(&self) {
        tracing::warn!(module = self.module, parameter = self.parameter, "{}", self);
    }
}

/// Declared parameters the module never read.
///
/// # Log Level
/// `warn!` - Probably a typo in the pipeline definition
///
/// # Example
/// ```
/// use the_sluice::observability::messages::module::UnusedParameters;
///
/// let unused = vec!["b".to_string(), "c".to_string()];
/// let msg = UnusedParameters { module: "A", parameters: &unused };
/// assert_eq!(msg.to_string(), "The following parameters were ignored: b, c");
/// ```
pub struct UnusedParameters<'a> {
    pub module: &'a str,
    pub parameters: &'a [String],
}

impl Display for UnusedParameters<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "The following parameters were ignored: {}",
            self.parameters.join(", ")
        )
    }
}

impl StructuredLog for UnusedParameters<'_> {
    fn log(&self) {
        tracing::warn!(
            module = self.module,
            parameters = %self.parameters.join(", "),
            "{}", self
        );
    }
}
