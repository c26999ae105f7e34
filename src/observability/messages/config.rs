// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for module configuration files.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// A module configuration file is being read.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ReadingConfiguration<'a> {
    pub path: &'a Path,
}

impl Display for ReadingConfiguration<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Reading module configuration from '{}'",
            self.path.display()
        )
    }
}

impl StructuredLog for ReadingConfiguration<'_> {
    fn log(&self) {
        tracing::info!(path = %self.path.display(), "{}", self);
    }
}

/// Reminder that file values beat attach-time values.
///
/// # Log Level
/// `warn!` - Easy to trip over
pub struct ConfigurationPrecedence;

impl Display for ConfigurationPrecedence {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Keep in mind that the module configuration file has precedence over keyword arguments in the attach method!"
        )
    }
}

impl StructuredLog for ConfigurationPrecedence {
    fn log(&self) {
        tracing::warn!("{}", self);
    }
}

/// A `VARIABLES` entry was substituted into a module section.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct VariableSubstituted<'a> {
    pub section: &'a str,
    pub parameter: &'a str,
    pub variable: &'a str,
}

impl Display for VariableSubstituted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Substituted variable '{}' into '{}.{}'",
            self.variable, self.section, self.parameter
        )
    }
}

impl StructuredLog for VariableSubstituted<'_> {
    fn log(&self) {
        tracing::debug!(
            section = self.section,
            parameter = self.parameter,
            variable = self.variable,
            "{}", self
        );
    }
}
