// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the service registry.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// A module exposed a capability to the pipeline.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct ServiceRegistered<'a> {
    pub name: &'a str,
    pub provider: &'a str,
}

impl Display for ServiceRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Service '{}' provided by module '{}'",
            self.name, self.provider
        )
    }
}

impl StructuredLog for ServiceRegistered<'_> {
    fn log(&self) {
        tracing::debug!(service = self.name, provider = self.provider, "{}", self);
    }
}

/// Required services are missing; the run is aborted before the first cycle.
///
/// # Log Level
/// `error!` - Critical, nothing will be processed
///
/// # Example
/// ```
/// use the_sluice::observability::messages::services::MissingServices;
///
/// let missing = vec!["calibration".to_string(), "geometry".to_string()];
/// let msg = MissingServices { missing: &missing };
/// assert_eq!(
///     msg.to_string(),
///     "Following services are required and missing: calibration, geometry"
/// );
/// ```
pub struct MissingServices<'a> {
    pub missing: &'a [String],
}

impl Display for MissingServices<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Following services are required and missing: {}",
            self.missing.join(", ")
        )
    }
}

impl StructuredLog for MissingServices<'_> {
    fn log(&self) {
        tracing::error!(
            missing = %self.missing.join(", "),
            missing_count = self.missing.len(),
            "{}", self
        );
    }
}

/// Why a missing capability was required.
///
/// # Log Level
/// `error!` - Accompanies [`MissingServices`]
pub struct ServiceRequirementUnmet<'a> {
    pub name: &'a str,
    pub reason: &'a str,
}

impl Display for ServiceRequirementUnmet<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.reason.is_empty() {
            write!(f, "Service '{}' is required", self.name)
        } else {
            write!(f, "Service '{}' is required: {}", self.name, self.reason)
        }
    }
}

impl StructuredLog for ServiceRequirementUnmet<'_> {
    fn log(&self) {
        tracing::error!(service = self.name, reason = self.reason, "{}", self);
    }
}
