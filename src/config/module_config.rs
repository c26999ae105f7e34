// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The configuration context a module sees while it is being attached.

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::Parameters;
use crate::errors::{PipelineError, Result};
use crate::services::{Service, ServiceRegistry};

/// Handed to [`Module::configure`](crate::traits::Module::configure).
///
/// Gives typed access to the declared parameters (tracking which ones were
/// read), and collects the services the module provides and requires.
///
/// ```rust
/// use the_sluice::config::{ModuleConfig, Parameters};
/// use the_sluice::services::ServiceRegistry;
///
/// let parameters: Parameters = [("threshold", 3)].into_iter().collect();
/// let mut config = ModuleConfig::new("filter", "Filter", parameters, ServiceRegistry::new());
///
/// let threshold: u32 = config.require("threshold").unwrap();
/// let label: String = config.get_or("label", "hits".to_string()).unwrap();
/// assert_eq!((threshold, label.as_str()), (3, "hits"));
/// assert!(config.unused_parameters().is_empty());
/// ```
pub struct ModuleConfig {
    name: String,
    module_type: String,
    parameters: Parameters,
    provided: Vec<(String, Service)>,
    required: BTreeMap<String, String>,
    services: ServiceRegistry,
}

impl ModuleConfig {
    pub fn new(
        name: impl Into<String>,
        module_type: impl Into<String>,
        parameters: Parameters,
        services: ServiceRegistry,
    ) -> Self {
        Self {
            name: name.into(),
            module_type: module_type.into(),
            parameters,
            provided: Vec::new(),
            required: BTreeMap::new(),
            services,
        }
    }

    /// The name the module is attached under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The module's type name, used in error messages.
    pub fn module_type(&self) -> &str {
        &self.module_type
    }

    /// Handle to the pipeline's shared service registry. Keep it to look up
    /// services while processing.
    pub fn services(&self) -> ServiceRegistry {
        self.services.clone()
    }

    /// The parameter `name`, or `None` when it is absent or null.
    ///
    /// The name counts as consumed for the unused-parameter audit either way.
    pub fn get<T: DeserializeOwned>(&mut self, name: &str) -> Result<Option<T>> {
        match self.parameters.consume(name) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|err| PipelineError::InvalidParameter {
                    module: self.name.clone(),
                    parameter: name.to_string(),
                    reason: err.to_string(),
                }),
        }
    }

    /// The parameter `name`, or `default` when it is absent or null.
    pub fn get_or<T: DeserializeOwned>(&mut self, name: &str, default: T) -> Result<T> {
        Ok(self.get(name)?.unwrap_or(default))
    }

    /// The parameter `name`; its absence is an error.
    pub fn require<T: DeserializeOwned>(&mut self, name: &str) -> Result<T> {
        self.get(name)?
            .ok_or_else(|| PipelineError::MissingRequiredParameter {
                module: self.module_type.clone(),
                parameter: name.to_string(),
            })
    }

    /// Set or overwrite a parameter, e.g. to fill in a default.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) {
        self.parameters.insert(name, value);
    }

    /// Provide `service` to the pipeline under `name`.
    pub fn expose<T: Any + Send + Sync>(&mut self, service: T, name: impl Into<String>) {
        self.provided.push((name.into(), Arc::new(service)));
    }

    /// Declare that the module cannot run without the service `name`.
    /// `reason` only appears in diagnostics.
    pub fn require_service(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        self.required.insert(name.into(), reason.into());
    }

    /// Declared parameters that were not read so far, sorted.
    pub fn unused_parameters(&self) -> Vec<String> {
        self.parameters.unused()
    }

    pub(crate) fn into_declarations(self) -> (Vec<(String, Service)>, BTreeMap<String, String>) {
        (self.provided, self.required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(parameters: Parameters) -> ModuleConfig {
        ModuleConfig::new("observer", "Observer", parameters, ServiceRegistry::new())
    }

    #[test]
    fn get_returns_default_for_null_values() {
        let mut config = config([("a", JsonValue::Null)].into_iter().collect());
        assert_eq!(config.get_or("a", 7_i64).unwrap(), 7);
        assert!(config.unused_parameters().is_empty());
    }

    #[test]
    fn require_names_type_and_parameter() {
        let mut config = config(Parameters::new());
        let err = config.require::<String>("needed_key").unwrap_err();
        match err {
            PipelineError::MissingRequiredParameter { module, parameter } => {
                assert_eq!(module, "Observer");
                assert_eq!(parameter, "needed_key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn mistyped_parameter_is_invalid() {
        let mut config = config([("n", json!("many"))].into_iter().collect());
        let err = config.get::<u32>("n").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParameter { .. }));
    }

    #[test]
    fn add_supplies_defaults_after_construction() {
        let mut config = config(Parameters::new());
        config.add("window", 5);
        assert_eq!(config.get::<u32>("window").unwrap(), Some(5));
    }

    #[test]
    fn declarations_are_collected() {
        let mut config = config(Parameters::new());
        config.expose(42_u32, "answer");
        config.require_service("geometry", "to convert hits");
        let (provided, required) = config.into_declarations();
        assert_eq!(provided.len(), 1);
        assert_eq!(provided[0].0, "answer");
        assert_eq!(required.get("geometry").map(String::as_str), Some("to convert hits"));
    }
}
