// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Declared module parameters with consumption tracking.

use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::consts::RESERVED_PARAMETERS;
use crate::observability::messages::module::ParameterOverridden;
use crate::observability::messages::StructuredLog;

/// Parameters declared for one module, remembering which ones were read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    values: BTreeMap<String, JsonValue>,
    consumed: BTreeSet<String>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Read `name` and mark it consumed, whether or not it is present.
    pub fn consume(&mut self, name: &str) -> Option<&JsonValue> {
        self.consumed.insert(name.to_string());
        self.values.get(name)
    }

    /// Read `name` without marking it consumed.
    pub fn peek(&self, name: &str) -> Option<&JsonValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Apply configuration file values on top of the declared ones. Each value
    /// replacing a declared one is reported for `module`.
    pub fn apply_overrides(&mut self, module: &str, overrides: &Map<String, JsonValue>) {
        for (name, value) in overrides {
            if self.values.contains_key(name) {
                ParameterOverridden {
                    module,
                    parameter: name,
                }
                .log();
            }
            self.values.insert(name.clone(), value.clone());
        }
    }

    /// Declared names that were never consumed, minus the scheduling
    /// parameters, sorted.
    pub fn unused(&self) -> Vec<String> {
        self.values
            .keys()
            .filter(|name| !self.consumed.contains(*name))
            .filter(|name| !RESERVED_PARAMETERS.contains(&name.as_str()))
            .cloned()
            .collect()
    }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut parameters = Parameters::new();
        for (name, value) in iter {
            parameters.insert(name, value);
        }
        parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unused_ignores_consumed_and_reserved_names() {
        let mut parameters: Parameters = [
            ("a", json!(1)),
            ("b", json!(2)),
            ("every", json!(3)),
            ("only_if", json!("x")),
            ("timeit", json!(true)),
            ("blob_keys", json!(["a"])),
        ]
        .into_iter()
        .collect();

        assert_eq!(parameters.consume("a"), Some(&json!(1)));
        assert_eq!(parameters.unused(), vec!["b"]);
    }

    #[test]
    fn consuming_an_absent_name_still_counts() {
        let mut parameters = Parameters::new();
        assert!(parameters.consume("ghost").is_none());
        parameters.insert("ghost", 1);
        assert!(parameters.unused().is_empty());
    }

    #[test]
    fn unused_names_are_sorted() {
        let parameters: Parameters = [("zeta", 1), ("alpha", 2), ("mid", 3)]
            .into_iter()
            .collect();
        assert_eq!(parameters.unused(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn overrides_replace_declared_values() {
        let mut parameters: Parameters = [("b", json!("x"))].into_iter().collect();
        let overrides = json!({"b": "y", "c": 3});
        parameters.apply_overrides("Stage", overrides.as_object().unwrap());
        assert_eq!(parameters.peek("b"), Some(&json!("y")));
        assert_eq!(parameters.peek("c"), Some(&json!(3)));
    }
}
