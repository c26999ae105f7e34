// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Options accepted when attaching a module to a pipeline.

use serde_json::Value as JsonValue;

use crate::config::consts::{BLOB_KEYS, EVERY, ONLY_IF, TIMEIT};
use crate::config::Parameters;

/// Name, scheduling options and free-form parameters for one attachment.
///
/// Scheduling options are ordinary parameters under reserved names, so a
/// module configuration file overrides them like any other value.
///
/// ```rust
/// use the_sluice::config::Attach;
///
/// let options = Attach::named("printer")
///     .every(10)
///     .only_if(["hits"])
///     .param("prefix", ">> ");
///
/// assert_eq!(options.name(), Some("printer"));
/// assert_eq!(options.parameters().len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Attach {
    name: Option<String>,
    parameters: Parameters,
}

impl Attach {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new().with_name(name)
    }

    /// Display name; defaults to the module's type name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Run only on cycles whose 1-based index is a multiple of `every`.
    pub fn every(self, every: u64) -> Self {
        self.param(EVERY, every)
    }

    /// Run only when all `keys` are present in the blob.
    pub fn only_if<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.param(ONLY_IF, string_list(keys))
    }

    /// Record timing statistics for this module even when the pipeline does not.
    pub fn timeit(self, timeit: bool) -> Self {
        self.param(TIMEIT, timeit)
    }

    /// Hand the module only these keys and merge back only what it returns.
    pub fn blob_keys<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.param(BLOB_KEYS, string_list(keys))
    }

    /// Any other module parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.parameters.insert(name, value);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Parameters) {
        (self.name, self.parameters)
    }
}

fn string_list<I, S>(keys: I) -> JsonValue
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    JsonValue::Array(
        keys.into_iter()
            .map(|key| JsonValue::String(key.into()))
            .collect(),
    )
}
