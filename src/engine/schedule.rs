// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-stage scheduling metadata, fixed when the stage is attached.

use serde_json::Value as JsonValue;

use crate::blob::Blob;
use crate::config::consts::{BLOB_KEYS, EVERY, ONLY_IF, TIMEIT};
use crate::config::Parameters;
use crate::errors::{PipelineError, Result};

/// When a stage runs and what part of the blob it sees.
///
/// ```rust
/// use the_sluice::blob::Blob;
/// use the_sluice::config::Attach;
/// use the_sluice::engine::Schedule;
///
/// let options = Attach::new().every(3).only_if(["hits"]);
/// let schedule = Schedule::from_parameters("printer", options.parameters()).unwrap();
///
/// assert!(!schedule.is_due(0));
/// assert!(schedule.is_due(2));
/// assert_eq!(schedule.missing_keys(&Blob::new()), vec!["hits"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    every: u64,
    only_if: Vec<String>,
    blob_keys: Option<Vec<String>>,
    timeit: bool,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            every: 1,
            only_if: Vec::new(),
            blob_keys: None,
            timeit: false,
        }
    }
}

impl Schedule {
    /// Read the scheduling parameters of `module`. Absent or null values keep
    /// their defaults; they are not marked as consumed.
    pub fn from_parameters(module: &str, parameters: &Parameters) -> Result<Self> {
        let mut schedule = Schedule::default();

        if let Some(value) = present(parameters, EVERY) {
            schedule.every = value
                .as_u64()
                .filter(|every| *every >= 1)
                .ok_or_else(|| invalid(module, EVERY, "expected a positive integer"))?;
        }
        if let Some(value) = present(parameters, ONLY_IF) {
            schedule.only_if = key_list(module, ONLY_IF, value)?;
        }
        if let Some(value) = present(parameters, BLOB_KEYS) {
            schedule.blob_keys = Some(key_list(module, BLOB_KEYS, value)?);
        }
        if let Some(value) = present(parameters, TIMEIT) {
            schedule.timeit = value
                .as_bool()
                .ok_or_else(|| invalid(module, TIMEIT, "expected a boolean"))?;
        }

        Ok(schedule)
    }

    pub fn every(&self) -> u64 {
        self.every
    }

    pub fn only_if(&self) -> &[String] {
        &self.only_if
    }

    /// Keys projected for the stage, `None` for the full blob.
    pub fn blob_keys(&self) -> Option<&[String]> {
        self.blob_keys.as_deref()
    }

    pub fn timeit(&self) -> bool {
        self.timeit
    }

    /// Whether the stage runs on the 0-based `cycle`.
    pub fn is_due(&self, cycle: usize) -> bool {
        (cycle as u64 + 1) % self.every == 0
    }

    /// The `only_if` keys absent from `blob`, in declaration order.
    pub fn missing_keys(&self, blob: &Blob) -> Vec<String> {
        self.only_if
            .iter()
            .filter(|key| !blob.contains_key(key))
            .cloned()
            .collect()
    }
}

fn present<'a>(parameters: &'a Parameters, name: &str) -> Option<&'a JsonValue> {
    parameters.peek(name).filter(|value| !value.is_null())
}

fn key_list(module: &str, parameter: &str, value: &JsonValue) -> Result<Vec<String>> {
    match value {
        JsonValue::String(key) => Ok(vec![key.clone()]),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid(module, parameter, "expected a list of keys"))
            })
            .collect(),
        _ => Err(invalid(module, parameter, "expected a key or a list of keys")),
    }
}

fn invalid(module: &str, parameter: &str, reason: &str) -> PipelineError {
    PipelineError::InvalidParameter {
        module: module.to_string(),
        parameter: parameter.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schedule(parameters: &[(&str, JsonValue)]) -> Result<Schedule> {
        let parameters: Parameters = parameters.iter().cloned().collect();
        Schedule::from_parameters("stage", &parameters)
    }

    #[test]
    fn defaults_run_every_cycle_on_the_full_blob() {
        let schedule = schedule(&[]).unwrap();
        assert_eq!(schedule, Schedule::default());
        assert!((0..5).all(|cycle| schedule.is_due(cycle)));
        assert!(schedule.blob_keys().is_none());
    }

    #[test]
    fn cadence_is_one_based() {
        let schedule = schedule(&[(EVERY, json!(3))]).unwrap();
        let due: Vec<usize> = (0..9).filter(|cycle| schedule.is_due(*cycle)).collect();
        assert_eq!(due, vec![2, 5, 8]);
    }

    #[test]
    fn only_if_accepts_a_single_key() {
        let schedule = schedule(&[(ONLY_IF, json!("foo"))]).unwrap();
        assert_eq!(schedule.only_if(), ["foo".to_string()]);

        let mut blob = Blob::new();
        assert_eq!(schedule.missing_keys(&blob), vec!["foo"]);
        blob.insert("foo", 1_u8);
        assert!(schedule.missing_keys(&blob).is_empty());
    }

    #[test]
    fn null_values_keep_defaults() {
        let schedule = schedule(&[
            (EVERY, JsonValue::Null),
            (BLOB_KEYS, JsonValue::Null),
            (TIMEIT, JsonValue::Null),
        ])
        .unwrap();
        assert_eq!(schedule, Schedule::default());
    }

    #[test]
    fn blob_keys_and_timeit_are_read() {
        let schedule = schedule(&[(BLOB_KEYS, json!(["a", "b"])), (TIMEIT, json!(true))]).unwrap();
        assert_eq!(
            schedule.blob_keys(),
            Some(&["a".to_string(), "b".to_string()][..])
        );
        assert!(schedule.timeit());
    }

    #[test]
    fn rejects_invalid_values() {
        for parameters in [
            vec![(EVERY, json!(0))],
            vec![(EVERY, json!(-2))],
            vec![(EVERY, json!("often"))],
            vec![(ONLY_IF, json!([1, 2]))],
            vec![(BLOB_KEYS, json!({"a": 1}))],
            vec![(TIMEIT, json!("yes"))],
        ] {
            let err = schedule(&parameters).unwrap_err();
            assert!(
                matches!(err, PipelineError::InvalidParameter { .. }),
                "{parameters:?} gave {err:?}"
            );
        }
    }
}
