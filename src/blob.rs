// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The per-cycle record passed from stage to stage.
//!
//! A [`Blob`] is an insertion-ordered map from string keys to shared,
//! type-erased values. Values are reference counted, so projecting a blob for a
//! stage with `blob_keys` or merging a stage's output back never copies the
//! underlying data.
//!
//! ```rust
//! use the_sluice::blob::Blob;
//!
//! let mut blob = Blob::new();
//! blob.insert("hits", vec![1, 2, 3]);
//! blob.insert("run", 42_u32);
//!
//! assert_eq!(blob.get::<u32>("run").unwrap(), &42);
//! assert_eq!(blob.keys().collect::<Vec<_>>(), vec!["hits", "run"]);
//! assert!(blob.get::<u32>("missing").is_err());
//! ```

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

use crate::errors::{PipelineError, Result};
use crate::observability::messages::blob::BlobKeyMissing;
use crate::observability::messages::StructuredLog;

/// Anything that can live in a blob.
///
/// Implemented for every `Debug + Send + Sync + 'static` type; `Debug` feeds the
/// blob's human-readable rendering.
pub trait BlobValue: Any + Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Debug + Send + Sync> BlobValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A shared, type-erased blob entry.
pub type Value = Arc<dyn BlobValue>;

/// Ordered key-value record. Keys are unique and keep their first insertion
/// position when overwritten.
#[derive(Clone, Default)]
pub struct Blob {
    order: Vec<String>,
    entries: HashMap<String, Value>,
}

impl Blob {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a blob with already shared values, e.g. to build a projected view.
    pub fn from_values<K, I>(values: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut blob = Self::new();
        for (key, value) in values {
            blob.insert_value(key, value);
        }
        blob
    }

    /// Insert or overwrite `key`.
    pub fn insert<K: Into<String>, T: BlobValue>(&mut self, key: K, value: T) {
        self.insert_value(key, Arc::new(value));
    }

    /// Insert or overwrite `key` with a value that may be shared with other blobs.
    pub fn insert_value<K: Into<String>>(&mut self, key: K, value: Value) {
        let key = key.into();
        if !self.entries.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.entries.insert(key, value);
    }

    /// The entry under `key`, downcast to `T`.
    pub fn get<T: Any>(&self, key: &str) -> Result<&T> {
        let value = self.get_value(key)?;
        BlobValue::as_any(&**value)
            .downcast_ref::<T>()
            .ok_or_else(|| PipelineError::BlobTypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// The shared entry under `key`. A missing key is logged together with the
    /// keys that are present before the error is returned.
    pub fn get_value(&self, key: &str) -> Result<&Value> {
        match self.entries.get(key) {
            Some(value) => Ok(value),
            None => {
                let available: Vec<String> = self.order.clone();
                BlobKeyMissing {
                    key,
                    available: &available,
                }
                .log();
                Err(PipelineError::MissingKey {
                    key: key.to_string(),
                    available,
                })
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let value = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(key).map(|value| (key.as_str(), value)))
    }

    /// A new blob holding the requested keys that are present here, in the
    /// order they were requested. Absent keys are silently left out.
    pub fn project<S: AsRef<str>>(&self, keys: &[S]) -> Blob {
        Blob::from_values(keys.iter().filter_map(|key| {
            let key = key.as_ref();
            self.entries
                .get(key)
                .map(|value| (key, Arc::clone(value)))
        }))
    }

    /// Copy every entry of `other` into this blob, overwriting collisions.
    /// Keys absent from `other` are left untouched.
    pub fn merge(&mut self, other: Blob) {
        let Blob { order, mut entries } = other;
        for key in order {
            if let Some(value) = entries.remove(&key) {
                self.insert_value(key, value);
            }
        }
    }
}

impl<K: Into<String>, T: BlobValue> FromIterator<(K, T)> for Blob {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut blob = Blob::new();
        for (key, value) in iter {
            blob.insert(key, value);
        }
        blob
    }
}

impl Debug for Blob {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl Display for Blob {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "Empty blob");
        }
        let padding = self.order.iter().map(String::len).max().unwrap_or(0) + 3;
        write!(f, "Blob ({} entries):", self.len())?;
        for (key, value) in self.iter() {
            let label = format!(" '{}'", key);
            write!(f, "\n{:<width$} => {:?}", label, value, width = padding)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Blob {
        Blob::from_iter([("a", 1_i64), ("b", 2), ("c", 3)])
    }

    #[test]
    fn keeps_insertion_order_on_overwrite() {
        let mut blob = abc();
        blob.insert("a", 10_i64);
        blob.insert("d", 4_i64);
        assert_eq!(blob.keys().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
        assert_eq!(blob.get::<i64>("a").unwrap(), &10);
        assert_eq!(blob.len(), 4);
    }

    #[test]
    fn missing_key_reports_available_keys() {
        let blob = Blob::from_iter([("a", 1_i64), ("b", 2)]);
        let err = blob.get::<i64>("c").unwrap_err();
        match &err {
            PipelineError::MissingKey { key, available } => {
                assert_eq!(key, "c");
                assert_eq!(available, &vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("c"));
        assert!(msg.contains("a, b"));
    }

    #[test]
    fn wrong_type_is_a_type_mismatch() {
        let blob = abc();
        let err = blob.get::<String>("a").unwrap_err();
        assert!(matches!(err, PipelineError::BlobTypeMismatch { .. }));
    }

    #[test]
    fn projection_keeps_only_present_requested_keys() {
        let blob = abc();
        let view = blob.project(&["c", "x", "a"]);
        assert_eq!(view.keys().collect::<Vec<_>>(), vec!["c", "a"]);
        assert!(Arc::ptr_eq(
            view.get_value("a").unwrap(),
            blob.get_value("a").unwrap()
        ));
    }

    #[test]
    fn merge_overwrites_returned_keys_only() {
        let mut blob = abc();
        let mut update = Blob::new();
        update.insert("b", 20_i64);
        update.insert("d", 4_i64);
        blob.merge(update);
        assert_eq!(blob.keys().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
        assert_eq!(blob.get::<i64>("a").unwrap(), &1);
        assert_eq!(blob.get::<i64>("b").unwrap(), &20);
    }

    #[test]
    fn remove_drops_key_from_order() {
        let mut blob = abc();
        assert!(blob.remove("b").is_some());
        assert!(blob.remove("b").is_none());
        assert_eq!(blob.keys().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn display_pads_keys_to_common_width() {
        assert_eq!(Blob::new().to_string(), "Empty blob");

        let mut blob = Blob::new();
        blob.insert("a", 1_i64);
        blob.insert("longer", "x".to_string());
        let rendered = blob.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Blob (2 entries):");
        assert_eq!(lines[1], " 'a'      => 1");
        assert_eq!(lines[2], " 'longer' => \"x\"");
    }

    #[test]
    fn blobs_nest() {
        let mut outer = Blob::new();
        outer.insert("inner", abc());
        assert_eq!(outer.get::<Blob>("inner").unwrap().len(), 3);
    }
}
