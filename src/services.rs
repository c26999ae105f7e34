// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pipeline-scoped service registry.
//!
//! Modules expose named capabilities (data or callables) while they are being
//! configured and other modules look them up by name. A [`ServiceRegistry`] is a
//! cheap handle: cloning it yields another handle onto the same registry, so a
//! module that kept the handle from its configuration sees services registered
//! by modules attached after it.
//!
//! ```rust
//! use std::sync::Arc;
//! use the_sluice::services::ServiceRegistry;
//!
//! type Scaler = Arc<dyn Fn(f64) -> f64 + Send + Sync>;
//!
//! let registry = ServiceRegistry::new();
//! let handle = registry.clone();
//! registry.register("scale", Arc::new(|x: f64| x * 2.0) as Scaler);
//!
//! let scale = handle.get::<Scaler>("scale").unwrap();
//! assert_eq!(scale(21.0), 42.0);
//! assert_eq!(handle.missing(["scale", "geometry"]), vec!["geometry"]);
//! ```

use std::any::{type_name, Any};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use crate::errors::{PipelineError, Result};

/// A registered capability.
pub type Service = Arc<dyn Any + Send + Sync>;

#[derive(Clone, Default)]
pub struct ServiceRegistry {
    services: Arc<RwLock<HashMap<String, Service>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `service` under `name`. An existing registration is replaced.
    pub fn register<T: Any + Send + Sync>(&self, name: impl Into<String>, service: T) {
        self.register_shared(name, Arc::new(service));
    }

    /// Register an already shared service.
    pub fn register_shared(&self, name: impl Into<String>, service: Service) {
        self.services
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), service);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// The untyped service registered under `name`.
    pub fn get_shared(&self, name: &str) -> Result<Service> {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| PipelineError::ServiceNotFound {
                name: name.to_string(),
            })
    }

    /// The service registered under `name`, downcast to `T`.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        self.get_shared(name)?
            .downcast::<T>()
            .map_err(|_| PipelineError::ServiceTypeMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Sorted, deduplicated names from `required` that nobody registered.
    pub fn missing<I, S>(&self, required: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let services = self.services.read().unwrap_or_else(PoisonError::into_inner);
        required
            .into_iter()
            .filter(|name| !services.contains_key(name.as_ref()))
            .map(|name| name.as_ref().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("service_names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_registration_wins() {
        let registry = ServiceRegistry::new();
        registry.register("threshold", 1_u32);
        registry.register("threshold", 2_u32);
        assert_eq!(*registry.get::<u32>("threshold").unwrap(), 2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_service_is_not_found() {
        let registry = ServiceRegistry::new();
        let err = registry.get::<u32>("nope").unwrap_err();
        assert!(matches!(err, PipelineError::ServiceNotFound { name } if name == "nope"));
        assert!(!registry.contains("nope"));
    }

    #[test]
    fn wrong_type_is_reported() {
        let registry = ServiceRegistry::new();
        registry.register("threshold", 1_u32);
        let err = registry.get::<String>("threshold").unwrap_err();
        assert!(matches!(err, PipelineError::ServiceTypeMismatch { .. }));
    }

    #[test]
    fn missing_is_sorted_and_deduplicated() {
        let registry = ServiceRegistry::new();
        registry.register("b", ());
        let missing = registry.missing(["d", "a", "b", "d", "c"]);
        assert_eq!(missing, vec!["a", "c", "d"]);
        assert!(registry.missing(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn clones_share_the_same_registry() {
        let registry = ServiceRegistry::new();
        let handle = registry.clone();
        handle.register("late", "value".to_string());
        assert!(registry.contains("late"));
        assert_eq!(registry.names(), vec!["late"]);
    }
}
