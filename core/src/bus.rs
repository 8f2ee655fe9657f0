//! Bus - Typed Resource Container for Predicates
//!
//! Predicates decide whether a step is done or should be skipped, and that
//! decision usually depends on caller state: the signed-in profile, a
//! feature flag, an API client. The Bus carries that state into every
//! predicate evaluation.
//!
//! Resources are keyed by type. The Bus is handed to predicates by shared
//! reference only; the resolver and navigator never mutate it.

use std::any::{Any, TypeId};

use ahash::AHashMap;

/// Type-keyed resource container (TypeMap pattern).
#[derive(Default)]
pub struct Bus {
    resources: AHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Bus {
    /// Create a new empty Bus
    pub fn new() -> Self {
        Bus {
            resources: AHashMap::new(),
        }
    }

    /// Builder-style insert, handy when wiring a Bus in one expression.
    pub fn with<T: Send + Sync + 'static>(mut self, resource: T) -> Self {
        self.insert(resource);
        self
    }

    /// Insert a resource into the Bus.
    ///
    /// If a resource of this type already exists, it is replaced.
    pub fn insert<T: Send + Sync + 'static>(&mut self, resource: T) {
        self.resources.insert(TypeId::of::<T>(), Box::new(resource));
    }

    /// Get a reference to a resource.
    ///
    /// Returns `None` if the resource type is not present.
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.resources
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref())
    }

    /// Get a resource or fail with a descriptive error.
    ///
    /// Predicates use this to turn a wiring mistake into a propagated
    /// predicate failure instead of a silent `false`.
    pub fn require<T: 'static>(&self) -> anyhow::Result<&T> {
        self.get::<T>().ok_or_else(|| {
            anyhow::anyhow!(
                "resource `{}` is not present on the Bus",
                std::any::type_name::<T>()
            )
        })
    }

    /// Get a mutable reference to a resource.
    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.resources
            .get_mut(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_mut())
    }

    /// Check if a resource type is present.
    pub fn contains<T: 'static>(&self) -> bool {
        self.resources.contains_key(&TypeId::of::<T>())
    }

    /// Remove a resource from the Bus, returning it if present.
    pub fn remove<T: 'static>(&mut self) -> Option<T> {
        self.resources
            .remove(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast().ok())
            .map(|boxed| *boxed)
    }
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bus")
            .field("resource_count", &self.resources.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Profile {
        complete: bool,
    }

    #[test]
    fn test_insert_and_get() {
        let bus = Bus::new()
            .with(Profile { complete: true })
            .with("tenant-a".to_string());

        assert_eq!(bus.get::<Profile>(), Some(&Profile { complete: true }));
        assert_eq!(bus.get::<String>(), Some(&"tenant-a".to_string()));
        assert_eq!(bus.get::<u32>(), None);
    }

    #[test]
    fn test_require_reports_missing_type() {
        let bus = Bus::new();
        let err = bus.require::<Profile>().unwrap_err();
        assert!(err.to_string().contains("Profile"));
    }

    #[test]
    fn test_get_mut_and_remove() {
        let mut bus = Bus::new();
        bus.insert(Profile { complete: false });

        if let Some(profile) = bus.get_mut::<Profile>() {
            profile.complete = true;
        }
        assert!(bus.contains::<Profile>());
        assert_eq!(bus.remove::<Profile>(), Some(Profile { complete: true }));
        assert!(!bus.contains::<Profile>());
    }
}
