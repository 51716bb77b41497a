//! Named collections of providers
//!
//! * The [ProviderLookup] trait is all the resolver needs: find the provider registered under a name.
//! * A [ProviderRegistry] is an exclusively owned map, mutated through `&mut`.
//! * A [SharedRegistry] is a mutex-guarded handle on a registry, shared by binders and callers.
//!   Registrations through any clone of the handle are seen by the next resolution.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::provide::Provider;

/// Find the provider registered for a lookup name
pub trait ProviderLookup {
    /// Absence is a normal outcome: nothing can be injected under this name.
    fn lookup(&self, name: &str) -> Option<Provider>;
}

/// Mapping from parameter names to providers.
///
/// Keys are unique, a later registration overrides the earlier one. There is no removal.
#[derive(Clone, Debug, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Provider>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry by registering each entry in turn
    pub fn with_providers<I, K, P>(providers: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<Provider>,
    {
        let mut registry = Self::new();
        registry.extend(providers);
        registry
    }

    /// Add or override an argument provider
    pub fn register(&mut self, name: impl Into<String>, provider: impl Into<Provider>) {
        self.providers.insert(name.into(), provider.into());
    }

    /// Chained variant of [ProviderRegistry::register]
    pub fn with(mut self, name: impl Into<String>, provider: impl Into<Provider>) -> Self {
        self.register(name, provider);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Provider> {
        self.providers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Registered names, in arbitrary order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }
}

impl<K: Into<String>, P: Into<Provider>> Extend<(K, P)> for ProviderRegistry {
    fn extend<I: IntoIterator<Item = (K, P)>>(&mut self, iter: I) {
        for (name, provider) in iter {
            self.register(name, provider);
        }
    }
}

impl<K: Into<String>, P: Into<Provider>> FromIterator<(K, P)> for ProviderRegistry {
    fn from_iter<I: IntoIterator<Item = (K, P)>>(iter: I) -> Self {
        Self::with_providers(iter)
    }
}

impl ProviderLookup for ProviderRegistry {
    fn lookup(&self, name: &str) -> Option<Provider> {
        self.get(name).cloned()
    }
}

/// Shared handle on a [ProviderRegistry].
///
/// Lookups clone the provider out and release the lock before it is invoked,
/// producers can thus register new providers without deadlocking.
#[derive(Clone, Debug, Default)]
pub struct SharedRegistry(Arc<Mutex<ProviderRegistry>>);

impl SharedRegistry {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self(Arc::new(Mutex::new(registry)))
    }

    /// Add or override an argument provider, visible to all holders of this handle
    pub fn register(&self, name: impl Into<String>, provider: impl Into<Provider>) {
        self.lock().register(name, provider);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    /// Copy of the current registry content
    pub fn snapshot(&self) -> ProviderRegistry {
        self.lock().clone()
    }

    /// Check if both handles point to the same registry
    pub fn ptr_eq(&self, other: &SharedRegistry) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    // A panic while holding the lock cannot leave the map half-updated
    fn lock(&self) -> MutexGuard<'_, ProviderRegistry> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<ProviderRegistry> for SharedRegistry {
    fn from(registry: ProviderRegistry) -> Self {
        Self::new(registry)
    }
}

impl ProviderLookup for SharedRegistry {
    fn lookup(&self, name: &str) -> Option<Provider> {
        self.lock().get(name).cloned()
    }
}
