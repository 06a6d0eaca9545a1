//! Service registration types.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptors::{ServiceDescriptor, ServiceInfo};
use crate::error::DiResult;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::provider::ResolverContext;

// Type-erased Arc for storage
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// Type-erased constructor shared by every lifetime.
pub(crate) type Ctor = Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync>;

/// Where a registration's instances are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheSlot {
    /// Not yet assigned (before `Registry::finalize`) or transient.
    None,
    /// Index into the provider's singleton cells.
    Root(usize),
    /// Index into every scope's scoped cells.
    Scope(usize),
}

/// Service registration with lifetime and constructor
pub(crate) struct Registration {
    pub(crate) lifetime: Lifetime,
    pub(crate) ctor: Ctor,
    /// Dependencies resolved before the constructor runs
    pub(crate) dependencies: Vec<Key>,
    pub(crate) slot: CacheSlot,
}

impl Registration {
    pub(crate) fn new(lifetime: Lifetime, ctor: Ctor, dependencies: Vec<Key>) -> Self {
        Self {
            lifetime,
            ctor,
            dependencies,
            slot: CacheSlot::None,
        }
    }
}

impl From<ServiceDescriptor> for Registration {
    fn from(descriptor: ServiceDescriptor) -> Self {
        Registration::new(descriptor.lifetime, descriptor.ctor, descriptor.dependencies)
    }
}

/// Erases a constructor closure into a [`Ctor`].
pub(crate) fn erase<F>(ctor: F) -> Ctor
where
    F: for<'a, 'b> Fn(&'b ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync + 'static,
{
    Arc::new(ctor)
}

/// Ordered set of registrations with keyed lookup.
#[derive(Default)]
pub(crate) struct Registry {
    entries: Vec<(Key, Registration)>,
    index: HashMap<Key, usize>,
    pub(crate) singleton_count: usize,
    pub(crate) scoped_count: usize,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts a registration. A repeated key replaces the earlier
    /// registration in place, so the last registration wins.
    pub(crate) fn insert(&mut self, key: Key, registration: Registration) {
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos] = (key, registration),
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push((key, registration));
            }
        }
    }

    #[inline]
    pub(crate) fn get(&self, key: &Key) -> Option<&Registration> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    #[inline]
    pub(crate) fn contains_key(&self, key: &Key) -> bool {
        self.index.contains_key(key)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Key, &Registration)> {
        self.entries.iter().map(|(k, r)| (k, r))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn infos(&self) -> Vec<ServiceInfo> {
        self.iter()
            .map(|(key, reg)| ServiceInfo {
                key: *key,
                lifetime: reg.lifetime,
                dependencies: reg.dependencies.clone(),
            })
            .collect()
    }

    /// Assigns cache slots in registration order.
    pub(crate) fn finalize(&mut self) {
        let mut next_singleton = 0;
        let mut next_scoped = 0;

        for (_, reg) in &mut self.entries {
            reg.slot = match reg.lifetime {
                Lifetime::Singleton => {
                    next_singleton += 1;
                    CacheSlot::Root(next_singleton - 1)
                }
                Lifetime::Scoped => {
                    next_scoped += 1;
                    CacheSlot::Scope(next_scoped - 1)
                }
                Lifetime::Transient => CacheSlot::None,
            };
        }

        self.singleton_count = next_singleton;
        self.scoped_count = next_scoped;
    }
}
