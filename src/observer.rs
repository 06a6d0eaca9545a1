//! Diagnostic observers for resolution and scope events.
//!
//! Observers are registered on the `ServiceCollection` and shared by the
//! provider. When none are registered the resolver skips timing entirely.

use std::sync::Arc;
use std::time::Duration;

use crate::{DiError, Key, Lifetime};

/// Hook for observing container activity.
///
/// Resolution callbacks fire for every service on the chain, dependencies
/// included, so a failing dependency reports `failed` once per enclosing
/// service.
///
/// # Examples
///
/// ```
/// use lifetime_di::{DiError, DiObserver, Key, Lifetime, Resolver, ServiceCollection};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Counting(AtomicUsize);
///
/// impl DiObserver for Counting {
///     fn resolving(&self, _key: &Key, _lifetime: Lifetime) {}
///     fn resolved(&self, _key: &Key, _lifetime: Lifetime, _duration: Duration) {
///         self.0.fetch_add(1, Ordering::SeqCst);
///     }
///     fn failed(&self, _key: &Key, _error: &DiError) {}
/// }
///
/// let observer = Arc::new(Counting::default());
/// let mut services = ServiceCollection::new();
/// services.add_singleton(7u32);
/// services.add_observer(observer.clone());
///
/// let provider = services.build();
/// provider.get_required::<u32>();
/// assert_eq!(observer.0.load(Ordering::SeqCst), 1);
/// ```
pub trait DiObserver: Send + Sync {
    /// A resolution for `key` is starting.
    fn resolving(&self, key: &Key, lifetime: Lifetime);

    /// `key` was resolved, from cache or freshly constructed.
    fn resolved(&self, key: &Key, lifetime: Lifetime, duration: Duration);

    /// Resolution of `key` failed.
    fn failed(&self, key: &Key, error: &DiError);

    fn scope_created(&self, _id: u64, _label: Option<&str>) {}

    /// A scope ended, releasing `released` scoped instances.
    fn scope_disposed(&self, _id: u64, _label: Option<&str>, _released: usize) {}
}

#[derive(Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn resolving(&self, key: &Key, lifetime: Lifetime) {
        for observer in &self.observers {
            observer.resolving(key, lifetime);
        }
    }

    pub(crate) fn resolved(&self, key: &Key, lifetime: Lifetime, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, lifetime, duration);
        }
    }

    pub(crate) fn failed(&self, key: &Key, error: &DiError) {
        for observer in &self.observers {
            observer.failed(key, error);
        }
    }

    pub(crate) fn scope_created(&self, id: u64, label: Option<&str>) {
        for observer in &self.observers {
            observer.scope_created(id, label);
        }
    }

    pub(crate) fn scope_disposed(&self, id: u64, label: Option<&str>, released: usize) {
        for observer in &self.observers {
            observer.scope_disposed(id, label, released);
        }
    }
}

/// Observer that reports every event through `tracing`.
///
/// Resolutions are logged at `debug`, failures at `warn`, scope lifecycle at
/// `info`. The `name` field tells several containers apart in one log.
pub struct TracingObserver {
    name: String,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self::with_name("lifetime-di")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiObserver for TracingObserver {
    fn resolving(&self, key: &Key, lifetime: Lifetime) {
        tracing::debug!(container = %self.name, service = key.display_name(), %lifetime, "resolving");
    }

    fn resolved(&self, key: &Key, lifetime: Lifetime, duration: Duration) {
        tracing::debug!(
            container = %self.name,
            service = key.display_name(),
            %lifetime,
            elapsed_us = duration.as_micros() as u64,
            "resolved"
        );
    }

    fn failed(&self, key: &Key, error: &DiError) {
        tracing::warn!(container = %self.name, service = key.display_name(), %error, "resolution failed");
    }

    fn scope_created(&self, id: u64, label: Option<&str>) {
        tracing::info!(container = %self.name, scope = id, label, "scope created");
    }

    fn scope_disposed(&self, id: u64, label: Option<&str>, released: usize) {
        tracing::info!(container = %self.name, scope = id, label, released, "scope disposed");
    }
}
