//! Service provider module for dependency injection.
//!
//! This module contains the ServiceProvider type, the lifetime resolver at the
//! heart of the container, and the Scope and ResolverContext types it hands
//! out.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::OnceCell;

use crate::config::ContainerOptions;
use crate::descriptors::ServiceInfo;
use crate::internal::circular::{self, Frame};
use crate::observer::Observers;
use crate::registration::{AnyArc, CacheSlot, Registration, Registry};
use crate::traits::ResolverCore;
use crate::{DiError, DiResult, Key, Lifetime};

pub mod context;
pub mod scope;

pub use context::ResolverContext;
pub use scope::Scope;

/// Root container resolving services according to their lifetimes.
///
/// Holds the immutable registrations and the singleton cache. Cloning is
/// cheap and every clone shares the same singletons. Scoped services can
/// only be resolved through a [`Scope`] created by this provider.
///
/// # Thread Safety
///
/// The provider is `Send + Sync`. Concurrent first resolutions of a
/// singleton construct it exactly once; the losing threads wait and receive
/// the winner's instance.
///
/// # Examples
///
/// ```
/// use lifetime_di::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let mut collection = ServiceCollection::new();
/// collection.add_singleton(Database { url: "postgres://localhost".to_string() });
/// collection.add_transient_factory::<UserService, _>(|resolver| {
///     Ok(UserService { db: resolver.get::<Database>()? })
/// });
///
/// let provider = collection.build();
/// let user_service = provider.get_required::<UserService>();
/// assert_eq!(user_service.db.url, "postgres://localhost");
/// ```
#[derive(Clone)]
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

pub(crate) struct ProviderInner {
    pub(crate) registry: Registry,
    pub(crate) singletons: Box<[OnceCell<AnyArc>]>,
    pub(crate) observers: Observers,
    pub(crate) options: ContainerOptions,
    pub(crate) live_scopes: AtomicUsize,
}

impl ServiceProvider {
    /// Builds a provider over a finalized registry.
    pub(crate) fn new(registry: Registry, observers: Observers, options: ContainerOptions) -> Self {
        let singletons = (0..registry.singleton_count)
            .map(|_| OnceCell::new())
            .collect::<Vec<_>>()
            .into_boxed_slice();

        tracing::debug!(
            services = registry.len(),
            singletons = registry.singleton_count,
            scoped = registry.scoped_count,
            "service provider built"
        );

        Self {
            inner: Arc::new(ProviderInner {
                registry,
                singletons,
                observers,
                options,
                live_scopes: AtomicUsize::new(0),
            }),
        }
    }

    #[inline]
    pub(crate) fn inner(&self) -> &ProviderInner {
        &self.inner
    }

    /// Creates a new scope for resolving scoped services.
    ///
    /// # Examples
    ///
    /// ```
    /// use lifetime_di::{ServiceCollection, Resolver};
    /// use std::sync::atomic::{AtomicU32, Ordering};
    /// use std::sync::Arc;
    ///
    /// struct RequestId(u32);
    ///
    /// let counter = Arc::new(AtomicU32::new(0));
    /// let counter_clone = counter.clone();
    ///
    /// let mut collection = ServiceCollection::new();
    /// collection.add_scoped_factory::<RequestId, _>(move |_| {
    ///     Ok(RequestId(counter_clone.fetch_add(1, Ordering::SeqCst)))
    /// });
    ///
    /// let provider = collection.build();
    /// let scope1 = provider.create_scope();
    /// let scope2 = provider.create_scope();
    ///
    /// let req1a = scope1.get_required::<RequestId>();
    /// let req1b = scope1.get_required::<RequestId>();
    /// let req2 = scope2.get_required::<RequestId>();
    ///
    /// assert!(Arc::ptr_eq(&req1a, &req1b));
    /// assert!(!Arc::ptr_eq(&req1a, &req2));
    /// assert_eq!(counter.load(Ordering::SeqCst), 2);
    /// ```
    pub fn create_scope(&self) -> Scope {
        Scope::new(self.clone(), None)
    }

    /// Creates a scope carrying a label for logs and observers.
    pub fn create_labeled_scope(&self, label: impl Into<String>) -> Scope {
        Scope::new(self.clone(), Some(label.into()))
    }

    /// Resolves `key` at the root (`scope == None`) or within `scope`.
    ///
    /// This is the type-erased entry point; most callers use the typed
    /// [`Resolver`](crate::Resolver) methods instead.
    ///
    /// # Errors
    ///
    /// - [`DiError::NotFound`] if nothing is registered for `key`
    /// - [`DiError::ScopeRequired`] for a scoped service without a scope
    /// - [`DiError::Circular`] if the dependency chain loops
    /// - [`DiError::ForeignScope`] if `scope` came from another provider
    pub fn resolve(&self, key: &Key, scope: Option<&Scope>) -> DiResult<AnyArc> {
        if let Some(scope) = scope {
            if !scope.belongs_to(self) {
                return Err(DiError::ForeignScope(scope.id()));
            }
        }
        self.resolve_from(key, scope)
    }

    /// Whether a registration exists for `key`.
    pub fn contains(&self, key: &Key) -> bool {
        self.inner().registry.contains_key(key)
    }

    /// Registrations in registration order.
    pub fn service_infos(&self) -> Vec<ServiceInfo> {
        self.inner().registry.infos()
    }

    /// Number of scopes created by this provider that are still alive.
    pub fn active_scopes(&self) -> usize {
        self.inner().live_scopes.load(Ordering::Acquire)
    }

    /// Options the provider was built with.
    pub fn options(&self) -> &ContainerOptions {
        &self.inner().options
    }

    pub(crate) fn same_as(&self, other: &ServiceProvider) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Address of the shared provider state, tagging this provider's entries
    /// on the resolution stack.
    #[inline]
    fn owner_id(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    /// Resolution within `scope`, checked against whatever this thread is
    /// already constructing for this provider.
    pub(crate) fn resolve_from(&self, key: &Key, scope: Option<&Scope>) -> DiResult<AnyArc> {
        let name = key.display_name();
        let owner = self.owner_id();
        let ancestry = circular::ancestry(owner, key);

        if let Some(path) = ancestry.cycle {
            tracing::debug!(path = ?path, "circular dependency detected");
            return Err(DiError::Circular(path));
        }
        let max_depth = self.inner().options.max_depth;
        if ancestry.depth >= max_depth {
            return Err(DiError::DepthExceeded(max_depth));
        }

        let reg = self.inner().registry.get(key).ok_or(DiError::NotFound(name))?;

        if reg.lifetime == Lifetime::Scoped && self.inner().options.validate_scopes {
            if let Some(singleton) = ancestry.enclosing_singleton {
                return Err(DiError::CaptiveDependency { singleton, scoped: name });
            }
        }

        let frame = Frame::enter(owner, *key, reg.lifetime, ancestry.depth + 1);
        let observers = &self.inner().observers;

        if !observers.has_observers() {
            return self.resolve_registration(reg, scope, &frame);
        }

        let start = Instant::now();
        observers.resolving(key, reg.lifetime);
        let result = self.resolve_registration(reg, scope, &frame);
        match &result {
            Ok(_) => observers.resolved(key, reg.lifetime, start.elapsed()),
            Err(e) => observers.failed(key, e),
        }
        result
    }

    /// Dispatches on the cache slot assigned to the registration's lifetime.
    fn resolve_registration(
        &self,
        reg: &Registration,
        scope: Option<&Scope>,
        frame: &Frame,
    ) -> DiResult<AnyArc> {
        match reg.slot {
            CacheSlot::Root(slot) => {
                let cell = &self.inner().singletons[slot];
                if let Some(value) = cell.get() {
                    tracing::trace!(service = frame.key.display_name(), "singleton cache hit");
                    return Ok(value.clone());
                }
                // Blocks concurrent initialisers; a failed factory leaves the cell empty
                cell.get_or_try_init(|| self.construct(reg, scope, frame))
                    .map(Arc::clone)
            }
            CacheSlot::Scope(slot) => {
                let scope = scope.ok_or(DiError::ScopeRequired(frame.key.display_name()))?;
                let cell = scope.cell(slot);
                if let Some(value) = cell.get() {
                    tracing::trace!(service = frame.key.display_name(), scope = scope.id(), "scoped cache hit");
                    return Ok(value.clone());
                }
                cell.get_or_try_init(|| self.construct(reg, Some(scope), frame))
                    .map(Arc::clone)
            }
            CacheSlot::None => self.construct(reg, scope, frame),
        }
    }

    /// Resolves declared dependencies in order, then runs the factory.
    fn construct(
        &self,
        reg: &Registration,
        scope: Option<&Scope>,
        frame: &Frame,
    ) -> DiResult<AnyArc> {
        let mut declared = Vec::with_capacity(reg.dependencies.len());
        for dep in &reg.dependencies {
            let value = self.resolve_from(dep, scope)?;
            declared.push((*dep, value));
        }

        tracing::trace!(
            service = frame.key.display_name(),
            lifetime = %reg.lifetime,
            scope = scope.map(|s| s.id()),
            "constructing service"
        );

        let ctx = ResolverContext::new(self, scope, frame, declared);
        (reg.ctor)(&ctx)
    }
}

impl ResolverCore for ServiceProvider {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        self.resolve_from(key, None)
    }
}

impl std::fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("services", &self.inner().registry.len())
            .field("active_scopes", &self.active_scopes())
            .field("options", &self.inner().options)
            .finish()
    }
}
