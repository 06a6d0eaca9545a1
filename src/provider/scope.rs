//! Scoped service resolution and lifecycle management.

use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::OnceCell;

use super::ServiceProvider;
use crate::registration::AnyArc;
use crate::traits::ResolverCore;
use crate::{DiResult, Key};

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Unit-of-work context bounding scoped service sharing.
///
/// A scope caches one instance per scoped registration. Singletons still come
/// from the root provider and transients are created fresh on every request.
/// Dropping the scope, or calling [`Scope::dispose`], releases its cached
/// instances.
///
/// # Lifetime Behavior
///
/// - **Singleton**: resolved and cached in the root provider
/// - **Scoped**: resolved and cached within this scope
/// - **Transient**: created fresh on every resolution
///
/// # Examples
///
/// ```
/// use lifetime_di::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct DatabaseConnection(String);
///
/// struct UserService {
///     db: Arc<DatabaseConnection>,
/// }
///
/// let mut collection = ServiceCollection::new();
/// collection.add_scoped_factory::<DatabaseConnection, _>(|_| {
///     Ok(DatabaseConnection("connection-123".to_string()))
/// });
/// collection.add_transient_factory::<UserService, _>(|r| {
///     Ok(UserService { db: r.get::<DatabaseConnection>()? })
/// });
///
/// let provider = collection.build();
/// let scope = provider.create_labeled_scope("request");
///
/// let service1 = scope.get_required::<UserService>();
/// let service2 = scope.get_required::<UserService>();
///
/// assert!(!Arc::ptr_eq(&service1, &service2));
/// assert!(Arc::ptr_eq(&service1.db, &service2.db));
/// assert_eq!(scope.dispose(), 1);
/// ```
pub struct Scope {
    root: ServiceProvider,
    id: u64,
    label: Option<String>,
    // One cell per scoped registration, indexed by its slot
    cells: Box<[OnceCell<AnyArc>]>,
}

impl Scope {
    pub(crate) fn new(root: ServiceProvider, label: Option<String>) -> Self {
        let inner = root.inner();
        let cells = (0..inner.registry.scoped_count)
            .map(|_| OnceCell::new())
            .collect::<Vec<_>>()
            .into_boxed_slice();
        let id = NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed);

        inner.live_scopes.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(scope = id, label = label.as_deref(), "scope created");
        inner.observers.scope_created(id, label.as_deref());

        Self { root, id, label, cells }
    }

    /// Process-unique scope id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Label given at creation, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The provider this scope was created from.
    pub fn provider(&self) -> &ServiceProvider {
        &self.root
    }

    /// Number of scoped instances constructed so far in this scope.
    pub fn cached_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.get().is_some()).count()
    }

    /// Ends the scope, releasing its cached instances.
    ///
    /// Returns how many scoped instances were released. Dropping the scope
    /// has the same effect without the count.
    pub fn dispose(self) -> usize {
        self.cached_count()
    }

    #[inline]
    pub(crate) fn cell(&self, slot: usize) -> &OnceCell<AnyArc> {
        &self.cells[slot]
    }

    pub(crate) fn belongs_to(&self, provider: &ServiceProvider) -> bool {
        self.root.same_as(provider)
    }
}

impl ResolverCore for Scope {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        self.root.resolve_from(key, Some(self))
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        let released = self.cached_count();
        let inner = self.root.inner();
        inner.live_scopes.fetch_sub(1, Ordering::AcqRel);
        tracing::debug!(scope = self.id, label = self.label.as_deref(), released, "scope disposed");
        inner.observers.scope_disposed(self.id, self.label.as_deref(), released);
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("cached", &self.cached_count())
            .finish()
    }
}
