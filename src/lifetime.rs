//! Service lifetime definitions.

use std::fmt;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Service lifetimes controlling instance caching behavior.
///
/// - **Singleton**: one instance per provider, shared by every scope
/// - **Scoped**: one instance per scope
/// - **Transient**: a new instance on every resolution
///
/// # Examples
///
/// ```rust
/// use lifetime_di::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct Repository { db_url: String }
/// struct RequestModel;
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Database { url: "postgres://localhost".to_string() });
/// services.add_scoped_factory::<Repository, _>(|r| {
///     let db = r.get::<Database>()?;
///     Ok(Repository { db_url: db.url.clone() })
/// });
/// services.add_transient_factory::<RequestModel, _>(|_| Ok(RequestModel));
///
/// let provider = services.build();
///
/// let db1 = provider.get_required::<Database>();
/// let scope1 = provider.create_scope();
/// let db2 = scope1.get_required::<Database>();
/// assert!(Arc::ptr_eq(&db1, &db2));
///
/// let repo1a = scope1.get_required::<Repository>();
/// let repo1b = scope1.get_required::<Repository>();
/// assert!(Arc::ptr_eq(&repo1a, &repo1b));
///
/// let scope2 = provider.create_scope();
/// let repo2 = scope2.get_required::<Repository>();
/// assert!(!Arc::ptr_eq(&repo1a, &repo2));
///
/// let model1 = scope1.get_required::<RequestModel>();
/// let model2 = scope1.get_required::<RequestModel>();
/// assert!(!Arc::ptr_eq(&model1, &model2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum Lifetime {
    /// Single instance per root provider, cached until the provider is dropped.
    Singleton,
    /// Single instance per scope, released with the scope.
    Scoped,
    /// New instance per resolution, never cached.
    Transient,
}

impl Lifetime {
    /// Whether instances of this lifetime are cached anywhere.
    pub fn is_cached(self) -> bool {
        !matches!(self, Lifetime::Transient)
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Lifetime::Singleton => "singleton",
            Lifetime::Scoped => "scoped",
            Lifetime::Transient => "transient",
        };
        f.write_str(name)
    }
}
