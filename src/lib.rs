//! # lifetime-di
//!
//! A small, thread-safe dependency injection container with three service
//! lifetimes, modelled on Microsoft.Extensions.DependencyInjection.
//!
//! ## Features
//!
//! - **Lifetimes**: Singleton, Scoped, and Transient services
//! - **Explicit scopes**: unit-of-work boundaries created and ended by the caller
//! - **Declared dependencies**: factories can list what they need up front
//! - **Circular dependency detection**: errors carry the full dependency path
//! - **Thread-safe caches**: at most one instance per singleton, and per scope for scoped services
//! - **Validation and observers**: static graph checks and `tracing` hooks
//!
//! ## Quick Start
//!
//! ```rust
//! use lifetime_di::{ServiceCollection, Resolver};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let mut services = ServiceCollection::new();
//! services.add_singleton(Database {
//!     connection_string: "postgres://localhost".to_string(),
//! });
//! services.add_transient_factory::<UserService, _>(|resolver| {
//!     Ok(UserService {
//!         db: resolver.get::<Database>()?,
//!     })
//! });
//!
//! let provider = services.build();
//! let user_service = provider.get_required::<UserService>();
//! assert_eq!(user_service.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Service Lifetimes
//!
//! - **Singleton**: created once and shared across the entire provider
//! - **Scoped**: created once per scope; resolving one without a scope is an error
//! - **Transient**: created fresh on every resolution
//!
//! ## Scoped Services
//!
//! ```rust
//! use lifetime_di::{DiError, ServiceCollection, Resolver};
//! use std::sync::Arc;
//!
//! struct RequestId(String);
//!
//! let mut services = ServiceCollection::new();
//! services.add_scoped_factory::<RequestId, _>(|r| {
//!     let label = r.scope().and_then(|s| s.label()).unwrap_or("anonymous");
//!     Ok(RequestId(format!("req-{}", label)))
//! });
//!
//! let provider = services.build();
//! assert!(matches!(provider.get::<RequestId>(), Err(DiError::ScopeRequired(_))));
//!
//! let scope_a = provider.create_labeled_scope("A");
//! let scope_b = provider.create_labeled_scope("B");
//! let a = scope_a.get_required::<RequestId>();
//! let b = scope_b.get_required::<RequestId>();
//! assert_eq!(a.0, "req-A");
//! assert_eq!(b.0, "req-B");
//! assert!(Arc::ptr_eq(&a, &scope_a.get_required::<RequestId>()));
//! ```

pub mod collection;
pub mod config;
pub mod descriptors;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod provider;
pub mod traits;
pub mod validation;

// Internal modules
mod internal;
mod registration;

// Re-export core types
pub use collection::{ServiceCollection, ServiceCollectionExt, ServiceCollectionModuleExt, ServiceModule};
pub use config::ContainerOptions;
pub use descriptors::{ServiceDescriptor, ServiceInfo};
pub use error::{DiError, DiResult};
pub use key::{key_of_trait, key_of_type, Key};
pub use lifetime::Lifetime;
pub use observer::{DiObserver, TracingObserver};
pub use provider::{ResolverContext, Scope, ServiceProvider};
pub use traits::{Resolver, ResolverCore};
pub use validation::{ValidationError, ValidationReport, ValidationWarning};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_singleton_resolution() {
        let mut sc = ServiceCollection::new();
        sc.add_singleton(42usize);

        let sp = sc.build();
        let a = sp.get_required::<usize>();
        let b = sp.get_required::<usize>();

        assert_eq!(*a, 42);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_transient_resolution() {
        let mut sc = ServiceCollection::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        sc.add_transient_factory::<String, _>(move |_| {
            Ok(format!("instance-{}", counter_clone.fetch_add(1, Ordering::SeqCst) + 1))
        });

        let sp = sc.build();
        let a = sp.get_required::<String>();
        let b = sp.get_required::<String>();

        assert_eq!(a.as_str(), "instance-1");
        assert_eq!(b.as_str(), "instance-2");
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_scoped_resolution() {
        let mut sc = ServiceCollection::new();
        sc.add_scoped_factory::<String, _>(|_| Ok("scoped".to_string()));

        let sp = sc.build();

        let scope1 = sp.create_scope();
        let s1a = scope1.get_required::<String>();
        let s1b = scope1.get_required::<String>();
        assert!(Arc::ptr_eq(&s1a, &s1b));

        let scope2 = sp.create_scope();
        let s2 = scope2.get_required::<String>();
        assert!(!Arc::ptr_eq(&s1a, &s2));
    }

    #[test]
    fn test_resolve_with_explicit_scope_argument() {
        let mut sc = ServiceCollection::new();
        sc.add_scoped_factory::<u64, _>(|_| Ok(5));
        let sp = sc.build();
        let key = key_of_type::<u64>();

        assert_eq!(sp.resolve(&key, None).unwrap_err(), DiError::ScopeRequired(key.display_name()));

        let scope = sp.create_scope();
        let a = sp.resolve(&key, Some(&scope)).unwrap();
        let b = scope.get_required::<u64>();
        assert!(Arc::ptr_eq(&a.downcast::<u64>().unwrap(), &b));
    }

    #[test]
    fn test_foreign_scope_is_rejected() {
        let mut sc = ServiceCollection::new();
        sc.add_scoped_factory::<u64, _>(|_| Ok(5));
        let sp = sc.build();
        let other = ServiceCollection::new().build();
        let foreign = other.create_scope();

        let err = sp.resolve(&key_of_type::<u64>(), Some(&foreign)).unwrap_err();
        assert_eq!(err, DiError::ForeignScope(foreign.id()));
    }

    #[test]
    fn test_trait_resolution() {
        trait TestTrait: Send + Sync {
            fn get_value(&self) -> i32;
        }

        struct TestImpl {
            value: i32,
        }

        impl TestTrait for TestImpl {
            fn get_value(&self) -> i32 {
                self.value
            }
        }

        let mut sc = ServiceCollection::new();
        sc.add_singleton_trait::<dyn TestTrait>(Arc::new(TestImpl { value: 42 }));

        let sp = sc.build();
        let service = sp.get_required_trait::<dyn TestTrait>();
        assert_eq!(service.get_value(), 42);
    }
}
