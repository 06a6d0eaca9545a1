//! Resolver traits for service resolution.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::{key_of_trait, key_of_type, Key};
use crate::registration::AnyArc;

/// Core resolver trait for object-safe service resolution.
///
/// Implemented by [`ServiceProvider`](crate::ServiceProvider) (root
/// resolution, no scope), [`Scope`](crate::Scope) and the
/// [`ResolverContext`](crate::ResolverContext) handed to factories.
pub trait ResolverCore: Send + Sync {
    /// Resolves a single service by key, returning the type-erased instance.
    fn resolve_any(&self, key: &Key) -> DiResult<Arc<dyn std::any::Any + Send + Sync>>;
}

/// High-level resolver interface with generic methods for type-safe service resolution.
///
/// Implemented for every [`ResolverCore`].
///
/// # Examples
///
/// ```
/// use lifetime_di::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// trait Printer: Send + Sync {
///     fn print(&self, msg: &str) -> String;
/// }
///
/// struct ConsolePrinter;
/// impl Printer for ConsolePrinter {
///     fn print(&self, msg: &str) -> String {
///         format!("[ {} ]", msg)
///     }
/// }
///
/// let mut collection = ServiceCollection::new();
/// collection.add_singleton(42usize);
/// collection.add_singleton_trait::<dyn Printer>(Arc::new(ConsolePrinter));
///
/// let provider = collection.build();
/// assert_eq!(*provider.get_required::<usize>(), 42);
/// assert_eq!(provider.get_required_trait::<dyn Printer>().print("hi"), "[ hi ]");
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves a concrete service type.
    fn get<T: 'static + Send + Sync>(&self) -> DiResult<Arc<T>> {
        let any = self.resolve_any(&key_of_type::<T>())?;
        downcast::<T>(any)
    }

    /// Resolves a trait object service registered under `dyn Trait`.
    fn get_trait<T: ?Sized + 'static + Send + Sync>(&self) -> DiResult<Arc<T>> {
        let any = self.resolve_any(&key_of_trait::<T>())?;
        // Trait objects are stored as Arc<Arc<dyn Trait>>
        let outer = any
            .downcast::<Arc<T>>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))?;
        Ok((*outer).clone())
    }

    /// Resolves a concrete service, returning `None` when it is not registered.
    ///
    /// Any other failure is still an error.
    fn get_optional<T: 'static + Send + Sync>(&self) -> DiResult<Option<Arc<T>>> {
        match self.get::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(DiError::NotFound(name)) if name == std::any::type_name::<T>() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Resolves a concrete service, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics with the error message if resolution fails.
    fn get_required<T: 'static + Send + Sync>(&self) -> Arc<T> {
        self.get::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", std::any::type_name::<T>(), e))
    }

    /// Resolves a trait object service, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics with the error message if resolution fails.
    fn get_required_trait<T: ?Sized + 'static + Send + Sync>(&self) -> Arc<T> {
        self.get_trait::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", std::any::type_name::<T>(), e))
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}

fn downcast<T: 'static + Send + Sync>(any: AnyArc) -> DiResult<Arc<T>> {
    any.downcast::<T>()
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
}
