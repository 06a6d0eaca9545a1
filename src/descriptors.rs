//! Service descriptors: the explicit form of a registration.

use std::sync::Arc;

use crate::error::DiResult;
use crate::key::{key_of_trait, key_of_type, Key};
use crate::lifetime::Lifetime;
use crate::provider::ResolverContext;
use crate::registration::{erase, AnyArc, Ctor};

/// A service identifier bound to its lifetime, declared dependencies and
/// construction rule.
///
/// Descriptors are what the fluent `ServiceCollection::add_*` methods build
/// internally; building them directly lets a whole container be described as
/// a plain list. Declared dependencies are resolved, in order, before the
/// factory runs and are handed back from the factory's resolver context
/// without being resolved a second time.
///
/// # Examples
///
/// ```rust
/// use lifetime_di::{Resolver, ServiceCollection, ServiceDescriptor};
/// use std::sync::Arc;
///
/// trait Printer: Send + Sync {
///     fn print(&self, message: &str) -> String;
/// }
///
/// struct ConsolePrinter;
/// impl Printer for ConsolePrinter {
///     fn print(&self, message: &str) -> String {
///         format!("[ {} ]", message)
///     }
/// }
///
/// struct OperationService {
///     printer: Arc<dyn Printer>,
/// }
///
/// let provider = ServiceCollection::from_descriptors(vec![
///     ServiceDescriptor::singleton_trait::<dyn Printer, _>(|_| Ok(Arc::new(ConsolePrinter))),
///     ServiceDescriptor::singleton::<OperationService, _>(|r| {
///         Ok(OperationService { printer: r.get_trait::<dyn Printer>()? })
///     })
///     .depends_on_trait::<dyn Printer>(),
/// ])
/// .build();
///
/// let service = provider.get_required::<OperationService>();
/// assert_eq!(service.printer.print("work"), "[ work ]");
/// ```
pub struct ServiceDescriptor {
    pub(crate) key: Key,
    pub(crate) lifetime: Lifetime,
    pub(crate) dependencies: Vec<Key>,
    pub(crate) ctor: Ctor,
}

impl ServiceDescriptor {
    /// Concrete type factory with an explicit lifetime.
    pub fn factory<T, F>(lifetime: Lifetime, factory: F) -> Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        let ctor = erase(move |r| {
            let value: AnyArc = Arc::new(factory(r)?);
            Ok(value)
        });
        Self::from_parts(key_of_type::<T>(), lifetime, ctor)
    }

    pub fn singleton<T, F>(factory: F) -> Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        Self::factory(Lifetime::Singleton, factory)
    }

    pub fn scoped<T, F>(factory: F) -> Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        Self::factory(Lifetime::Scoped, factory)
    }

    pub fn transient<T, F>(factory: F) -> Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        Self::factory(Lifetime::Transient, factory)
    }

    /// Singleton backed by an already constructed value.
    pub fn instance<T: 'static + Send + Sync>(value: T) -> Self {
        let value: AnyArc = Arc::new(value);
        let ctor = erase(move |_| Ok(value.clone()));
        Self::from_parts(key_of_type::<T>(), Lifetime::Singleton, ctor)
    }

    /// Trait object factory with an explicit lifetime.
    pub fn trait_factory<T, F>(lifetime: Lifetime, factory: F) -> Self
    where
        T: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext<'_>) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        // Stored as Arc<Arc<dyn Trait>> so it fits in `dyn Any`
        let ctor = erase(move |r| {
            let value: AnyArc = Arc::new(factory(r)?);
            Ok(value)
        });
        Self::from_parts(key_of_trait::<T>(), lifetime, ctor)
    }

    pub fn singleton_trait<T, F>(factory: F) -> Self
    where
        T: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext<'_>) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        Self::trait_factory(Lifetime::Singleton, factory)
    }

    pub fn scoped_trait<T, F>(factory: F) -> Self
    where
        T: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext<'_>) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        Self::trait_factory(Lifetime::Scoped, factory)
    }

    pub fn transient_trait<T, F>(factory: F) -> Self
    where
        T: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext<'_>) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        Self::trait_factory(Lifetime::Transient, factory)
    }

    /// Singleton trait object backed by an existing implementation.
    pub fn trait_instance<T>(value: Arc<T>) -> Self
    where
        T: ?Sized + 'static + Send + Sync,
    {
        let value: AnyArc = Arc::new(value);
        let ctor = erase(move |_| Ok(value.clone()));
        Self::from_parts(key_of_trait::<T>(), Lifetime::Singleton, ctor)
    }

    fn from_parts(key: Key, lifetime: Lifetime, ctor: Ctor) -> Self {
        Self {
            key,
            lifetime,
            dependencies: Vec::new(),
            ctor,
        }
    }

    /// Declares a dependency on the concrete type `T`.
    pub fn depends_on<T: 'static>(self) -> Self {
        self.depends_on_key(key_of_type::<T>())
    }

    /// Declares a dependency on the trait object `T`, e.g. `dyn Printer`.
    pub fn depends_on_trait<T: ?Sized + 'static>(self) -> Self {
        self.depends_on_key(key_of_trait::<T>())
    }

    pub fn depends_on_key(mut self, key: Key) -> Self {
        if !self.dependencies.contains(&key) {
            self.dependencies.push(key);
        }
        self
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn dependencies(&self) -> &[Key] {
        &self.dependencies
    }

    /// Read-only summary of this descriptor.
    pub fn info(&self) -> ServiceInfo {
        ServiceInfo {
            key: self.key,
            lifetime: self.lifetime,
            dependencies: self.dependencies.clone(),
        }
    }
}

impl std::fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Introspection view of a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    pub key: Key,
    pub lifetime: Lifetime,
    pub dependencies: Vec<Key>,
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Printer: Send + Sync {}

    #[test]
    fn builders_set_key_and_lifetime() {
        let d = ServiceDescriptor::scoped::<String, _>(|_| Ok(String::new()));
        assert_eq!(d.key(), &key_of_type::<String>());
        assert_eq!(d.lifetime(), Lifetime::Scoped);
        assert!(d.dependencies().is_empty());

        let d = ServiceDescriptor::instance(7u32);
        assert_eq!(d.lifetime(), Lifetime::Singleton);
    }

    #[test]
    fn dependencies_keep_order_without_duplicates() {
        let d = ServiceDescriptor::transient::<u64, _>(|_| Ok(1))
            .depends_on_trait::<dyn Printer>()
            .depends_on::<u32>()
            .depends_on_trait::<dyn Printer>();

        assert_eq!(d.dependencies(), &[key_of_trait::<dyn Printer>(), key_of_type::<u32>()]);
        assert_eq!(d.info().dependencies.len(), 2);
    }
}
