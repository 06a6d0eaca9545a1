//! Service collection module for dependency injection.
//!
//! This module contains the ServiceCollection type and related functionality
//! for registering services and building service providers.

use std::sync::Arc;

use crate::config::ContainerOptions;
use crate::descriptors::{ServiceDescriptor, ServiceInfo};
use crate::observer::{DiObserver, Observers};
use crate::provider::{ResolverContext, ServiceProvider};
use crate::registration::{Registration, Registry};
use crate::validation::{validate_registry, ValidationReport};
use crate::{DiResult, Key};

pub mod module_system;
pub use module_system::*;

/// Mutable builder of service registrations.
///
/// Registering the same service twice keeps the last registration.
/// Consume the collection with [`build`](Self::build) or
/// [`try_build`](Self::try_build) to get an immutable [`ServiceProvider`].
///
/// # Examples
///
/// ```
/// use lifetime_di::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// trait Printer: Send + Sync {
///     fn print(&self, caller: &str, message: &str) -> String;
/// }
///
/// struct ConsolePrinter;
/// impl Printer for ConsolePrinter {
///     fn print(&self, caller: &str, message: &str) -> String {
///         format!("[ {}...{} ]", caller, message)
///     }
/// }
///
/// struct OperationService {
///     printer: Arc<dyn Printer>,
/// }
///
/// let mut services = ServiceCollection::new();
/// services
///     .add_singleton_trait::<dyn Printer>(Arc::new(ConsolePrinter))
///     .add_singleton_factory::<OperationService, _>(|r| {
///         Ok(OperationService { printer: r.get_trait::<dyn Printer>()? })
///     });
///
/// let provider = services.build();
/// let service = provider.get_required::<OperationService>();
/// assert_eq!(
///     service.printer.print("OperationService", "Print DoSomeRealWork"),
///     "[ OperationService...Print DoSomeRealWork ]"
/// );
/// ```
pub struct ServiceCollection {
    registry: Registry,
    observers: Observers,
    options: ContainerOptions,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    pub fn with_options(options: ContainerOptions) -> Self {
        Self {
            registry: Registry::new(),
            observers: Observers::new(),
            options,
        }
    }

    /// Collection holding an explicit list of registrations, in order.
    pub fn from_descriptors<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = ServiceDescriptor>,
    {
        let mut services = Self::new();
        for descriptor in descriptors {
            services.add(descriptor);
        }
        services
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ContainerOptions) -> &mut Self {
        self.options = options;
        self
    }

    // ----- Descriptors -----

    /// Adds a registration, replacing any earlier one for the same key.
    pub fn add(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        let key = descriptor.key;
        self.registry.insert(key, Registration::from(descriptor));
        self
    }

    /// Adds the registration only if its key is not registered yet.
    ///
    /// Returns whether it was added.
    pub fn try_add(&mut self, descriptor: ServiceDescriptor) -> bool {
        if self.registry.contains_key(&descriptor.key) {
            return false;
        }
        self.add(descriptor);
        true
    }

    // ----- Concrete Type Registrations -----

    /// Registers an existing value as a singleton.
    pub fn add_singleton<T: 'static + Send + Sync>(&mut self, value: T) -> &mut Self {
        self.add(ServiceDescriptor::instance(value))
    }

    pub fn add_singleton_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::singleton(factory))
    }

    pub fn add_scoped_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::scoped(factory))
    }

    pub fn add_transient_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::transient(factory))
    }

    // ----- Trait Registrations -----

    /// Registers an existing trait object as a singleton.
    pub fn add_singleton_trait<T>(&mut self, value: Arc<T>) -> &mut Self
    where
        T: ?Sized + 'static + Send + Sync,
    {
        self.add(ServiceDescriptor::trait_instance(value))
    }

    pub fn add_singleton_trait_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext<'_>) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::singleton_trait(factory))
    }

    pub fn add_scoped_trait_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext<'_>) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::scoped_trait(factory))
    }

    pub fn add_transient_trait_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext<'_>) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::transient_trait(factory))
    }

    // ----- Observers -----

    pub fn add_observer(&mut self, observer: Arc<dyn DiObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    // ----- Introspection -----

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.registry.contains_key(key)
    }

    /// Registrations in registration order.
    pub fn service_infos(&self) -> Vec<ServiceInfo> {
        self.registry.infos()
    }

    /// Checks declared dependencies for missing services, cycles and
    /// singletons capturing shorter-lived services.
    pub fn validate(&self) -> ValidationReport {
        validate_registry(&self.registry, &self.options)
    }

    // ----- Build -----

    /// Builds the provider. Registrations are frozen from here on.
    pub fn build(mut self) -> ServiceProvider {
        self.registry.finalize();
        ServiceProvider::new(self.registry, self.observers, self.options)
    }

    /// Builds the provider, first validating when `validate_on_build` is set.
    ///
    /// # Errors
    ///
    /// The resolution error the first validation failure would cause.
    pub fn try_build(self) -> DiResult<ServiceProvider> {
        if self.options.validate_on_build {
            let report = self.validate();
            for warning in &report.warnings {
                tracing::warn!(?warning, "service registration warning");
            }
            report.into_result()?;
        }
        Ok(self.build())
    }
}

impl Default for ServiceCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCollection")
            .field("services", &self.registry.len())
            .field("options", &self.options)
            .finish()
    }
}
