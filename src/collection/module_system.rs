//! Service module system for modular registration.
//!
//! A module groups related registrations so applications can compose a
//! container from reusable parts.

use crate::{DiResult, ServiceCollection};

/// A reusable group of registrations.
///
/// # Examples
///
/// ```
/// use lifetime_di::{DiResult, Resolver, ServiceCollection, ServiceCollectionExt, ServiceModule};
///
/// struct Greeting(String);
///
/// struct GreetingModule;
///
/// impl ServiceModule for GreetingModule {
///     fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
///         services.add_singleton(Greeting("hello".to_string()));
///         Ok(())
///     }
/// }
///
/// let provider = ServiceCollection::new().add_module(GreetingModule)?.build();
/// assert_eq!(provider.get_required::<Greeting>().0, "hello");
/// # Ok::<(), lifetime_di::DiError>(())
/// ```
pub trait ServiceModule {
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()>;
}

/// Builder-style module registration.
pub trait ServiceCollectionExt {
    fn add_module<M: ServiceModule>(self, module: M) -> DiResult<Self>
    where
        Self: Sized;
}

impl ServiceCollectionExt for ServiceCollection {
    fn add_module<M: ServiceModule>(mut self, module: M) -> DiResult<Self> {
        module.register_services(&mut self)?;
        Ok(self)
    }
}

/// In-place module registration.
pub trait ServiceCollectionModuleExt {
    fn add_module_mut<M: ServiceModule>(&mut self, module: M) -> DiResult<&mut Self>;
}

impl ServiceCollectionModuleExt for ServiceCollection {
    fn add_module_mut<M: ServiceModule>(&mut self, module: M) -> DiResult<&mut Self> {
        module.register_services(self)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DiError, Resolver};

    struct Port(u16);

    struct PortModule(u16);

    impl ServiceModule for PortModule {
        fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
            if self.0 == 0 {
                return Err(DiError::Config("port must be non-zero".to_string()));
            }
            services.add_singleton(Port(self.0));
            Ok(())
        }
    }

    #[test]
    fn modules_register_in_place() {
        let mut services = ServiceCollection::new();
        services.add_module_mut(PortModule(8080)).unwrap();
        assert_eq!(services.build().get_required::<Port>().0, 8080);
    }

    #[test]
    fn module_errors_propagate() {
        let result = ServiceCollection::new().add_module(PortModule(0));
        assert!(matches!(result, Err(DiError::Config(_))));
    }
}
