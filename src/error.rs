//! Error types for the dependency injection container.

use thiserror::Error;

/// Dependency injection errors.
///
/// Every resolution failure is returned to the caller as one of these; the
/// container never retries.
///
/// # Examples
///
/// ```rust
/// use lifetime_di::{DiError, ServiceCollection, Resolver};
///
/// let provider = ServiceCollection::new().build();
/// match provider.get::<String>() {
///     Err(DiError::NotFound(name)) => assert_eq!(name, "alloc::string::String"),
///     _ => unreachable!(),
/// }
///
/// let circular = DiError::Circular(vec!["A", "B", "A"]);
/// assert_eq!(circular.to_string(), "Circular dependency: A -> B -> A");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiError {
    /// No registration exists for the requested service.
    #[error("Service not found: {0}")]
    NotFound(&'static str),
    /// A scoped service was requested without an active scope.
    #[error("Scoped service {0} requires an active scope")]
    ScopeRequired(&'static str),
    /// Dependency chain loops back on itself (includes path).
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<&'static str>),
    /// A singleton's construction reached a scoped service while scope validation is on.
    #[error("Singleton {singleton} cannot depend on scoped service {scoped}")]
    CaptiveDependency {
        singleton: &'static str,
        scoped: &'static str,
    },
    /// A scope created by another provider was passed in.
    #[error("Scope {0} belongs to a different provider")]
    ForeignScope(u64),
    /// Type downcast failed.
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// Maximum resolution depth exceeded.
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// A factory reported a failure.
    #[error("Factory for {service} failed: {message}")]
    Factory {
        service: &'static str,
        message: String,
    },
    /// Container options could not be loaded.
    #[error("Invalid container configuration: {0}")]
    Config(String),
}

impl DiError {
    /// Builds a factory failure for `service` from any displayable error.
    pub fn factory(service: &'static str, message: impl ToString) -> Self {
        DiError::Factory {
            service,
            message: message.to_string(),
        }
    }
}

/// Result type for DI operations.
pub type DiResult<T> = Result<T, DiError>;
