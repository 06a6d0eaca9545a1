//! Resolver context for dependency injection.
//!
//! This module contains the ResolverContext type which provides
//! the interface for factory functions to resolve dependencies.

use crate::error::DiResult;
use crate::internal::Frame;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::registration::AnyArc;
use crate::traits::ResolverCore;

use super::{Scope, ServiceProvider};

/// Handle passed to every factory while its service is being constructed.
///
/// Resolution through the context reuses the scope of the outer request.
/// Declared dependencies have already been resolved and are returned as-is.
/// Requests made through any handle on the constructing thread, including
/// [`scope`](Self::scope) and its provider, join the same in-progress chain,
/// so cycles are reported instead of recursing forever.
pub struct ResolverContext<'a> {
    provider: &'a ServiceProvider,
    scope: Option<&'a Scope>,
    frame: &'a Frame,
    declared: Vec<(Key, AnyArc)>,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new(
        provider: &'a ServiceProvider,
        scope: Option<&'a Scope>,
        frame: &'a Frame,
        declared: Vec<(Key, AnyArc)>,
    ) -> Self {
        Self { provider, scope, frame, declared }
    }

    /// Key of the service being constructed.
    pub fn service(&self) -> &Key {
        &self.frame.key
    }

    /// Lifetime the service is registered with.
    pub fn lifetime(&self) -> Lifetime {
        self.frame.lifetime
    }

    /// Scope the outer request runs in, if any.
    pub fn scope(&self) -> Option<&'a Scope> {
        self.scope
    }

    /// Number of services on the in-progress chain, this one included.
    pub fn depth(&self) -> usize {
        self.frame.depth
    }
}

impl<'a> ResolverCore for ResolverContext<'a> {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        if let Some((_, value)) = self.declared.iter().find(|(k, _)| k == key) {
            return Ok(value.clone());
        }
        self.provider.resolve_from(key, self.scope)
    }
}
