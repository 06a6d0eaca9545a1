//! Circular dependency detection infrastructure.
//!
//! Every construction pushes an entry onto a per-thread resolution stack and
//! pops it when the construction ends, even by panic. A request whose key is
//! already on the stack is a cycle, whichever handle the factory resolved
//! through: its context, a scope, or the provider itself. Entries are tagged
//! with the owning provider so independent containers used on one thread
//! never see each other's services.

use std::cell::RefCell;

use crate::key::Key;
use crate::lifetime::Lifetime;

thread_local! {
    static RESOLUTION_STACK: RefCell<Vec<Entry>> = RefCell::new(Vec::new());
}

#[derive(Clone, Copy)]
struct Entry {
    owner: usize,
    key: Key,
    lifetime: Lifetime,
}

/// What is already under construction on this thread for one provider.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Ancestry {
    /// Number of services being constructed.
    pub(crate) depth: usize,
    /// Path from the outermost request to the repeated key, if `key` is
    /// already being constructed.
    pub(crate) cycle: Option<Vec<&'static str>>,
    /// Innermost singleton still under construction.
    pub(crate) enclosing_singleton: Option<&'static str>,
}

/// Inspects this thread's in-progress constructions of `owner` before `key`
/// is resolved.
pub(crate) fn ancestry(owner: usize, key: &Key) -> Ancestry {
    RESOLUTION_STACK.with(|stack| {
        let stack = stack.borrow();
        let mut ancestry = Ancestry::default();
        let mut repeated = false;

        for entry in stack.iter().filter(|entry| entry.owner == owner) {
            ancestry.depth += 1;
            repeated |= entry.key == *key;
            if entry.lifetime == Lifetime::Singleton {
                ancestry.enclosing_singleton = Some(entry.key.display_name());
            }
        }

        if repeated {
            let mut path: Vec<&'static str> = stack
                .iter()
                .filter(|entry| entry.owner == owner)
                .map(|entry| entry.key.display_name())
                .collect();
            path.push(key.display_name());
            ancestry.cycle = Some(path);
        }
        ancestry
    })
}

/// One service under construction.
///
/// Holding a frame keeps its key on the resolution stack; dropping it pops
/// the key again.
pub(crate) struct Frame {
    pub(crate) key: Key,
    pub(crate) lifetime: Lifetime,
    /// Position on the chain, 1 for the outermost request.
    pub(crate) depth: usize,
}

impl Frame {
    pub(crate) fn enter(owner: usize, key: Key, lifetime: Lifetime, depth: usize) -> Self {
        RESOLUTION_STACK.with(|stack| stack.borrow_mut().push(Entry { owner, key, lifetime }));
        Self { key, lifetime, depth }
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        RESOLUTION_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();
            debug_assert!(popped.map_or(false, |entry| entry.key == self.key));
        });
    }
}
