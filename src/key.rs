//! Service identifiers.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Key identifying a registered service.
///
/// Concrete types are keyed by their `TypeId`; trait objects have no usable
/// `TypeId` for the trait itself, so they are keyed by the `dyn Trait` type
/// name. Both carry a name for diagnostics.
///
/// # Examples
///
/// ```rust
/// use lifetime_di::{key_of_trait, key_of_type, Key};
///
/// trait Printer: Send + Sync {}
///
/// let concrete = key_of_type::<String>();
/// assert_eq!(concrete.display_name(), "alloc::string::String");
///
/// let printer = key_of_trait::<dyn Printer>();
/// assert!(matches!(printer, Key::Trait(_)));
/// assert_ne!(concrete, printer);
/// ```
#[derive(Debug, Clone, Copy)]
pub enum Key {
    /// Concrete type key with `TypeId` and type name.
    Type(TypeId, &'static str),
    /// Trait object key, by `dyn Trait` type name.
    Trait(&'static str),
}

impl Key {
    /// Type or trait name used in errors and logs.
    pub fn display_name(&self) -> &'static str {
        match self {
            Key::Type(_, name) => name,
            Key::Trait(name) => name,
        }
    }

    /// Whether this key names a trait object.
    pub fn is_trait(&self) -> bool {
        matches!(self, Key::Trait(_))
    }
}

// TypeId-only equality for concrete types, the name is diagnostic
impl PartialEq for Key {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a == b,
            (Key::Trait(a), Key::Trait(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Key::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Key::Trait(name) => {
                1u8.hash(state);
                name.hash(state);
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Key for a concrete service type.
#[inline]
pub fn key_of_type<T: ?Sized + 'static>() -> Key {
    Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
}

/// Key for a trait object service, e.g. `key_of_trait::<dyn Printer>()`.
#[inline]
pub fn key_of_trait<T: ?Sized + 'static>() -> Key {
    Key::Trait(std::any::type_name::<T>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn type_equality_ignores_name() {
        let a = Key::Type(TypeId::of::<u32>(), "u32");
        let b = Key::Type(TypeId::of::<u32>(), "renamed");
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn type_and_trait_keys_never_collide() {
        let name = std::any::type_name::<u32>();
        assert_ne!(Key::Type(TypeId::of::<u32>(), name), Key::Trait(name));
    }

    #[test]
    fn display_uses_type_name() {
        trait Marker {}
        let key = key_of_trait::<dyn Marker>();
        assert!(key.to_string().contains("Marker"));
        assert!(key.is_trait());
        assert!(!key_of_type::<u8>().is_trait());
    }
}
