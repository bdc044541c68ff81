//! Service key types for the registry.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Key for service storage and lookup.
///
/// A key combines the requested type's [`TypeId`] with an optional qualifier
/// name, so multiple instances of the same type can live side by side in one
/// registry. The type name is carried along purely for diagnostics.
///
/// # Examples
///
/// ```rust
/// use locus_di::ServiceKey;
///
/// // Unnamed key: just the type
/// let key = ServiceKey::of::<String>();
/// assert_eq!(key.name(), None);
///
/// // Named key: type plus qualifier
/// let primary = ServiceKey::named::<String>("primary_db");
/// let replica = ServiceKey::named::<String>("replica_db");
/// assert_ne!(primary, replica);
/// assert_ne!(primary, key);
/// ```
#[derive(Clone)]
pub struct ServiceKey {
    type_id: TypeId,
    type_name: &'static str,
    name: Option<&'static str>,
}

impl ServiceKey {
    /// Creates a key for type `T`.
    ///
    /// Works for trait objects as well as concrete types.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            name: None,
        }
    }

    /// Creates a named key for type `T`.
    #[inline]
    pub fn named<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            name: Some(name),
        }
    }

    /// Returns the [`TypeId`] of the requested type.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the human-readable type name, as used in error messages.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the qualifier name, or `None` for unnamed registrations.
    #[inline]
    pub fn name(&self) -> Option<&'static str> {
        self.name
    }
}

// Two keys are equal iff TypeId and name both match. The type name string is
// ignored so equality stays a cheap integer comparison.
impl PartialEq for ServiceKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name {
            Some(name) => write!(f, "ServiceKey({}, name={:?})", self.type_name, name),
            None => write!(f, "ServiceKey({})", self.type_name),
        }
    }
}

// Display feeds error messages and cycle rendering, so keep it compact.
impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name {
            Some(name) => write!(f, "{} (name: {:?})", self.type_name, name),
            None => write!(f, "{}", self.type_name),
        }
    }
}
