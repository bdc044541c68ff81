//! Service lifetime definitions.

use std::fmt;

/// Service lifetimes controlling instance caching behavior.
///
/// - **Transient**: a fresh instance on every resolution, never cached.
/// - **Singleton**: one instance per registry, created lazily on first
///   resolution and cached until disposal.
/// - **AsyncSingleton**: like `Singleton`, but creation requires a suspension
///   point, so the instance can only be materialized through the async
///   resolution path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// New instance per resolution, never cached.
    Transient,
    /// Single lazily-created instance per registry, cached until disposed.
    Singleton,
    /// Single instance whose creator is asynchronous.
    AsyncSingleton,
}

impl Lifetime {
    /// Returns `true` for lifetimes whose instance is cached after creation.
    #[inline]
    pub fn is_cached(&self) -> bool {
        matches!(self, Lifetime::Singleton | Lifetime::AsyncSingleton)
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Transient => write!(f, "Transient"),
            Lifetime::Singleton => write!(f, "Singleton"),
            Lifetime::AsyncSingleton => write!(f, "AsyncSingleton"),
        }
    }
}
