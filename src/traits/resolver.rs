//! Resolver traits for service resolution.

use std::any::{type_name, Any};
use std::sync::Arc;

use crate::entry::AnyArc;
use crate::error::{DiError, DiResult};
use crate::key::ServiceKey;

/// Object-safe core of the resolver capability.
///
/// Implemented by [`Scope`](crate::Scope) (resolution starts a fresh call
/// chain) and by [`ResolverContext`](crate::ResolverContext) (resolution
/// continues the chain of the creator currently running, which is how nested
/// dependency graphs are built and how cycles are detected).
pub trait ResolverCore: Send + Sync {
    /// Type-erased resolution of a key.
    fn resolve_key(&self, key: &ServiceKey) -> DiResult<Arc<dyn Any + Send + Sync>>;

    /// Whether a key is registered here or anywhere up the parent chain.
    fn is_registered_key(&self, key: &ServiceKey) -> bool;
}

pub(crate) fn downcast_concrete<T: Send + Sync + 'static>(
    any: AnyArc,
    key: ServiceKey,
) -> DiResult<Arc<T>> {
    any.downcast::<T>().map_err(|_| DiError::NullResolution(key))
}

pub(crate) fn downcast_shared<T>(any: AnyArc, key: ServiceKey) -> DiResult<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    // Trait objects are stored double-wrapped (`Arc<Arc<dyn T>>`) because
    // only sized values can live behind `dyn Any`.
    any.downcast::<Arc<T>>()
        .map(|wrapped| (*wrapped).clone())
        .map_err(|_| DiError::NullResolution(key))
}

/// High-level, type-safe resolution interface.
///
/// This is the `get` capability creators receive: both [`Scope`](crate::Scope)
/// and [`ResolverContext`](crate::ResolverContext) implement it, so top-level
/// callers and creator bodies resolve dependencies the same way.
///
/// # Examples
///
/// ```
/// use locus_di::{Resolver, Scope};
/// use std::sync::Arc;
///
/// struct Config { port: u16 }
/// struct Server { config: Arc<Config> }
///
/// let scope = Scope::new();
/// scope.register_singleton::<Config, _>(|_| Ok(Config { port: 8080 }));
/// scope.register_factory::<Server, _>(|ctx| {
///     Ok(Server { config: ctx.get::<Config>()? })
/// });
///
/// let server = scope.get::<Server>().unwrap();
/// assert_eq!(server.config.port, 8080);
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves a concrete service type.
    fn get<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let key = ServiceKey::of::<T>();
        let any = self.resolve_key(&key)?;
        downcast_concrete(any, key)
    }

    /// Resolves a named concrete service type.
    fn get_named<T: Send + Sync + 'static>(&self, name: &'static str) -> DiResult<Arc<T>> {
        let key = ServiceKey::named::<T>(name);
        let any = self.resolve_key(&key)?;
        downcast_concrete(any, key)
    }

    /// Resolves a trait object registered through one of the `*_trait`
    /// registration methods.
    fn get_trait<T>(&self) -> DiResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = ServiceKey::of::<T>();
        let any = self.resolve_key(&key)?;
        downcast_shared(any, key)
    }

    /// Resolves a named trait object.
    fn get_named_trait<T>(&self, name: &'static str) -> DiResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = ServiceKey::named::<T>(name);
        let any = self.resolve_key(&key)?;
        downcast_shared(any, key)
    }

    /// Resolves a concrete type, panicking on failure. Use when a missing
    /// registration is a programming error worth failing fast on.
    fn get_required<T: Send + Sync + 'static>(&self) -> Arc<T> {
        self.get::<T>()
            .unwrap_or_else(|e| panic!("failed to resolve {}: {}", type_name::<T>(), e))
    }

    /// Resolves a trait object, panicking on failure.
    fn get_required_trait<T>(&self) -> Arc<T>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get_trait::<T>()
            .unwrap_or_else(|e| panic!("failed to resolve {}: {}", type_name::<T>(), e))
    }

    /// Whether `T` is registered here or anywhere up the parent chain.
    fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.is_registered_key(&ServiceKey::of::<T>())
    }

    /// Whether the named `T` is registered here or up the parent chain.
    fn is_registered_named<T: ?Sized + 'static>(&self, name: &'static str) -> bool {
        self.is_registered_key(&ServiceKey::named::<T>(name))
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
