//! Process-wide root scope.
//!
//! The root is an ordinary [`Scope`] with no parent, constructed lazily and
//! living for the whole process; only [`dispose_all`] resets it. Prefer
//! constructing and threading your own `Scope` through the application.
//! These free functions exist for ergonomic parity where a global locator is
//! expected.

use std::future::Future;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::{BoxError, DiResult};
use crate::scope::{ResolverContext, Scope};
use crate::traits::Resolver;

static ROOT: Lazy<Scope> = Lazy::new(Scope::new);

/// The process-wide root scope.
pub fn root() -> &'static Scope {
    &ROOT
}

/// Creates a child of the root scope.
pub fn create_child() -> Scope {
    ROOT.create_child()
}

/// Resolves a concrete type from the root scope.
pub fn get<T: Send + Sync + 'static>() -> DiResult<Arc<T>> {
    ROOT.get::<T>()
}

/// Resolves a named concrete type from the root scope.
pub fn get_named<T: Send + Sync + 'static>(name: &'static str) -> DiResult<Arc<T>> {
    ROOT.get_named::<T>(name)
}

/// Async resolution against the root scope.
pub async fn get_async<T: Send + Sync + 'static>() -> DiResult<Arc<T>> {
    ROOT.get_async::<T>().await
}

/// Registers a transient factory on the root scope.
pub fn register_factory<T, F>(factory: F)
where
    T: Send + Sync + 'static,
    F: Fn(&ResolverContext) -> Result<T, BoxError> + Send + Sync + 'static,
{
    ROOT.register_factory::<T, F>(factory);
}

/// Registers a singleton on the root scope.
pub fn register_singleton<T, F>(factory: F)
where
    T: Send + Sync + 'static,
    F: Fn(&ResolverContext) -> Result<T, BoxError> + Send + Sync + 'static,
{
    ROOT.register_singleton::<T, F>(factory);
}

/// Registers an async singleton on the root scope.
pub fn register_async_singleton<T, F, Fut>(factory: F)
where
    T: Send + Sync + 'static,
    F: Fn(ResolverContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
{
    ROOT.register_async_singleton::<T, F, Fut>(factory);
}

/// Whether `T` is registered on the root scope.
pub fn is_registered<T: ?Sized + 'static>() -> bool {
    ROOT.is_registered::<T>()
}

/// Disposes every registration on the root scope. This is the only way the
/// root is reset during a process's lifetime.
pub fn dispose_all() {
    ROOT.dispose_all();
}

/// Dumps the root registry to the log. Diagnostics only.
pub fn dump_registry() {
    ROOT.dump_registry();
}
