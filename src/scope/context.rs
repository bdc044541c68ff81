//! Resolver context handed to creator functions.

use std::any::Any;
use std::sync::{Arc, Weak};

use crate::entry::ServiceEntry;
use crate::error::DiResult;
use crate::key::ServiceKey;
use crate::traits::resolver::downcast_concrete;
use crate::traits::{Dispose, ResolverCore};

use super::Scope;

/// Context passed to creator functions for resolving their dependencies.
///
/// The context carries the scope the creator was registered against and the
/// active resolution chain, so nested `get` calls participate in cycle
/// detection. It is cheap to clone and owns its data, which lets async
/// creators move it into `'static` futures.
///
/// # Examples
///
/// ```
/// use locus_di::{Resolver, Scope};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let scope = Scope::new();
/// scope.register_singleton::<Database, _>(|_| {
///     Ok(Database { url: "postgres://localhost".to_string() })
/// });
/// scope.register_factory::<UserService, _>(|ctx| {
///     Ok(UserService { db: ctx.get::<Database>()? })
/// });
/// # let _ = scope.get::<UserService>().unwrap();
/// ```
#[derive(Clone)]
pub struct ResolverContext {
    scope: Scope,
    chain: Vec<ServiceKey>,
    /// Entry currently being initialized; disposal hooks registered by the
    /// creator attach here.
    current: Weak<ServiceEntry>,
}

impl ResolverContext {
    pub(crate) fn new(scope: Scope, chain: Vec<ServiceKey>, current: Weak<ServiceEntry>) -> Self {
        Self {
            scope,
            chain,
            current,
        }
    }

    /// The scope this context resolves against.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Attaches a cleanup hook for `service` to the registration currently
    /// being initialized. The hook runs once when that registration is
    /// disposed.
    pub fn register_disposer<T: Dispose>(&self, service: Arc<T>) {
        if let Some(entry) = self.current.upgrade() {
            entry.push_disposer(Box::new(move || service.dispose()));
        }
    }

    /// Async resolution of a concrete type, continuing this context's chain.
    pub async fn get_async<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let key = ServiceKey::of::<T>();
        let any = self.scope.resolve_chained_async(&key, &self.chain).await?;
        downcast_concrete(any, key)
    }

    /// Async resolution of a named concrete type.
    pub async fn get_named_async<T: Send + Sync + 'static>(
        &self,
        name: &'static str,
    ) -> DiResult<Arc<T>> {
        let key = ServiceKey::named::<T>(name);
        let any = self.scope.resolve_chained_async(&key, &self.chain).await?;
        downcast_concrete(any, key)
    }
}

impl ResolverCore for ResolverContext {
    fn resolve_key(&self, key: &ServiceKey) -> DiResult<Arc<dyn Any + Send + Sync>> {
        self.scope.resolve_chained(key, &self.chain)
    }

    fn is_registered_key(&self, key: &ServiceKey) -> bool {
        self.scope.is_registered_key(key)
    }
}
