//! Scopes: registries with optional parent fallback.
//!
//! A [`Scope`] owns an entry map and a singleton cache, and optionally points
//! at a parent scope. Resolution falls back to the parent chain when a key is
//! absent locally, which is how child scopes override registrations without
//! touching their parent.

use std::any::{type_name, Any};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, info, trace, warn};

use crate::async_factories::AsyncFactory;
use crate::entry::{AnyArc, AsyncCtor, ServiceEntry, SyncCtor};
use crate::error::{BoxError, DiError, DiResult};
use crate::key::ServiceKey;
use crate::module::ServiceModule;
use crate::registry::Registry;
use crate::traits::resolver::downcast_concrete;
use crate::traits::{Dispose, ResolverCore};

mod context;
pub use context::ResolverContext;

/// A service registry with optional parent fallback.
///
/// `Scope` is a cheap-clone handle; clones share the same registrations.
/// Registration never invokes the creator, resolution creates instances
/// lazily, and disposal is always scope-local.
///
/// # Examples
///
/// ```
/// use locus_di::{Resolver, Scope};
/// use std::sync::Arc;
///
/// struct Config { url: String }
///
/// let root = Scope::new();
/// root.register_singleton::<Config, _>(|_| {
///     Ok(Config { url: "postgres://localhost".to_string() })
/// });
///
/// // A child sees the parent's registrations until it overrides them.
/// let child = root.create_child();
/// let from_child = child.get::<Config>().unwrap();
/// let from_root = root.get::<Config>().unwrap();
/// assert!(Arc::ptr_eq(&from_child, &from_root));
///
/// child.register_singleton::<Config, _>(|_| {
///     Ok(Config { url: "sqlite::memory:".to_string() })
/// });
/// assert_eq!(child.get::<Config>().unwrap().url, "sqlite::memory:");
/// assert_eq!(root.get::<Config>().unwrap().url, "postgres://localhost");
/// ```
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

struct ScopeInner {
    registry: Mutex<Registry>,
    parent: Option<Scope>,
}

impl Scope {
    /// Creates a scope with no parent.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                registry: Mutex::new(Registry::new()),
                parent: None,
            }),
        }
    }

    /// Creates a child scope that falls back to `self` for keys it does not
    /// register locally.
    pub fn create_child(&self) -> Scope {
        Scope {
            inner: Arc::new(ScopeInner {
                registry: Mutex::new(Registry::new()),
                parent: Some(self.clone()),
            }),
        }
    }

    /// The parent scope, if any.
    pub fn parent(&self) -> Option<&Scope> {
        self.inner.parent.as_ref()
    }

    // ----- Registration: concrete types -----

    /// Registers a transient factory: a fresh instance on every resolution.
    ///
    /// # Examples
    ///
    /// ```
    /// use locus_di::{Resolver, Scope};
    ///
    /// let scope = Scope::new();
    /// scope.register_factory::<String, _>(|_| Ok("fresh".to_string()));
    ///
    /// let a = scope.get::<String>().unwrap();
    /// let b = scope.get::<String>().unwrap();
    /// assert!(!std::sync::Arc::ptr_eq(&a, &b));
    /// ```
    pub fn register_factory<T, F>(&self, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let key = ServiceKey::of::<T>();
        let ctor = sync_ctor::<T, F>(&key, factory);
        self.insert_entry(key, ServiceEntry::transient(type_name::<T>(), ctor));
    }

    /// Named variant of [`register_factory`](Self::register_factory).
    pub fn register_named_factory<T, F>(&self, name: &'static str, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let key = ServiceKey::named::<T>(name);
        let ctor = sync_ctor::<T, F>(&key, factory);
        self.insert_entry(key, ServiceEntry::transient(type_name::<T>(), ctor));
    }

    /// Registers a lazily-initialized singleton. The creator runs at most
    /// once; the instance is cached until the key or scope is disposed.
    ///
    /// # Examples
    ///
    /// ```
    /// use locus_di::{Resolver, Scope};
    /// use std::sync::Arc;
    ///
    /// struct Database { url: String }
    ///
    /// let scope = Scope::new();
    /// scope.register_singleton::<Database, _>(|_| {
    ///     Ok(Database { url: "postgres://localhost".to_string() })
    /// });
    ///
    /// let a = scope.get::<Database>().unwrap();
    /// let b = scope.get::<Database>().unwrap();
    /// assert!(Arc::ptr_eq(&a, &b));
    /// ```
    pub fn register_singleton<T, F>(&self, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let key = ServiceKey::of::<T>();
        let ctor = sync_ctor::<T, F>(&key, factory);
        self.insert_entry(key, ServiceEntry::singleton(type_name::<T>(), ctor));
    }

    /// Named variant of [`register_singleton`](Self::register_singleton).
    pub fn register_named_singleton<T, F>(&self, name: &'static str, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let key = ServiceKey::named::<T>(name);
        let ctor = sync_ctor::<T, F>(&key, factory);
        self.insert_entry(key, ServiceEntry::singleton(type_name::<T>(), ctor));
    }

    /// Registers a pre-built value as a singleton.
    pub fn register_singleton_value<T: Send + Sync + 'static>(&self, value: T) {
        let arc = Arc::new(value);
        let key = ServiceKey::of::<T>();
        let ctor: SyncCtor = Arc::new(move |_: &ResolverContext| -> DiResult<AnyArc> {
            Ok(arc.clone())
        });
        self.insert_entry(key, ServiceEntry::singleton(type_name::<T>(), ctor));
    }

    /// Registers a singleton whose instance opts into the [`Dispose`]
    /// capability; its cleanup hook is attached automatically at creation.
    pub fn register_disposable_singleton<T, F>(&self, factory: F)
    where
        T: Dispose,
        F: Fn(&ResolverContext) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let key = ServiceKey::of::<T>();
        let ctor = disposable_sync_ctor::<T, F>(&key, factory);
        self.insert_entry(key, ServiceEntry::singleton(type_name::<T>(), ctor));
    }

    // ----- Registration: async singletons -----

    /// Registers a singleton whose creation requires a suspension point.
    ///
    /// The instance can only be materialized through [`get_async`]
    /// (resolving it synchronously before materialization fails). Concurrent
    /// async resolutions share one in-flight creation.
    ///
    /// [`get_async`]: Scope::get_async
    ///
    /// # Examples
    ///
    /// ```
    /// use locus_di::Scope;
    ///
    /// struct Database { url: String }
    ///
    /// # async fn example() {
    /// let scope = Scope::new();
    /// scope.register_async_singleton::<Database, _, _>(|_ctx| async {
    ///     // connect, handshake, warm up...
    ///     Ok(Database { url: "postgres://localhost".to_string() })
    /// });
    ///
    /// let db = scope.get_async::<Database>().await.unwrap();
    /// assert_eq!(db.url, "postgres://localhost");
    /// # }
    /// ```
    pub fn register_async_singleton<T, F, Fut>(&self, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(ResolverContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    {
        let key = ServiceKey::of::<T>();
        let ctor = async_ctor::<T, F, Fut>(&key, factory);
        self.insert_entry(key, ServiceEntry::async_singleton(type_name::<T>(), ctor));
    }

    /// Named variant of
    /// [`register_async_singleton`](Self::register_async_singleton).
    pub fn register_named_async_singleton<T, F, Fut>(&self, name: &'static str, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(ResolverContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    {
        let key = ServiceKey::named::<T>(name);
        let ctor = async_ctor::<T, F, Fut>(&key, factory);
        self.insert_entry(key, ServiceEntry::async_singleton(type_name::<T>(), ctor));
    }

    /// Async-singleton variant of
    /// [`register_disposable_singleton`](Self::register_disposable_singleton).
    pub fn register_disposable_async_singleton<T, F, Fut>(&self, factory: F)
    where
        T: Dispose,
        F: Fn(ResolverContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    {
        let key = ServiceKey::of::<T>();
        let ctor = disposable_async_ctor::<T, F, Fut>(&key, factory);
        self.insert_entry(key, ServiceEntry::async_singleton(type_name::<T>(), ctor));
    }

    /// Registers an async singleton backed by an [`AsyncFactory`]
    /// implementation instead of a closure.
    pub fn register_async_singleton_factory<T>(&self, factory: impl AsyncFactory<T> + 'static)
    where
        T: Send + Sync + 'static,
    {
        let key = ServiceKey::of::<T>();
        let ctor = async_factory_ctor::<T>(&key, Arc::new(factory));
        self.insert_entry(key, ServiceEntry::async_singleton(type_name::<T>(), ctor));
    }

    // ----- Registration: trait objects -----

    /// Registers a transient factory producing a trait object.
    pub fn register_factory_trait<T, F>(&self, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolverContext) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        let key = ServiceKey::of::<T>();
        let ctor = trait_sync_ctor::<T, F>(&key, factory);
        self.insert_entry(key, ServiceEntry::transient(type_name::<T>(), ctor));
    }

    /// Registers a singleton resolved as a trait object.
    ///
    /// # Examples
    ///
    /// ```
    /// use locus_di::{Resolver, Scope};
    /// use std::sync::Arc;
    ///
    /// trait Logger: Send + Sync {
    ///     fn log(&self, msg: &str);
    /// }
    ///
    /// struct ConsoleLogger;
    /// impl Logger for ConsoleLogger {
    ///     fn log(&self, msg: &str) { println!("{msg}"); }
    /// }
    ///
    /// let scope = Scope::new();
    /// scope.register_singleton_trait::<dyn Logger, _>(|_| {
    ///     Ok(Arc::new(ConsoleLogger) as Arc<dyn Logger>)
    /// });
    ///
    /// let logger = scope.get_trait::<dyn Logger>().unwrap();
    /// logger.log("resolved");
    /// ```
    pub fn register_singleton_trait<T, F>(&self, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolverContext) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        let key = ServiceKey::of::<T>();
        let ctor = trait_sync_ctor::<T, F>(&key, factory);
        self.insert_entry(key, ServiceEntry::singleton(type_name::<T>(), ctor));
    }

    /// Named variant of
    /// [`register_singleton_trait`](Self::register_singleton_trait).
    pub fn register_named_singleton_trait<T, F>(&self, name: &'static str, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolverContext) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        let key = ServiceKey::named::<T>(name);
        let ctor = trait_sync_ctor::<T, F>(&key, factory);
        self.insert_entry(key, ServiceEntry::singleton(type_name::<T>(), ctor));
    }

    // ----- Async resolution -----

    /// Resolves a concrete type, allowing async singleton creation to run.
    ///
    /// The only suspension point is the await on an async singleton's
    /// in-flight creation; synchronous lifetimes resolve without suspending.
    pub async fn get_async<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let key = ServiceKey::of::<T>();
        let any = self.resolve_chained_async(&key, &[]).await?;
        downcast_concrete(any, key)
    }

    /// Named variant of [`get_async`](Self::get_async).
    pub async fn get_named_async<T: Send + Sync + 'static>(
        &self,
        name: &'static str,
    ) -> DiResult<Arc<T>> {
        let key = ServiceKey::named::<T>(name);
        let any = self.resolve_chained_async(&key, &[]).await?;
        downcast_concrete(any, key)
    }

    // ----- Disposal -----

    /// Disposes the registration for `T`: runs its cleanup hooks, clears its
    /// cached instance, and removes it from this scope. A no-op when `T` is
    /// not registered locally; never touches parent or child scopes.
    pub fn dispose<T: ?Sized + 'static>(&self) {
        self.dispose_key(&ServiceKey::of::<T>());
    }

    /// Named variant of [`dispose`](Self::dispose).
    pub fn dispose_named<T: ?Sized + 'static>(&self, name: &'static str) {
        self.dispose_key(&ServiceKey::named::<T>(name));
    }

    /// Disposes every local registration, continuing past individual hook
    /// failures, then leaves this scope empty. Scope-local only.
    pub fn dispose_all(&self) {
        let drained = self.inner.registry.lock().unwrap().drain();
        if !drained.is_empty() {
            debug!(count = drained.len(), "disposing all local registrations");
        }
        for (key, entry) in &drained {
            entry.dispose(key);
        }
    }

    fn dispose_key(&self, key: &ServiceKey) {
        let removed = self.inner.registry.lock().unwrap().remove(key);
        if let Some(entry) = removed {
            debug!(key = %key, "disposing registration");
            entry.dispose(key);
        }
    }

    // ----- Introspection -----

    /// Number of local registrations.
    pub fn len(&self) -> usize {
        self.inner.registry.lock().unwrap().len()
    }

    /// Whether this scope has no local registrations.
    pub fn is_empty(&self) -> bool {
        self.inner.registry.lock().unwrap().is_empty()
    }

    /// Keys registered locally, in no particular order.
    pub fn registered_keys(&self) -> Vec<ServiceKey> {
        self.inner.registry.lock().unwrap().keys()
    }

    /// Dumps the local registrations (and each ancestor's, walking the
    /// parent chain) to the log at `info` level. Diagnostics only.
    pub fn dump_registry(&self) {
        let snapshot = self.inner.registry.lock().unwrap().snapshot();
        info!(
            registrations = snapshot.len(),
            has_parent = self.inner.parent.is_some(),
            "registry dump"
        );
        for (key, entry) in &snapshot {
            info!(
                key = %key,
                lifetime = %entry.lifetime(),
                implementation = entry.target(),
                state = entry.state_label(),
                "registered entry"
            );
        }
        if let Some(parent) = &self.inner.parent {
            parent.dump_registry();
        }
    }

    /// Installs a [`ServiceModule`], batching its registrations against this
    /// scope. Plain closures `FnOnce(&Scope) -> DiResult<()>` qualify.
    pub fn install_module<M: ServiceModule>(&self, module: M) -> DiResult<&Self> {
        module.register_services(self)?;
        Ok(self)
    }

    // ----- Resolution engine -----

    pub(crate) fn resolve_chained(
        &self,
        key: &ServiceKey,
        chain: &[ServiceKey],
    ) -> DiResult<AnyArc> {
        let entry = {
            let registry = self.inner.registry.lock().unwrap();
            if let Some(hit) = registry.cached(key) {
                trace!(key = %key, "singleton cache hit");
                return Ok(hit);
            }
            registry.get(key)
        };

        let entry = match entry {
            Some(entry) => entry,
            None => {
                // Scope fallback: unregistered keys delegate up the chain.
                return match &self.inner.parent {
                    Some(parent) => parent.resolve_chained(key, chain),
                    None => Err(self.not_registered(key)),
                };
            }
        };

        if chain.contains(key) {
            let mut path = chain.to_vec();
            path.push(key.clone());
            return Err(DiError::CircularDependency(path));
        }

        let ctx = self.creator_context(key, chain, &entry);
        let value = entry.locate_sync(key, &ctx)?;
        self.mirror_singleton(key, &entry);
        Ok(value)
    }

    pub(crate) fn resolve_chained_async<'a>(
        &'a self,
        key: &'a ServiceKey,
        chain: &'a [ServiceKey],
    ) -> BoxFuture<'a, DiResult<AnyArc>> {
        async move {
            let entry = {
                let registry = self.inner.registry.lock().unwrap();
                if let Some(hit) = registry.cached(key) {
                    trace!(key = %key, "singleton cache hit");
                    return Ok(hit);
                }
                registry.get(key)
            };

            let entry = match entry {
                Some(entry) => entry,
                None => {
                    return match &self.inner.parent {
                        Some(parent) => parent.resolve_chained_async(key, chain).await,
                        None => Err(self.not_registered(key)),
                    };
                }
            };

            if chain.contains(key) {
                let mut path = chain.to_vec();
                path.push(key.clone());
                return Err(DiError::CircularDependency(path));
            }

            let ctx = self.creator_context(key, chain, &entry);
            let value = entry.locate_async(key, ctx).await?;
            self.mirror_singleton(key, &entry);
            Ok(value)
        }
        .boxed()
    }

    /// Builds the resolver capability for a creator about to run: same scope,
    /// chain extended with the key being created, hooks attached to its entry.
    fn creator_context(
        &self,
        key: &ServiceKey,
        chain: &[ServiceKey],
        entry: &Arc<ServiceEntry>,
    ) -> ResolverContext {
        let mut extended = Vec::with_capacity(chain.len() + 1);
        extended.extend_from_slice(chain);
        extended.push(key.clone());
        ResolverContext::new(self.clone(), extended, Arc::downgrade(entry))
    }

    fn mirror_singleton(&self, key: &ServiceKey, entry: &Arc<ServiceEntry>) {
        if entry.lifetime().is_cached() {
            if let Some(value) = entry.cached_instance() {
                self.inner
                    .registry
                    .lock()
                    .unwrap()
                    .cache_ready(key, entry, value);
            }
        }
    }

    fn not_registered(&self, key: &ServiceKey) -> DiError {
        DiError::NotRegistered {
            key: key.clone(),
            known: self.inner.registry.lock().unwrap().keys(),
        }
    }

    fn insert_entry(&self, key: ServiceKey, entry: ServiceEntry) {
        let lifetime = entry.lifetime();
        let replaced = self.inner.registry.lock().unwrap().insert(key.clone(), entry);
        if replaced {
            warn!(key = %key, lifetime = %lifetime, "overwriting existing registration (last write wins)");
        } else {
            debug!(key = %key, lifetime = %lifetime, "registered service");
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("registered", &self.len())
            .field("has_parent", &self.inner.parent.is_some())
            .finish()
    }
}

impl ResolverCore for Scope {
    fn resolve_key(&self, key: &ServiceKey) -> DiResult<Arc<dyn Any + Send + Sync>> {
        // Every top-level resolution starts an empty chain; the chain is
        // threaded through creators via their ResolverContext.
        self.resolve_chained(key, &[])
    }

    fn is_registered_key(&self, key: &ServiceKey) -> bool {
        if self.inner.registry.lock().unwrap().contains(key) {
            return true;
        }
        match &self.inner.parent {
            Some(parent) => parent.is_registered_key(key),
            None => false,
        }
    }
}

// ----- Creator wrappers -----
//
// These adapt typed user factories into the erased creators entries store.
// Error mapping happens here: causes that are already DiError pass through,
// anything else is wrapped as ResolutionFailed for the key.

fn sync_ctor<T, F>(key: &ServiceKey, factory: F) -> SyncCtor
where
    T: Send + Sync + 'static,
    F: Fn(&ResolverContext) -> Result<T, BoxError> + Send + Sync + 'static,
{
    let key = key.clone();
    Arc::new(move |ctx: &ResolverContext| -> DiResult<AnyArc> {
        match factory(ctx) {
            Ok(value) => Ok(Arc::new(value)),
            Err(e) => Err(DiError::from_creator(&key, e)),
        }
    })
}

fn disposable_sync_ctor<T, F>(key: &ServiceKey, factory: F) -> SyncCtor
where
    T: Dispose,
    F: Fn(&ResolverContext) -> Result<T, BoxError> + Send + Sync + 'static,
{
    let key = key.clone();
    Arc::new(move |ctx: &ResolverContext| -> DiResult<AnyArc> {
        match factory(ctx) {
            Ok(value) => {
                let service = Arc::new(value);
                ctx.register_disposer(service.clone());
                Ok(service)
            }
            Err(e) => Err(DiError::from_creator(&key, e)),
        }
    })
}

fn trait_sync_ctor<T, F>(key: &ServiceKey, factory: F) -> SyncCtor
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn(&ResolverContext) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
{
    let key = key.clone();
    Arc::new(move |ctx: &ResolverContext| -> DiResult<AnyArc> {
        match factory(ctx) {
            // Double-wrapped: only sized values can live behind dyn Any.
            Ok(service) => Ok(Arc::new(service)),
            Err(e) => Err(DiError::from_creator(&key, e)),
        }
    })
}

fn async_ctor<T, F, Fut>(key: &ServiceKey, factory: F) -> AsyncCtor
where
    T: Send + Sync + 'static,
    F: Fn(ResolverContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
{
    let key = key.clone();
    let factory = Arc::new(factory);
    Arc::new(move |ctx: ResolverContext| {
        let factory = factory.clone();
        let key = key.clone();
        async move {
            match (*factory)(ctx).await {
                Ok(value) => Ok(Arc::new(value) as AnyArc),
                Err(e) => Err(DiError::from_creator(&key, e)),
            }
        }
        .boxed()
    })
}

fn disposable_async_ctor<T, F, Fut>(key: &ServiceKey, factory: F) -> AsyncCtor
where
    T: Dispose,
    F: Fn(ResolverContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
{
    let key = key.clone();
    let factory = Arc::new(factory);
    Arc::new(move |ctx: ResolverContext| {
        let factory = factory.clone();
        let key = key.clone();
        async move {
            match (*factory)(ctx.clone()).await {
                Ok(value) => {
                    let service = Arc::new(value);
                    ctx.register_disposer(service.clone());
                    Ok(service as AnyArc)
                }
                Err(e) => Err(DiError::from_creator(&key, e)),
            }
        }
        .boxed()
    })
}

fn async_factory_ctor<T>(key: &ServiceKey, factory: Arc<dyn AsyncFactory<T>>) -> AsyncCtor
where
    T: Send + Sync + 'static,
{
    let key = key.clone();
    Arc::new(move |ctx: ResolverContext| {
        let factory = factory.clone();
        let key = key.clone();
        async move {
            match factory.create(&ctx).await {
                Ok(service) => Ok(service as AnyArc),
                Err(e) => Err(DiError::from_creator(&key, e)),
            }
        }
        .boxed()
    })
}
