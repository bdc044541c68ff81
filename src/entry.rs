//! Per-registration state: lifecycle kind, creator, and the lazy
//! initialization state machine.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tracing::{error, trace};

use crate::error::{DiError, DiResult};
use crate::key::ServiceKey;
use crate::lifetime::Lifetime;
use crate::scope::ResolverContext;

/// Type-erased instance storage.
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// Erased synchronous creator. Produced values are already wrapped for
/// storage; failures are already mapped into the error taxonomy.
pub(crate) type SyncCtor =
    Arc<dyn Fn(&ResolverContext) -> DiResult<AnyArc> + Send + Sync>;

/// Erased asynchronous creator. Takes the context by value so the returned
/// future is `'static` and can be shared between concurrent awaiters.
pub(crate) type AsyncCtor =
    Arc<dyn Fn(ResolverContext) -> BoxFuture<'static, DiResult<AnyArc>> + Send + Sync>;

/// In-flight async creation, awaited by every concurrent resolution of the
/// same key so the creator body runs at most once per materialization.
type SharedCreation = Shared<BoxFuture<'static, DiResult<AnyArc>>>;

type DisposeHook = Box<dyn FnOnce() + Send>;

/// Lifecycle kind together with its creator. Encoding them as one enum keeps
/// the "exactly one creator, matching the kind" invariant structural.
enum EntryKind {
    Transient(SyncCtor),
    Singleton(SyncCtor),
    AsyncSingleton(AsyncCtor),
}

/// Materialization state of a cached entry.
///
/// `Uninitialized -> Initializing/Pending -> Ready`, with the in-flight
/// states always cleared before the call that set them returns, on success
/// and on failure alike. Disposal takes `Ready` back to `Uninitialized`.
enum EntryState {
    Uninitialized,
    /// A synchronous singleton creator is running.
    Initializing,
    /// An async singleton creation is in flight; concurrent resolutions
    /// attach to this shared future instead of starting a second creation.
    Pending(SharedCreation),
    Ready(AnyArc),
}

/// One registration: lifecycle kind, creator, materialized state, and the
/// cleanup hooks attached during creation.
pub(crate) struct ServiceEntry {
    kind: EntryKind,
    target: &'static str,
    state: Mutex<EntryState>,
    disposers: Mutex<Vec<DisposeHook>>,
}

impl ServiceEntry {
    pub(crate) fn transient(target: &'static str, ctor: SyncCtor) -> Self {
        Self::new(EntryKind::Transient(ctor), target)
    }

    pub(crate) fn singleton(target: &'static str, ctor: SyncCtor) -> Self {
        Self::new(EntryKind::Singleton(ctor), target)
    }

    pub(crate) fn async_singleton(target: &'static str, ctor: AsyncCtor) -> Self {
        Self::new(EntryKind::AsyncSingleton(ctor), target)
    }

    fn new(kind: EntryKind, target: &'static str) -> Self {
        Self {
            kind,
            target,
            state: Mutex::new(EntryState::Uninitialized),
            disposers: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn lifetime(&self) -> Lifetime {
        match self.kind {
            EntryKind::Transient(_) => Lifetime::Transient,
            EntryKind::Singleton(_) => Lifetime::Singleton,
            EntryKind::AsyncSingleton(_) => Lifetime::AsyncSingleton,
        }
    }

    pub(crate) fn target(&self) -> &'static str {
        self.target
    }

    /// The materialized instance, if this entry has reached `Ready`.
    pub(crate) fn cached_instance(&self) -> Option<AnyArc> {
        match &*self.state.lock().unwrap() {
            EntryState::Ready(value) => Some(value.clone()),
            _ => None,
        }
    }

    pub(crate) fn state_label(&self) -> &'static str {
        match &*self.state.lock().unwrap() {
            EntryState::Uninitialized => "uninitialized",
            EntryState::Initializing | EntryState::Pending(_) => "initializing",
            EntryState::Ready(_) => "ready",
        }
    }

    /// Attaches a cleanup hook, run once when this entry is disposed.
    pub(crate) fn push_disposer(&self, hook: DisposeHook) {
        self.disposers.lock().unwrap().push(hook);
    }

    /// Synchronous resolution of this entry.
    pub(crate) fn locate_sync(
        &self,
        key: &ServiceKey,
        ctx: &ResolverContext,
    ) -> DiResult<AnyArc> {
        match &self.kind {
            EntryKind::Transient(ctor) => ctor(ctx),
            EntryKind::Singleton(ctor) => self.locate_singleton(key, ctx, ctor),
            EntryKind::AsyncSingleton(_) => {
                Err(DiError::SynchronousResolutionOfAsync(key.clone()))
            }
        }
    }

    /// Asynchronous resolution of this entry. Synchronous kinds complete
    /// without suspending; the single await lives in the async singleton arm.
    pub(crate) async fn locate_async(
        &self,
        key: &ServiceKey,
        ctx: ResolverContext,
    ) -> DiResult<AnyArc> {
        match &self.kind {
            EntryKind::Transient(ctor) => ctor(&ctx),
            EntryKind::Singleton(ctor) => self.locate_singleton(key, &ctx, ctor),
            EntryKind::AsyncSingleton(ctor) => {
                self.locate_async_singleton(key, ctx, ctor).await
            }
        }
    }

    fn locate_singleton(
        &self,
        key: &ServiceKey,
        ctx: &ResolverContext,
        ctor: &SyncCtor,
    ) -> DiResult<AnyArc> {
        {
            let mut state = self.state.lock().unwrap();
            match &*state {
                EntryState::Ready(value) => return Ok(value.clone()),
                EntryState::Initializing | EntryState::Pending(_) => {
                    return Err(DiError::ReentrantInitialization(key.clone()));
                }
                EntryState::Uninitialized => *state = EntryState::Initializing,
            }
        }

        // The lock is not held while the creator runs; nested resolution goes
        // back through the scope with the extended chain.
        let result = ctor(ctx);

        let mut state = self.state.lock().unwrap();
        match result {
            Ok(value) => {
                trace!(key = %key, "singleton materialized");
                *state = EntryState::Ready(value.clone());
                Ok(value)
            }
            Err(e) => {
                // Initialization must never be left pending after a failure.
                *state = EntryState::Uninitialized;
                Err(e)
            }
        }
    }

    async fn locate_async_singleton(
        &self,
        key: &ServiceKey,
        ctx: ResolverContext,
        ctor: &AsyncCtor,
    ) -> DiResult<AnyArc> {
        enum Plan {
            Hit(AnyArc),
            Attach(SharedCreation),
            Start(SharedCreation),
        }

        let plan = {
            let mut state = self.state.lock().unwrap();
            match &*state {
                EntryState::Ready(value) => Plan::Hit(value.clone()),
                EntryState::Pending(shared) => Plan::Attach(shared.clone()),
                EntryState::Initializing => {
                    return Err(DiError::ReentrantInitialization(key.clone()));
                }
                EntryState::Uninitialized => {
                    // Building the future does not poll it, so no creator
                    // work happens under the lock.
                    let shared = ctor(ctx).shared();
                    *state = EntryState::Pending(shared.clone());
                    Plan::Start(shared)
                }
            }
        };

        match plan {
            Plan::Hit(value) => Ok(value),
            Plan::Attach(shared) => {
                trace!(key = %key, "attaching to in-flight async creation");
                shared.await
            }
            Plan::Start(shared) => {
                let result = shared.await;
                let mut state = self.state.lock().unwrap();
                match &result {
                    Ok(value) => {
                        trace!(key = %key, "async singleton materialized");
                        *state = EntryState::Ready(value.clone());
                    }
                    Err(_) => *state = EntryState::Uninitialized,
                }
                result
            }
        }
    }

    /// Runs the entry's cleanup hooks and clears its materialized state.
    ///
    /// Hook panics are logged and swallowed so that disposing one entry never
    /// prevents the rest from being disposed.
    pub(crate) fn dispose(&self, key: &ServiceKey) {
        let previous = std::mem::replace(
            &mut *self.state.lock().unwrap(),
            EntryState::Uninitialized,
        );

        let hooks: Vec<DisposeHook> = self.disposers.lock().unwrap().drain(..).collect();
        for hook in hooks.into_iter().rev() {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(hook)) {
                error!(
                    key = %key,
                    "disposal hook panicked: {}",
                    panic_message(panic.as_ref())
                );
            }
        }

        drop(previous);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
