//! Disposal trait for resource cleanup.

/// Opt-in capability for structured teardown.
///
/// Implement this for services that need cleanup when their registration is
/// disposed (flushing caches, closing connections). Hooks are attached at
/// creation time, either through the `register_disposable_*` registration
/// methods or by calling
/// [`ResolverContext::register_disposer`](crate::ResolverContext::register_disposer)
/// inside a creator, and run once when the owning entry or scope is disposed.
///
/// # Examples
///
/// ```
/// use locus_di::{Dispose, Scope};
///
/// struct Cache {
///     name: String,
/// }
///
/// impl Dispose for Cache {
///     fn dispose(&self) {
///         println!("flushing cache: {}", self.name);
///     }
/// }
///
/// let scope = Scope::new();
/// scope.register_disposable_singleton::<Cache, _>(|_| {
///     Ok(Cache { name: "user_cache".to_string() })
/// });
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Perform cleanup. Must not assume it runs on any particular thread.
    fn dispose(&self);
}
