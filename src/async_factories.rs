//! Async factory support for services that require asynchronous
//! initialization, such as database pools, network handshakes, or warm-up
//! flows.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BoxError;
use crate::scope::ResolverContext;

/// Factory that creates a service asynchronously.
///
/// Implement this for creators with state of their own; plain async closures
/// are covered by the blanket impl below and by
/// [`Scope::register_async_singleton`](crate::Scope::register_async_singleton).
///
/// # Examples
///
/// ```
/// use locus_di::{AsyncFactory, BoxError, ResolverContext, Scope};
/// use async_trait::async_trait;
/// use std::sync::Arc;
///
/// struct DatabasePool { connection_string: String }
///
/// struct PoolFactory { connection_string: String }
///
/// #[async_trait]
/// impl AsyncFactory<DatabasePool> for PoolFactory {
///     async fn create(&self, _ctx: &ResolverContext) -> Result<Arc<DatabasePool>, BoxError> {
///         // open connections, run a handshake...
///         Ok(Arc::new(DatabasePool {
///             connection_string: self.connection_string.clone(),
///         }))
///     }
/// }
///
/// # async fn example() {
/// let scope = Scope::new();
/// scope.register_async_singleton_factory(PoolFactory {
///     connection_string: "postgres://localhost".to_string(),
/// });
///
/// let pool = scope.get_async::<DatabasePool>().await.unwrap();
/// assert_eq!(pool.connection_string, "postgres://localhost");
/// # }
/// ```
#[async_trait]
pub trait AsyncFactory<T: Send + Sync + 'static>: Send + Sync {
    /// Creates the service. The context resolves dependencies against the
    /// scope the factory was registered on.
    async fn create(&self, ctx: &ResolverContext) -> Result<Arc<T>, BoxError>;
}

#[async_trait]
impl<T, F, Fut> AsyncFactory<T> for F
where
    T: Send + Sync + 'static,
    F: Fn(&ResolverContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Arc<T>, BoxError>> + Send,
{
    async fn create(&self, ctx: &ResolverContext) -> Result<Arc<T>, BoxError> {
        self(ctx).await
    }
}
