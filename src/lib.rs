//! # locus-di
//!
//! Hierarchical runtime service registry for Rust: map an abstract type
//! (optionally qualified by a name) to a concrete, lazily-created instance.
//!
//! ## Features
//!
//! - **Three lifecycles**: transient factories, lazily-initialized
//!   singletons, and asynchronously-initialized singletons
//! - **Hierarchical scopes**: child scopes override locally and fall back to
//!   their parent chain for everything else
//! - **Circular dependency detection**: the full chain is reported in call
//!   order the moment a creator revisits a key being resolved
//! - **Shared async creation**: concurrent resolutions of one async
//!   singleton await a single in-flight creator instead of racing
//! - **Lifecycle cleanup**: disposal hooks run once per instance, and a
//!   failing hook never blocks the rest
//!
//! ## Quick start
//!
//! ```rust
//! use locus_di::{Resolver, Scope};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let scope = Scope::new();
//! scope.register_singleton::<Database, _>(|_| {
//!     Ok(Database {
//!         connection_string: "postgres://localhost".to_string(),
//!     })
//! });
//! scope.register_factory::<UserService, _>(|ctx| {
//!     Ok(UserService {
//!         db: ctx.get::<Database>()?,
//!     })
//! });
//!
//! let user_service = scope.get::<UserService>().unwrap();
//! assert_eq!(user_service.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Lifecycles
//!
//! - **Transient** (`register_factory`): a fresh instance on every resolution
//! - **Singleton** (`register_singleton`): created on first resolution,
//!   cached until the key or scope is disposed
//! - **Async singleton** (`register_async_singleton`): like a singleton, but
//!   the creator is async and the instance is materialized through
//!   [`Scope::get_async`]
//!
//! ## Scopes
//!
//! ```rust
//! use locus_di::{Resolver, Scope};
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, message: &str);
//! }
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) {
//!         println!("[log] {message}");
//!     }
//! }
//!
//! struct SilentLogger;
//! impl Logger for SilentLogger {
//!     fn log(&self, _message: &str) {}
//! }
//!
//! let root = Scope::new();
//! root.register_singleton_trait::<dyn Logger, _>(|_| {
//!     Ok(Arc::new(ConsoleLogger) as Arc<dyn Logger>)
//! });
//!
//! // The child resolves through the parent until it overrides the key.
//! let child = root.create_child();
//! assert!(Arc::ptr_eq(
//!     &child.get_trait::<dyn Logger>().unwrap(),
//!     &root.get_trait::<dyn Logger>().unwrap(),
//! ));
//!
//! child.register_singleton_trait::<dyn Logger, _>(|_| {
//!     Ok(Arc::new(SilentLogger) as Arc<dyn Logger>)
//! });
//! // The override is local; the parent keeps its own registration.
//! child.get_trait::<dyn Logger>().unwrap().log("dropped");
//! root.get_trait::<dyn Logger>().unwrap().log("still console");
//! ```
//!
//! ## Async singletons
//!
//! ```rust
//! use locus_di::Scope;
//!
//! struct SearchIndex {
//!     documents: usize,
//! }
//!
//! # async fn example() {
//! let scope = Scope::new();
//! scope.register_async_singleton::<SearchIndex, _, _>(|_ctx| async {
//!     // load, connect, warm up...
//!     Ok(SearchIndex { documents: 42 })
//! });
//!
//! // Two concurrent resolutions share one creation.
//! let (a, b) = tokio::join!(
//!     scope.get_async::<SearchIndex>(),
//!     scope.get_async::<SearchIndex>(),
//! );
//! assert!(std::sync::Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
//! # }
//! ```

pub mod async_factories;
pub mod error;
pub mod global;
pub mod key;
pub mod lifetime;
pub mod module;
pub mod scope;
pub mod traits;

mod entry;
mod registry;

pub use async_factories::AsyncFactory;
pub use error::{BoxError, DiError, DiResult};
pub use key::ServiceKey;
pub use lifetime::Lifetime;
pub use module::ServiceModule;
pub use scope::{ResolverContext, Scope};
pub use traits::{Dispose, Resolver, ResolverCore};
