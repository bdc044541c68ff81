//! Public traits: the resolver capability and the disposable capability.

pub mod dispose;
pub mod resolver;

pub use dispose::Dispose;
pub use resolver::{Resolver, ResolverCore};
