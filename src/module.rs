//! Modular registration: batch related registrations against one scope.

use crate::error::DiResult;
use crate::scope::Scope;

/// A reusable bundle of registrations.
///
/// Purely a convenience batcher; nothing changes about registration
/// semantics. Plain closures qualify through the blanket impl, so a one-off
/// batch does not need a named type.
///
/// # Examples
///
/// ```
/// use locus_di::{DiResult, Resolver, Scope, ServiceModule};
///
/// struct Config { name: String }
/// struct Greeter { greeting: String }
///
/// struct CoreModule;
///
/// impl ServiceModule for CoreModule {
///     fn register_services(self, scope: &Scope) -> DiResult<()> {
///         scope.register_singleton::<Config, _>(|_| {
///             Ok(Config { name: "app".to_string() })
///         });
///         scope.register_factory::<Greeter, _>(|ctx| {
///             let config = ctx.get::<Config>()?;
///             Ok(Greeter { greeting: format!("hello, {}", config.name) })
///         });
///         Ok(())
///     }
/// }
///
/// let scope = Scope::new();
/// scope.install_module(CoreModule).unwrap();
/// assert_eq!(scope.get::<Greeter>().unwrap().greeting, "hello, app");
/// ```
pub trait ServiceModule {
    /// Register this module's services against the target scope.
    fn register_services(self, scope: &Scope) -> DiResult<()>;
}

impl<F> ServiceModule for F
where
    F: FnOnce(&Scope) -> DiResult<()>,
{
    fn register_services(self, scope: &Scope) -> DiResult<()> {
        self(scope)
    }
}
