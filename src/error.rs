//! Error types for the service registry.

use std::fmt;
use std::sync::Arc;

use crate::key::ServiceKey;

/// Boxed error type accepted from creator functions.
///
/// Creators return `Result<T, BoxError>` so they can surface any error type;
/// the registry wraps unknown causes into [`DiError::ResolutionFailed`] while
/// letting `DiError` values pass through unchanged.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Resolution and registry errors.
///
/// Every variant carries enough context to diagnose the failure without
/// additional lookups: the offending key, the known alternatives, or the
/// full dependency chain.
#[derive(Debug, Clone)]
pub enum DiError {
    /// Resolution of a key with no registration anywhere on the scope chain.
    /// Lists the keys registered at the scope that reported the failure.
    NotRegistered {
        /// The key that was requested.
        key: ServiceKey,
        /// Keys registered at the failing scope, for debugging.
        known: Vec<ServiceKey>,
    },
    /// A key reappeared on the active resolution chain. The path is the full
    /// chain in call order, ending with the repeated key.
    CircularDependency(Vec<ServiceKey>),
    /// A singleton's synchronous creator was re-entered before completing.
    /// Only reachable when the chain-based cycle check is bypassed; kept as a
    /// backstop.
    ReentrantInitialization(ServiceKey),
    /// An async singleton was requested through the synchronous path.
    SynchronousResolutionOfAsync(ServiceKey),
    /// The resolved value could not be delivered as the requested type.
    NullResolution(ServiceKey),
    /// A creator failed with an error outside this taxonomy; the original
    /// cause is attached.
    ResolutionFailed {
        /// The key whose creator failed.
        key: ServiceKey,
        /// The creator's error.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl DiError {
    /// Converts a creator-side error into a `DiError`, leaving errors that
    /// are already part of the taxonomy unwrapped.
    pub(crate) fn from_creator(key: &ServiceKey, err: BoxError) -> DiError {
        match err.downcast::<DiError>() {
            Ok(di) => *di,
            Err(other) => DiError::ResolutionFailed {
                key: key.clone(),
                source: Arc::from(other),
            },
        }
    }
}

fn join_keys(keys: &[ServiceKey], sep: &str) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::NotRegistered { key, known } => {
                write!(f, "service not registered: {}", key)?;
                if known.is_empty() {
                    write!(f, "; no services are registered in this scope")
                } else {
                    write!(f, "; registered here: {}", join_keys(known, ", "))
                }
            }
            DiError::CircularDependency(path) => {
                write!(f, "circular dependency detected: {}", join_keys(path, " -> "))
            }
            DiError::ReentrantInitialization(key) => {
                write!(f, "re-entrant initialization of singleton {}", key)
            }
            DiError::SynchronousResolutionOfAsync(key) => {
                write!(
                    f,
                    "{} is an async singleton and cannot be resolved synchronously; \
                     use the async resolution path",
                    key
                )
            }
            DiError::NullResolution(key) => {
                write!(
                    f,
                    "resolved instance for {} was absent or not of the requested type",
                    key
                )
            }
            DiError::ResolutionFailed { key, source } => {
                write!(f, "failed to resolve {}: {}", key, source)
            }
        }
    }
}

impl std::error::Error for DiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DiError::ResolutionFailed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type for registry operations.
pub type DiResult<T> = Result<T, DiError>;
