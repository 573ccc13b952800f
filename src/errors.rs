//! Dispatcher Error Hierarchy
//!
//! Defines the error types for the dispatch protocol, split by where they
//! surface: `wait_for` declaration failures are returned synchronously to the
//! offending handler, while listener failures travel through completion
//! tokens to the listeners that depend on the failing one.

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error type a listener handler may fail with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Dependency declaration failures raised at the `wait_for` call site
    #[error(transparent)]
    WaitFor(#[from] WaitForError),

    /// A listener's handler failed during a dispatch cycle
    #[error(transparent)]
    Listener(#[from] ListenerFailure),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum WaitForError {
    /// The declared dependency set names stores that are not registered, or
    /// not part of the current dispatch cycle
    #[error("listener {store} declared unknown dependencies: {unknown:?}")]
    InvalidDependency { store: String, unknown: Vec<String> },

    /// Accepting the declared dependency edges would close a cycle in the
    /// dependency graph
    #[error("dependencies declared by listener {store} would close a cycle")]
    CyclicDependency { store: String },

    /// An awaited dependency settled with a failure instead of a value
    #[error("dependency {dependency} of listener {store} failed")]
    DependencyFailed {
        store: String,
        dependency: String,
        #[source]
        source: ListenerFailure,
    },
}

/// A listener's handler returned an error or terminated without settling.
///
/// Cloneable so it can flow through shared completion tokens to every
/// listener waiting on the failed one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("listener {store} failed: {reason}")]
pub struct ListenerFailure {
    pub store: String,
    pub reason: String,
}

impl ListenerFailure {
    pub(crate) fn new(
        store: String,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            store,
            reason: reason.into(),
        }
    }
}
