use std::fmt::Debug;

/// Opaque store identity token.
///
/// Compared by equality only; when the same token is registered twice the
/// registry resolves it with first-match semantics. `Debug` is required so
/// errors can name the offending store.
pub trait StoreToken: Clone + Eq + Debug + Send + Sync + 'static {}

impl<T> StoreToken for T where T: Clone + Eq + Debug + Send + Sync + 'static {}

/// Payload broadcast to every listener in a dispatch cycle.
///
/// Each listener receives its own clone, and the payload doubles as the
/// fallback settlement value for listeners that return nothing.
pub trait Payload: Clone + Send + Sync + 'static {}

impl<T> Payload for T where T: Clone + Send + Sync + 'static {}
