//! Per-dispatch completion tokens.
//!
//! Every dispatch cycle allocates one token per listener, representing that
//! listener's settlement (value or failure) for the cycle. A token is a
//! oneshot channel whose receiving side is made multi-consumer via
//! [`futures::future::Shared`], because any number of listeners may wait on
//! the same dependency. Tokens are owned by the cycle that created them and
//! never outlive it on the dispatcher side, so a `wait_for` call can only
//! ever observe the current cycle's tokens.

use futures::future::BoxFuture;
use futures::future::Shared;
use futures::FutureExt;
use tokio::sync::oneshot;

use crate::ListenerFailure;
use crate::Payload;
use crate::StoreToken;

/// Settlement value a listener produced for one dispatch cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<P> {
    /// The handler finished without returning an explicit value.
    ///
    /// Substituted by the coordinator so that the absence of a return value
    /// is never mistaken for an unresolved dependency wait.
    Acknowledged,

    /// The handler returned an explicit value.
    Value(P),
}

impl<P> Completion<P> {
    /// The explicit settlement value, if the handler produced one.
    pub fn value(&self) -> Option<&P> {
        match self {
            Completion::Acknowledged => None,
            Completion::Value(value) => Some(value),
        }
    }

    pub fn is_acknowledged(&self) -> bool {
        matches!(self, Completion::Acknowledged)
    }

    /// The settlement value, falling back to the dispatched payload when the
    /// handler returned nothing.
    pub fn into_value_or(
        self,
        payload: P,
    ) -> P {
        match self {
            Completion::Acknowledged => payload,
            Completion::Value(value) => value,
        }
    }
}

pub(crate) type Settlement<P> = std::result::Result<Completion<P>, ListenerFailure>;

/// Sending half of a completion token. Held by the coordinator task that
/// drives the listener's handler; consumed by settling.
pub(crate) struct CompletionHandle<P: Payload> {
    tx: oneshot::Sender<Settlement<P>>,
}

impl<P: Payload> CompletionHandle<P> {
    pub(crate) fn settle(
        self,
        settlement: Settlement<P>,
    ) {
        // Nobody observes the settlement once every waiter is gone.
        let _ = self.tx.send(settlement);
    }
}

/// Waitable half of a completion token. Cloneable; every clone observes the
/// same settlement.
#[derive(Clone)]
pub(crate) struct CompletionToken<P: Payload> {
    shared: Shared<BoxFuture<'static, Settlement<P>>>,
}

impl<P: Payload> CompletionToken<P> {
    pub(crate) async fn settled(&self) -> Settlement<P> {
        self.shared.clone().await
    }
}

/// Creates the two halves of one listener's completion token for one cycle.
///
/// `store` is the debug-rendered identity of the listener, used when the
/// sending half is dropped without settling (e.g. the handler task panicked).
pub(crate) fn completion_pair<P: Payload>(store: String) -> (CompletionHandle<P>, CompletionToken<P>) {
    let (tx, rx) = oneshot::channel();
    let shared = rx
        .map(move |received| match received {
            Ok(settlement) => settlement,
            Err(_) => Err(ListenerFailure::new(store, "listener terminated before settling")),
        })
        .boxed()
        .shared();

    (CompletionHandle { tx }, CompletionToken { shared })
}

/// The completion tokens of one dispatch cycle, in registration order.
///
/// Lookups use first-match semantics, mirroring the registry.
pub(crate) struct CycleTokens<S, P: Payload> {
    slots: Vec<(S, CompletionToken<P>)>,
}

impl<S: StoreToken, P: Payload> CycleTokens<S, P> {
    pub(crate) fn new(slots: Vec<(S, CompletionToken<P>)>) -> Self {
        Self { slots }
    }

    pub(crate) fn get(
        &self,
        store: &S,
    ) -> Option<CompletionToken<P>> {
        self.slots
            .iter()
            .find(|(candidate, _)| candidate == store)
            .map(|(_, token)| token.clone())
    }
}
