//! The dispatch coordinator.

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use tracing::debug;
use tracing::warn;

use crate::completion_pair;
use crate::Completion;
use crate::CompletionToken;
use crate::CycleTokens;
use crate::HandlerResult;
use crate::ListenerContext;
use crate::ListenerFailure;
use crate::ListenerRegistry;
use crate::Payload;
use crate::StoreToken;

use super::registry::HandlerFn;

/// A single-instance event dispatcher that broadcasts a payload to every
/// registered listener and lets listeners declare ordering dependencies on
/// one another from inside their own handlers.
///
/// Listeners are started in registration order; completion order is governed
/// entirely by each handler's own dependency waits. A listener with no
/// declared dependencies settles as soon as its own work finishes, a
/// dependent one only after every named dependency has settled for the same
/// cycle.
///
/// ```no_run
/// use flux_dispatch::Dispatcher;
///
/// # async fn demo() {
/// let dispatcher: Dispatcher<&str, u64> = Dispatcher::new();
///
/// dispatcher.register("clock", |payload, _context| async move { Ok(Some(payload + 1)) });
/// dispatcher.register("display", |_payload, context| async move {
///     let wait = context.wait_for("clock", |_store, ticks| ticks[0].clone())?;
///     let tick = wait.await?;
///     Ok(tick.value().copied())
/// });
///
/// dispatcher.dispatch(41);
/// # }
/// ```
pub struct Dispatcher<S: StoreToken, P: Payload> {
    pub(crate) registry: Arc<ListenerRegistry<S, P>>,
}

impl<S: StoreToken, P: Payload> Default for Dispatcher<S, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StoreToken, P: Payload> Dispatcher<S, P> {
    /// Creates a dispatcher with an empty listener set.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ListenerRegistry::new()),
        }
    }

    /// Registers a listener under `store`.
    ///
    /// Registration order is the order handlers are started in at dispatch
    /// time. Store uniqueness is the caller's responsibility: a duplicated
    /// token resolves with first-match semantics.
    pub fn register<H, Fut>(
        &self,
        store: S,
        handler: H,
    ) where
        H: Fn(P, ListenerContext<S, P>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult<P>> + Send + 'static,
    {
        let handler: Arc<HandlerFn<S, P>> =
            Arc::new(move |payload, context| handler(payload, context).boxed());
        self.registry.register(store, handler);
    }

    /// Broadcasts `payload` to every registered listener.
    ///
    /// Fire-and-forget: listener failures reject that listener's completion
    /// token and surface only to listeners that depend on it, never to the
    /// caller. Must be called from within a tokio runtime. A dispatch issued
    /// while a previous cycle is still in flight launches a new cycle over
    /// the same registry with a disjoint token set.
    pub fn dispatch(
        &self,
        payload: P,
    ) {
        self.run_cycle(payload);
    }

    /// Runs one dispatch cycle and returns its completion tokens in
    /// registration order.
    ///
    /// The returned tokens are the only dispatcher-side reference to the
    /// cycle; dropping them does not cancel in-flight listener work.
    pub(crate) fn run_cycle(
        &self,
        payload: P,
    ) -> Vec<(S, CompletionToken<P>)> {
        let listeners = self.registry.snapshot();
        debug!("dispatch cycle started for {} listener(s)", listeners.len());

        // Fresh tokens per cycle, index-aligned with the listener order.
        let mut handles = Vec::with_capacity(listeners.len());
        let mut slots = Vec::with_capacity(listeners.len());
        for (store, _) in &listeners {
            let (handle, token) = completion_pair::<P>(format!("{:?}", store));
            handles.push(handle);
            slots.push((store.clone(), token));
        }
        let tokens = Arc::new(CycleTokens::new(slots.clone()));

        for ((store, handler), handle) in listeners.into_iter().zip(handles) {
            let context = ListenerContext::new(store.clone(), Arc::clone(&self.registry), Arc::clone(&tokens));
            let invocation = handler(payload.clone(), context);

            tokio::spawn(async move {
                match invocation.await {
                    Ok(Some(value)) => handle.settle(Ok(Completion::Value(value))),
                    Ok(None) => handle.settle(Ok(Completion::Acknowledged)),
                    Err(error) => {
                        warn!("listener {:?} failed during dispatch: {}", store, error);
                        handle.settle(Err(ListenerFailure::new(format!("{:?}", store), error.to_string())));
                    }
                }
            });
        }

        slots
    }
}
