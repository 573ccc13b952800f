//! The per-listener `wait_for` capability.
//!
//! Each dispatch cycle hands every listener a [`ListenerContext`] scoped to
//! that listener and that cycle's completion tokens. From inside its own
//! handler the listener can declare dependencies on other stores and obtain
//! a future that resolves only once every named dependency has settled for
//! the current cycle.
//!
//! Declaration and graph validation happen lazily, at call time, because the
//! full dependency set is only knowable once handlers are running: edges
//! accumulate as listeners declare (or redeclare) them, so acyclicity is
//! re-checked on every call.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;

use crate::Completion;
use crate::CompletionToken;
use crate::CycleTokens;
use crate::ListenerRegistry;
use crate::Payload;
use crate::Result;
use crate::StoreToken;
use crate::WaitForError;

/// Dependency argument accepted by [`ListenerContext::wait_for`]: a single
/// store token or an ordered sequence of them.
#[derive(Debug, Clone)]
pub struct DependencyList<S>(Vec<S>);

impl<S> DependencyList<S> {
    pub(crate) fn into_inner(self) -> Vec<S> {
        self.0
    }
}

impl<S: StoreToken> From<S> for DependencyList<S> {
    fn from(store: S) -> Self {
        Self(vec![store])
    }
}

impl<S: StoreToken> From<Vec<S>> for DependencyList<S> {
    fn from(stores: Vec<S>) -> Self {
        Self(stores)
    }
}

impl<S: StoreToken> From<&[S]> for DependencyList<S> {
    fn from(stores: &[S]) -> Self {
        Self(stores.to_vec())
    }
}

impl<S: StoreToken, const N: usize> From<[S; N]> for DependencyList<S> {
    fn from(stores: [S; N]) -> Self {
        Self(Vec::from(stores))
    }
}

/// Capability object handed to a listener's handler for one dispatch cycle.
///
/// Carries the listener's own identity and the cycle's completion tokens, so
/// every wait binds to the current cycle and can never resolve against a
/// stale token from a previous dispatch.
pub struct ListenerContext<S: StoreToken, P: Payload> {
    store: S,
    registry: Arc<ListenerRegistry<S, P>>,
    tokens: Arc<CycleTokens<S, P>>,
}

impl<S: StoreToken, P: Payload> ListenerContext<S, P> {
    pub(crate) fn new(
        store: S,
        registry: Arc<ListenerRegistry<S, P>>,
        tokens: Arc<CycleTokens<S, P>>,
    ) -> Self {
        Self {
            store,
            registry,
            tokens,
        }
    }

    /// The identity this context was bound to at registration.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Declares `deps` as this listener's dependency edges and returns a
    /// future that resolves to `on_ready`'s result once every named
    /// dependency has settled for the current cycle.
    ///
    /// `on_ready` receives the listener's own store token and the
    /// dependencies' settlements in declaration order.
    ///
    /// Fails synchronously with [`WaitForError::InvalidDependency`] when a
    /// dependency is not registered or has no token in the current cycle
    /// (it was registered after the cycle started), and with
    /// [`WaitForError::CyclicDependency`] when accepting the edges would
    /// close a cycle. Neither failure leaves edges partially applied.
    ///
    /// The edge set is overwritten on every accepted call: when a handler
    /// calls `wait_for` more than once, each call produces its own waiting
    /// chain but only the final declaration is retained for cycle detection.
    ///
    /// If an awaited dependency settles with a failure, the returned future
    /// resolves to [`WaitForError::DependencyFailed`] carrying that failure.
    pub fn wait_for<D, F, R>(
        &self,
        deps: D,
        on_ready: F,
    ) -> Result<impl Future<Output = Result<R>>>
    where
        D: Into<DependencyList<S>>,
        F: FnOnce(&S, Vec<Completion<P>>) -> R,
    {
        let deps = deps.into().into_inner();

        // Resolve tokens before touching the registry, so a rejected call
        // cannot have mutated the stored edges.
        let mut awaited: Vec<(S, CompletionToken<P>)> = Vec::with_capacity(deps.len());
        for dep in &deps {
            match self.tokens.get(dep) {
                Some(token) => awaited.push((dep.clone(), token)),
                None => {
                    return Err(WaitForError::InvalidDependency {
                        store: format!("{:?}", self.store),
                        unknown: vec![format!("{:?}", dep)],
                    }
                    .into());
                }
            }
        }

        self.registry.declare_deps(&self.store, deps)?;

        let store = self.store.clone();
        Ok(async move {
            let settlements = join_all(awaited.iter().map(|(_, token)| token.settled())).await;

            let mut completions = Vec::with_capacity(settlements.len());
            for ((dep, _), settlement) in awaited.iter().zip(settlements) {
                match settlement {
                    Ok(completion) => completions.push(completion),
                    Err(failure) => {
                        return Err(WaitForError::DependencyFailed {
                            store: format!("{:?}", store),
                            dependency: format!("{:?}", dep),
                            source: failure,
                        }
                        .into());
                    }
                }
            }

            Ok(on_ready(&store, completions))
        })
    }
}
