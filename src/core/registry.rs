//! The ordered set of registered listeners and their dependency edges.

use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::RwLock;

use crate::core::graph;
use crate::BoxError;
use crate::ListenerContext;
use crate::Payload;
use crate::StoreToken;
use crate::WaitForError;

/// What a listener handler resolves to: `Ok(Some(value))` for an explicit
/// result, `Ok(None)` when the handler has nothing to return, `Err` when the
/// listener fails.
pub type HandlerResult<P> = std::result::Result<Option<P>, BoxError>;

pub(crate) type HandlerFn<S, P> =
    dyn Fn(P, ListenerContext<S, P>) -> BoxFuture<'static, HandlerResult<P>> + Send + Sync;

pub(crate) struct ListenerEntry<S: StoreToken, P: Payload> {
    pub(crate) store: S,
    pub(crate) handler: Arc<HandlerFn<S, P>>,

    /// Directed dependency edges, overwritten (not merged) by the most
    /// recent accepted `wait_for` declaration.
    pub(crate) deps: Vec<S>,
}

pub(crate) struct ListenerRegistry<S: StoreToken, P: Payload> {
    entries: RwLock<Vec<ListenerEntry<S, P>>>,
}

impl<S: StoreToken, P: Payload> ListenerRegistry<S, P> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Appends a listener entry with no dependency edges. Uniqueness of the
    /// store token is not enforced; duplicate registrations resolve with
    /// first-match semantics everywhere else.
    pub(crate) fn register(
        &self,
        store: S,
        handler: Arc<HandlerFn<S, P>>,
    ) {
        self.entries.write().push(ListenerEntry {
            store,
            handler,
            deps: Vec::new(),
        });
    }

    /// Ordered `(store, handler)` snapshot for one dispatch cycle.
    pub(crate) fn snapshot(&self) -> Vec<(S, Arc<HandlerFn<S, P>>)> {
        self.entries
            .read()
            .iter()
            .map(|entry| (entry.store.clone(), entry.handler.clone()))
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn deps_of(
        &self,
        store: &S,
    ) -> Vec<S> {
        self.entries
            .read()
            .iter()
            .find(|entry| &entry.store == store)
            .map(|entry| entry.deps.clone())
            .unwrap_or_default()
    }

    /// Validates `deps` and records it as `store`'s dependency edge set.
    ///
    /// The registry lock is held across subset validation, the provisional
    /// overwrite and the full-graph cycle check, so concurrent declarations
    /// see each call as atomic. On a cycle the previous edge set is restored
    /// and no partially applied edges remain.
    pub(crate) fn declare_deps(
        &self,
        store: &S,
        deps: Vec<S>,
    ) -> std::result::Result<(), WaitForError> {
        let mut entries = self.entries.write();

        let known: Vec<S> = entries.iter().map(|entry| entry.store.clone()).collect();
        let unknown = graph::missing_from(&deps, &known);
        if !unknown.is_empty() {
            return Err(WaitForError::InvalidDependency {
                store: format!("{:?}", store),
                unknown: unknown.iter().map(|dep| format!("{:?}", dep)).collect(),
            });
        }

        let position = match entries.iter().position(|entry| &entry.store == store) {
            Some(position) => position,
            // Unreachable through ListenerContext, which always carries a
            // registered store.
            None => {
                return Err(WaitForError::InvalidDependency {
                    store: format!("{:?}", store),
                    unknown: vec![format!("{:?}", store)],
                });
            }
        };

        let previous = std::mem::replace(&mut entries[position].deps, deps);

        let layout: Vec<(S, Vec<S>)> = entries
            .iter()
            .map(|entry| (entry.store.clone(), entry.deps.clone()))
            .collect();
        if !graph::is_acyclic(&layout) {
            entries[position].deps = previous;
            return Err(WaitForError::CyclicDependency {
                store: format!("{:?}", store),
            });
        }

        Ok(())
    }
}
