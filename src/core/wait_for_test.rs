use std::sync::Arc;

use futures::FutureExt;

use crate::completion_pair;
use crate::core::registry::HandlerFn;
use crate::core::registry::ListenerRegistry;
use crate::test_utils::enable_logger;
use crate::test_utils::payload;
use crate::test_utils::TestPayload;
use crate::Completion;
use crate::CycleTokens;
use crate::DependencyList;
use crate::Error;
use crate::ListenerContext;
use crate::WaitForError;

fn noop_handler() -> Arc<HandlerFn<&'static str, TestPayload>> {
    Arc::new(|_payload, _context| async move { Ok(None) }.boxed())
}

/// One registered listener per store plus a live token for each, returning
/// the context bound to the first store.
fn context_for(
    stores: &[&'static str],
) -> (
    ListenerContext<&'static str, TestPayload>,
    Vec<crate::CompletionHandle<TestPayload>>,
) {
    let registry = Arc::new(ListenerRegistry::new());
    let mut handles = Vec::new();
    let mut slots = Vec::new();
    for store in stores {
        registry.register(*store, noop_handler());
        let (handle, token) = completion_pair::<TestPayload>(format!("{:?}", store));
        handles.push(handle);
        slots.push((*store, token));
    }
    let tokens = Arc::new(CycleTokens::new(slots));

    (ListenerContext::new(stores[0], registry, tokens), handles)
}

#[test]
fn test_dependency_list_normalizes_every_form() {
    let single: DependencyList<&str> = "a".into();
    assert_eq!(single.into_inner(), vec!["a"]);

    let from_vec: DependencyList<&str> = vec!["a", "b"].into();
    assert_eq!(from_vec.into_inner(), vec!["a", "b"]);

    let slice: &[&str] = &["a", "b"];
    let from_slice: DependencyList<&str> = slice.into();
    assert_eq!(from_slice.into_inner(), vec!["a", "b"]);

    let from_array: DependencyList<&str> = ["b", "a"].into();
    assert_eq!(from_array.into_inner(), vec!["b", "a"]);
}

#[tokio::test]
async fn test_wait_for_with_empty_deps_resolves_immediately() {
    enable_logger();
    let (context, _handles) = context_for(&["a"]);

    let deps: Vec<&str> = vec![];
    let wait = context
        .wait_for(deps, |store, completions| (*store, completions.len()))
        .expect("empty dependency set is valid");

    assert_eq!(wait.await.expect("no dependencies to fail"), ("a", 0));
}

#[tokio::test]
async fn test_wait_for_rejects_unregistered_store_synchronously() {
    enable_logger();
    let (context, _handles) = context_for(&["a"]);

    let error = context.wait_for("ghost", |_store, _completions| ()).err().unwrap();

    assert!(matches!(
        error,
        Error::WaitFor(WaitForError::InvalidDependency { ref unknown, .. })
            if unknown == &vec!["\"ghost\"".to_string()]
    ));
}

#[tokio::test]
async fn test_wait_for_passes_settlements_in_declaration_order() {
    enable_logger();
    let (context, handles) = context_for(&["a", "b", "c"]);

    let wait = context
        .wait_for(vec!["c", "b"], |_store, completions| completions)
        .expect("registered dependencies");

    let mut handles = handles.into_iter();
    let _own = handles.next().expect("handle for a");
    let b = handles.next().expect("handle for b");
    let c = handles.next().expect("handle for c");
    b.settle(Ok(Completion::Value(payload(2))));
    c.settle(Ok(Completion::Value(payload(3))));

    let completions = wait.await.expect("all dependencies settled");
    assert_eq!(
        completions,
        vec![Completion::Value(payload(3)), Completion::Value(payload(2))]
    );
}

#[tokio::test]
async fn test_wait_for_binds_on_ready_to_own_store() {
    enable_logger();
    let (context, handles) = context_for(&["a", "b"]);

    let wait = context
        .wait_for("b", |store, _completions| *store)
        .expect("registered dependency");

    handles.into_iter().nth(1).expect("handle for b").settle(Ok(Completion::Acknowledged));

    assert_eq!(wait.await.expect("dependency settled"), "a");
}
