use crate::completion_pair;
use crate::test_utils::enable_logger;
use crate::test_utils::payload;
use crate::test_utils::TestPayload;
use crate::Completion;
use crate::CycleTokens;

#[test]
fn test_into_value_or_substitutes_payload_for_acknowledged() {
    let acknowledged: Completion<TestPayload> = Completion::Acknowledged;
    assert!(acknowledged.is_acknowledged());
    assert_eq!(acknowledged.value(), None);
    assert_eq!(acknowledged.into_value_or(payload(7)), payload(7));
}

#[test]
fn test_into_value_or_keeps_explicit_value() {
    let explicit = Completion::Value(payload(3));
    assert_eq!(explicit.value(), Some(&payload(3)));
    assert_eq!(explicit.into_value_or(payload(7)), payload(3));
}

#[tokio::test]
async fn test_settled_returns_the_settlement() {
    enable_logger();
    let (handle, token) = completion_pair::<TestPayload>("\"a\"".to_string());

    handle.settle(Ok(Completion::Value(payload(1))));

    assert_eq!(token.settled().await, Ok(Completion::Value(payload(1))));
}

#[tokio::test]
async fn test_every_token_clone_observes_the_same_settlement() {
    enable_logger();
    let (handle, token) = completion_pair::<TestPayload>("\"a\"".to_string());
    let cloned = token.clone();

    handle.settle(Ok(Completion::Acknowledged));

    assert_eq!(token.settled().await, Ok(Completion::Acknowledged));
    assert_eq!(cloned.settled().await, Ok(Completion::Acknowledged));
    // A second wait on the same token observes the settlement again.
    assert_eq!(token.settled().await, Ok(Completion::Acknowledged));
}

#[tokio::test]
async fn test_dropped_handle_settles_as_failure() {
    enable_logger();
    let (handle, token) = completion_pair::<TestPayload>("\"a\"".to_string());

    drop(handle);

    let failure = token.settled().await.unwrap_err();
    assert_eq!(failure.store, "\"a\"");
    assert!(failure.reason.contains("before settling"));
}

#[tokio::test]
async fn test_cycle_tokens_resolve_with_first_match() {
    enable_logger();
    let (first_handle, first_token) = completion_pair::<TestPayload>("\"a\"".to_string());
    let (_second_handle, second_token) = completion_pair::<TestPayload>("\"a\"".to_string());
    let tokens = CycleTokens::new(vec![("a", first_token), ("a", second_token)]);

    first_handle.settle(Ok(Completion::Value(payload(1))));

    let resolved = tokens.get(&"a").expect("token for registered store");
    assert_eq!(resolved.settled().await, Ok(Completion::Value(payload(1))));

    assert!(tokens.get(&"b").is_none());
}
