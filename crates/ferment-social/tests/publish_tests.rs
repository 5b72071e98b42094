//! Integration Tests for Action Publishing
//!
//! Checks message shapes as they reach the log client, follow stamping,
//! and error forwarding through both the `Result` and callback paths.

use std::sync::Arc;
use std::time::Duration;

use ferment_core::{FermentConfig, FermentError, MessageId};
use ferment_social::ActionMessage;
use ferment_testkit::{MemoryProfileStore, TestSession};
use serde_json::json;

fn scoped_session(scope: &str) -> TestSession {
    let config = FermentConfig::default().with_scope(scope);
    TestSession::with_config("@me", MemoryProfileStore::synced(), config)
}

// ============================================================================
// Follow
// ============================================================================

#[tokio::test]
async fn test_follow_non_pub_omits_pub_marker() {
    let session = scoped_session("public");
    let bob = session.identity("@bob");

    session.api.actions().follow(&bob).await.unwrap();

    let message = session.log.last().unwrap();
    assert_eq!(
        message.to_json().unwrap(),
        json!({"type": "follow", "target": "@bob", "scope": "public"})
    );
}

#[tokio::test]
async fn test_follow_pub_sets_pub_marker() {
    let session = scoped_session("public");
    let hub = session.identity("@hub");
    session.store.set_pub(&hub, true);

    session.api.actions().follow(&hub).await.unwrap();

    assert_eq!(
        session.log.last().unwrap().to_json().unwrap(),
        json!({"type": "follow", "target": "@hub", "scope": "public", "pub": true})
    );
}

#[tokio::test]
async fn test_follow_waits_for_initial_sync() {
    let session = Arc::new(TestSession::new("@me"));
    let hub = session.identity("@hub");

    let following = session.clone();
    let target = hub.clone();
    let follow = tokio::spawn(async move { following.api.actions().follow(&target).await });

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(session.log.published().is_empty());
    assert_eq!(session.factory.open_count(), 1);

    // Pub marker learned during sync must be on the message.
    session.store.set_pub(&hub, true);
    session.store.mark_synced();

    tokio::time::timeout(Duration::from_secs(1), follow)
        .await
        .expect("follow never completed")
        .unwrap()
        .unwrap();
    assert_eq!(
        session.log.last(),
        Some(ActionMessage::follow(hub, None, true))
    );
}

#[tokio::test]
async fn test_follow_feeds_back_into_following_feed() {
    let session = TestSession::synced("@me");
    let bob = session.identity("@bob");
    session.store.add_post(&bob, "%b1", 10);

    let feed = session.api.following_feed().unwrap();
    assert!(feed.is_empty());

    session.api.actions().follow(&bob).await.unwrap();
    assert_eq!(feed.len(), 1);

    session.api.actions().unfollow(&bob).await.unwrap();
    assert!(feed.is_empty());
}

// ============================================================================
// Other actions
// ============================================================================

#[tokio::test]
async fn test_link_toggles_and_unfollow_skip_store() {
    let session = TestSession::new("@me");
    let post = MessageId::from("%p1");
    let actions = session.api.actions();

    actions.like(&post).await.unwrap();
    actions.unlike(&post).await.unwrap();
    actions.repost(&post).await.unwrap();
    actions.unrepost(&post).await.unwrap();
    actions.unfollow(&session.identity("@bob")).await.unwrap();

    let published: Vec<_> = session
        .log
        .published()
        .iter()
        .map(|m| m.to_json().unwrap())
        .collect();
    assert_eq!(
        published,
        vec![
            json!({"type": "ferment/like", "like": {"link": "%p1", "value": true}}),
            json!({"type": "ferment/like", "like": {"link": "%p1", "value": false}}),
            json!({"type": "ferment/repost", "repost": {"link": "%p1", "value": true}}),
            json!({"type": "ferment/repost", "repost": {"link": "%p1", "value": false}}),
            json!({"type": "unfollow", "target": "@bob"}),
        ]
    );
    assert_eq!(session.factory.open_count(), 0);
}

#[tokio::test]
async fn test_set_own_display_name() {
    let session = TestSession::synced("@me");

    session.api.actions().set_own_display_name("Alice").await.unwrap();

    assert_eq!(
        session.log.last().unwrap().to_json().unwrap(),
        json!({"type": "about", "about": "@me", "name": "Alice"})
    );
    let profile = session.api.own_profile().unwrap();
    assert_eq!(profile.display_name().get().as_deref(), Some("Alice"));
}

#[tokio::test]
async fn test_publish_returns_message_id() {
    let session = TestSession::synced("@me");
    let first = session.api.publish(ActionMessage::unfollow("@x".into())).await.unwrap();
    let second = session.api.publish(ActionMessage::unfollow("@y".into())).await.unwrap();
    assert_ne!(first, second);
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_log_error_forwarded_unchanged() {
    let session = TestSession::synced("@me");
    let rejection = FermentError::publish("signature rejected");
    session.log.fail_next(rejection.clone());

    let err = session
        .api
        .actions()
        .like(&MessageId::from("%p1"))
        .await
        .unwrap_err();

    assert_eq!(err, rejection);
    assert!(session.log.published().is_empty());
}

#[tokio::test]
async fn test_submit_hands_error_to_callback() {
    let session = TestSession::synced("@me");
    session.log.fail_next(FermentError::publish("feed full"));
    let (tx, rx) = tokio::sync::oneshot::channel();

    session
        .api
        .actions()
        .submit(
            ActionMessage::unfollow("@bob".into()),
            Some(Box::new(move |result| {
                let _ = tx.send(result);
            })),
        )
        .await;

    let result = rx.await.unwrap();
    assert!(result.unwrap_err().is_publish());
}

#[tokio::test]
async fn test_submit_without_callback_succeeds_quietly() {
    let session = TestSession::synced("@me");
    session
        .api
        .actions()
        .submit(ActionMessage::unfollow("@bob".into()), None)
        .await;
    assert_eq!(session.log.published().len(), 1);
}

#[tokio::test]
#[should_panic(expected = "unhandled publish failure")]
async fn test_submit_without_callback_panics_on_error() {
    let session = TestSession::synced("@me");
    session.log.fail_next(FermentError::publish("feed full"));
    session
        .api
        .actions()
        .submit(ActionMessage::unfollow("@bob".into()), None)
        .await;
}
