//! Integration Tests for the Blob Bridge
//!
//! Requests are captured by the recording transport and answered out of band,
//! the way a renderer process would.

use std::sync::Arc;
use std::time::Duration;

use ferment_core::{BridgeConfig, FermentConfig};
use ferment_social::{BlobSource, CallId};
use ferment_testkit::{MemoryProfileStore, TestSession, TEST_SESSION_START_MS};

// ============================================================================
// Test Helpers
// ============================================================================

async fn wait_for_sent(session: &TestSession, count: usize) {
    for _ in 0..100 {
        if session.transport.sent().len() >= count {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("expected {count} bridge calls");
}

fn call_for(session: &TestSession, payload: u8) -> CallId {
    session
        .transport
        .sent()
        .into_iter()
        .find(|(_, request)| request.source == BlobSource::Data(vec![payload]))
        .map(|(id, _)| id)
        .unwrap()
}

// ============================================================================
// Correlation
// ============================================================================

#[tokio::test]
async fn test_concurrent_calls_route_independently() {
    let session = Arc::new(TestSession::synced("@me"));

    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.api.add_blob(BlobSource::Data(vec![1])).await })
    };
    let second = {
        let session = session.clone();
        tokio::spawn(async move { session.api.add_blob(BlobSource::Data(vec![2])).await })
    };
    wait_for_sent(&session, 2).await;

    let first_id = call_for(&session, 1);
    let second_id = call_for(&session, 2);
    assert_ne!(first_id, second_id);
    for id in [&first_id, &second_id] {
        assert!(id
            .as_str()
            .starts_with(&format!("{TEST_SESSION_START_MS}-")));
    }

    assert!(session
        .api
        .deliver_blob_response(&first_id, Ok("blobstore:abc".into())));
    assert_eq!(first.await.unwrap().unwrap(), "blobstore:abc");
    assert_eq!(session.api.blobs().bridge().pending_count(), 1);
    assert!(!second.is_finished());

    // Already answered.
    assert!(!session
        .api
        .deliver_blob_response(&first_id, Ok("blobstore:dup".into())));

    assert!(session
        .api
        .deliver_blob_response(&second_id, Err("disk full".into())));
    let err = second.await.unwrap().unwrap_err();
    assert!(err.to_string().contains("disk full"));
    assert_eq!(session.api.blobs().bridge().pending_count(), 0);
}

#[test]
fn test_response_for_unknown_call_is_ignored() {
    let session = TestSession::synced("@me");
    let stale = CallId::new(TEST_SESSION_START_MS - 1, 0);
    assert!(!session.api.deliver_blob_response(&stale, Ok("x".into())));
}

#[tokio::test(start_paused = true)]
async fn test_unanswered_call_times_out_and_is_evicted() {
    let config = FermentConfig {
        bridge: BridgeConfig {
            response_timeout_ms: 50,
        },
        ..FermentConfig::default()
    };
    let session = TestSession::with_config("@me", MemoryProfileStore::synced(), config);

    let err = session
        .api
        .add_blob(BlobSource::Path("/tmp/a.ogg".into()))
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(session.api.blobs().bridge().pending_count(), 0);

    let late = session.transport.sent_ids().remove(0);
    assert!(!session.api.deliver_blob_response(&late, Ok("late".into())));
}

#[tokio::test]
async fn test_closed_transport_fails_without_pending_entry() {
    let session = TestSession::synced("@me");
    session.transport.close();

    let result = tokio::time::timeout(
        Duration::from_secs(1),
        session.api.add_blob(BlobSource::Data(vec![0])),
    )
    .await
    .unwrap();

    assert!(result.is_err());
    assert_eq!(session.api.blobs().bridge().pending_count(), 0);
}

#[test]
fn test_blob_url_uses_configured_port() {
    let config = FermentConfig {
        blobs_port: 9000,
        ..FermentConfig::default()
    };
    let session = TestSession::with_config("@me", MemoryProfileStore::synced(), config);

    assert_eq!(
        session.api.blob_url("blobstore:abc"),
        "http://localhost:9000/abc"
    );
}
