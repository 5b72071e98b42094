//! Integration Tests for Feed Composition
//!
//! Exercises the four feeds end to end over the in-memory store, including
//! live updates while a feed is held.

use std::collections::HashMap;
use std::sync::Arc;

use ferment_core::{Dynamic, MessageId};
use ferment_social::{ItemLookup, PostHandle};
use ferment_testkit::TestSession;

// ============================================================================
// Test Helpers
// ============================================================================

fn ids(feed: &ferment_social::ResolvedFeed) -> Vec<String> {
    feed.resolved()
        .into_iter()
        .map(|post| post.id.as_str().to_string())
        .collect()
}

/// `@me` follows bob and carol; dave is not followed.
fn social_graph() -> TestSession {
    let session = TestSession::synced("@me");
    let me = session.identity("@me");
    let bob = session.identity("@bob");
    let carol = session.identity("@carol");
    let dave = session.identity("@dave");

    session.store.add_post(&bob, "%b1", 10);
    session.store.add_post(&bob, "%b2", 30);
    session.store.add_post(&carol, "%c1", 20);
    session.store.add_post(&dave, "%d1", 40);
    session.store.follow(&me, &bob);
    session.store.follow(&me, &carol);
    session
}

// ============================================================================
// Following
// ============================================================================

#[test]
fn test_following_feed_merges_followed_posts_by_recency() {
    let session = social_graph();
    let feed = session.api.following_feed().unwrap();

    assert_eq!(ids(&feed), vec!["%b2", "%c1", "%b1"]);
    assert!(feed.is_ready());
}

#[test]
fn test_following_feed_tracks_new_posts() {
    let session = social_graph();
    let feed = session.api.following_feed().unwrap();
    assert_eq!(feed.len(), 3);

    let carol = session.identity("@carol");
    session.store.add_post(&carol, "%c2", 50);

    assert_eq!(ids(&feed), vec!["%c2", "%b2", "%c1", "%b1"]);
}

#[test]
fn test_following_feed_tracks_follow_changes() {
    let session = social_graph();
    let me = session.identity("@me");
    let feed = session.api.following_feed().unwrap();

    session.store.follow(&me, &session.identity("@dave"));
    assert_eq!(ids(&feed), vec!["%d1", "%b2", "%c1", "%b1"]);

    session.store.unfollow(&me, &session.identity("@bob"));
    assert_eq!(ids(&feed), vec!["%d1", "%c1"]);
}

#[test]
fn test_following_unknown_identity_contributes_nothing() {
    let session = social_graph();
    let me = session.identity("@me");
    let feed = session.api.following_feed().unwrap();

    session.store.follow(&me, &session.identity("@nobody"));
    assert_eq!(ids(&feed), vec!["%b2", "%c1", "%b1"]);
}

#[test]
fn test_following_feed_empty_while_unsynced() {
    let session = TestSession::new("@me");
    let feed = session.api.following_feed().unwrap();

    assert!(feed.is_empty());
    assert!(!feed.is_ready());

    session.store.mark_synced();
    assert!(feed.is_ready());
}

#[test]
fn test_feed_readiness_agrees_with_gate_after_store_goes_busy() {
    let session = social_graph();
    let gate = session.api.profiles_loaded();
    let feed = session.api.following_feed().unwrap();
    assert!(gate.is_ready());
    assert!(feed.is_ready());

    session.store.set_sync(false);
    assert!(gate.is_ready());
    assert!(feed.is_ready());
    assert!(!feed.sync().get());
}

// ============================================================================
// Discovery, profile and liked
// ============================================================================

#[test]
fn test_discovery_feed_sorts_and_keeps_unresolved_slots() {
    let session = TestSession::synced("@me");
    let hub = session.identity("@hub");
    session.store.add_pub_friend_post(&hub, "%old", 5);
    session.store.add_pub_friend_id("%ghost");
    session.store.add_pub_friend_post(&hub, "%new", 50);

    let feed = session.api.discovery_feed().unwrap();
    let items = feed.items();

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_ref().unwrap().id.as_str(), "%new");
    assert_eq!(items[1].as_ref().unwrap().id.as_str(), "%old");
    assert!(items[2].is_none());
}

#[test]
fn test_profile_feed_is_reverse_chronological_by_insertion() {
    let session = TestSession::synced("@me");
    let bob = session.identity("@bob");
    session.store.add_post(&bob, "%b1", 30);
    session.store.add_post(&bob, "%b2", 10);
    session.store.add_post(&bob, "%b3", 20);

    let feed = session.api.profile_feed(&bob).unwrap();
    assert_eq!(ids(&feed), vec!["%b3", "%b2", "%b1"]);

    session.store.add_post(&bob, "%b4", 1);
    assert_eq!(ids(&feed)[0], "%b4");
}

#[tokio::test]
async fn test_liked_feed_reflects_published_likes() {
    let session = TestSession::synced("@me");
    let bob = session.identity("@bob");
    let first = session.store.add_post(&bob, "%b1", 10);
    let second = session.store.add_post(&bob, "%b2", 20);

    let feed = session.api.liked_feed_for(session.api.id()).unwrap();
    assert!(feed.is_empty());

    session.api.actions().like(&first).await.unwrap();
    session.api.actions().like(&second).await.unwrap();
    assert_eq!(ids(&feed), vec!["%b1", "%b2"]);

    session.api.actions().unlike(&first).await.unwrap();
    assert_eq!(ids(&feed), vec!["%b2"]);
}

// ============================================================================
// Item lookup
// ============================================================================

#[test]
fn test_lookup_keeps_position_of_misses() {
    let posts = Dynamic::new(HashMap::from([
        (MessageId::from("%a"), PostHandle::new("%a", "@x", 1)),
        (MessageId::from("%c"), PostHandle::new("%c", "@x", 3)),
    ]));
    let sync = Dynamic::new(true);
    let lookup = ItemLookup::new(posts.clone(), sync);
    let source = Dynamic::new(vec![
        MessageId::from("%a"),
        MessageId::from("%b"),
        MessageId::from("%c"),
    ]);

    let feed = lookup.resolve(Arc::new(source));
    let items = feed.items();
    assert_eq!(items.len(), 3);
    assert!(items[0].is_some());
    assert!(items[1].is_none());
    assert!(items[2].is_some());

    posts.modify(|table| {
        table.insert(MessageId::from("%b"), PostHandle::new("%b", "@x", 2));
    });
    assert_eq!(feed.items()[1].as_ref().unwrap().timestamp(), 2);
}

#[test]
fn test_independent_feeds_do_not_share_state() {
    let session = social_graph();
    let first = session.api.following_feed().unwrap();
    let second = session.api.following_feed().unwrap();

    let bob = session.identity("@bob");
    session.store.add_post(&bob, "%b3", 99);

    assert_eq!(ids(&first), ids(&second));
    assert_eq!(ids(&first)[0], "%b3");
}
