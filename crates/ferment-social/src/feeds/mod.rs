//! # Feed Accessors
//!
//! Composes the projections and the item lookup into the four feeds:
//!
//! | Feed      | Ids                                                    |
//! |-----------|--------------------------------------------------------|
//! | discovery | `sorted_by_recency(pub_friend_post_ids)`               |
//! | following | `sorted_by_recency(union_of_followed_posts(own))`      |
//! | profile   | `reversed_order(profile.posts)`                        |
//! | liked     | `profile.likes` as stored                              |
//!
//! Each accessor returns a fresh, independent view that stays live for as long
//! as the caller holds it.

pub mod lookup;
pub mod projection;

use std::sync::Arc;

use ferment_core::{Computed, Identity, MessageId};

use crate::readiness::ReadinessGate;
use crate::store::ProfileStore;

pub use lookup::{resolve_ids, ItemLookup, ResolvedFeed};
pub use projection::{
    collect_followed_posts, reverse_ids, reversed_order, sort_by_recency, sorted_by_recency,
    union_of_followed_posts,
};

/// Builds feed views over a constructed profile store.
#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn ProfileStore>,
    own_id: Identity,
    lookup: ItemLookup,
}

impl FeedService {
    /// Create a feed service for `own_id` over `store`. Feeds report
    /// readiness through `gate`.
    pub fn new(store: Arc<dyn ProfileStore>, own_id: Identity, gate: Arc<ReadinessGate>) -> Self {
        let lookup = ItemLookup::with_gate(store.post_lookup(), store.sync(), gate);
        Self {
            store,
            own_id,
            lookup,
        }
    }

    /// Ids of the discovery feed, newest first.
    pub fn discovery_ids(&self) -> Computed<Vec<MessageId>> {
        sorted_by_recency(
            Arc::new(self.store.pub_friend_post_ids()),
            self.store.post_lookup(),
        )
    }

    /// Ids of the following feed, newest first.
    pub fn following_ids(&self) -> Computed<Vec<MessageId>> {
        let own = self.store.get(&self.own_id);
        let union = union_of_followed_posts(&own, self.store.profile_lookup());
        sorted_by_recency(Arc::new(union), self.store.post_lookup())
    }

    /// Ids of `id`'s own posts, newest first.
    pub fn profile_ids(&self, id: &Identity) -> Computed<Vec<MessageId>> {
        reversed_order(Arc::new(self.store.get(id).posts().clone()))
    }

    /// Discovery feed resolved to post handles.
    pub fn discovery_feed(&self) -> ResolvedFeed {
        self.lookup.resolve(Arc::new(self.discovery_ids()))
    }

    /// Following feed resolved to post handles.
    pub fn following_feed(&self) -> ResolvedFeed {
        self.lookup.resolve(Arc::new(self.following_ids()))
    }

    /// Profile feed of `id` resolved to post handles.
    pub fn profile_feed(&self, id: &Identity) -> ResolvedFeed {
        self.lookup.resolve(Arc::new(self.profile_ids(id)))
    }

    /// Posts liked by `id`, in store order.
    pub fn liked_feed(&self, id: &Identity) -> ResolvedFeed {
        self.lookup.resolve(Arc::new(self.store.get(id).likes().clone()))
    }
}

impl std::fmt::Debug for FeedService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedService")
            .field("own_id", &self.own_id)
            .finish_non_exhaustive()
    }
}
