//! Profile store boundary
//!
//! The store owns follow/like/post data and its own sync state. It is built
//! from the log client and configuration by a [`StoreFactory`], and the feed
//! layer only reads from it.

use std::collections::HashMap;
use std::sync::Arc;

use ferment_core::{Dynamic, FermentConfig, Identity, MessageId, Result};

use crate::log::LogClient;
use crate::profile::{PostHandle, Profile};

/// Id to handle table for every post the store knows about.
pub type PostLookup = Dynamic<HashMap<MessageId, PostHandle>>;

/// Identity to profile table for every profile the store knows about.
pub type ProfileLookup = Dynamic<HashMap<Identity, Profile>>;

/// Read side of the social graph.
pub trait ProfileStore: Send + Sync {
    /// `true` once the initial sync has completed.
    fn sync(&self) -> Dynamic<bool>;

    /// Profile handle for `id`. Unknown identities get an empty profile that
    /// fills in as data arrives.
    fn get(&self, id: &Identity) -> Profile;

    /// Post table. Its version changes whenever a post is added or removed.
    fn post_lookup(&self) -> PostLookup;

    /// Profile table. Its version changes whenever a profile is added.
    fn profile_lookup(&self) -> ProfileLookup;

    /// Posts from pubs and their friends, used for the discovery feed.
    fn pub_friend_post_ids(&self) -> Dynamic<Vec<MessageId>>;

    /// Order `ids` by the store's relevance ranking, keeping at most `max`.
    fn rank_profile_ids(&self, ids: &[Identity], max: usize) -> Vec<Identity>;

    /// Up to `max` identities the store suggests following.
    fn suggested(&self, max: usize) -> Vec<Identity>;

    /// Resolve a single post.
    fn get_post(&self, id: &MessageId) -> Option<PostHandle> {
        self.post_lookup().with(|posts| posts.get(id).cloned())
    }
}

/// Builds the profile store. Called at most once per session.
pub trait StoreFactory: Send + Sync {
    /// Construct the store over the given log client and configuration.
    fn open(
        &self,
        log: Arc<dyn LogClient>,
        config: &FermentConfig,
    ) -> Result<Arc<dyn ProfileStore>>;
}

impl<F> StoreFactory for F
where
    F: Fn(Arc<dyn LogClient>, &FermentConfig) -> Result<Arc<dyn ProfileStore>> + Send + Sync,
{
    fn open(
        &self,
        log: Arc<dyn LogClient>,
        config: &FermentConfig,
    ) -> Result<Arc<dyn ProfileStore>> {
        self(log, config)
    }
}
