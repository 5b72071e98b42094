//! In-memory profile store
//!
//! Holds the whole social graph in reactive cells so tests can mutate it and
//! watch feeds follow. Published messages can be fed back in with
//! [`MemoryProfileStore::apply`], mirroring how a real store observes the log.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use ferment_core::{Dynamic, FermentConfig, FermentError, Identity, MessageId, Result};
use ferment_social::{
    ActionMessage, LogClient, PostHandle, PostLookup, Profile, ProfileLookup, ProfileStore,
    StoreFactory,
};

/// Social graph held entirely in memory.
pub struct MemoryProfileStore {
    sync: Dynamic<bool>,
    profiles: ProfileLookup,
    posts: PostLookup,
    pub_friend_posts: Dynamic<Vec<MessageId>>,
}

impl Default for MemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProfileStore {
    /// Empty, not yet synced store.
    pub fn new() -> Self {
        Self {
            sync: Dynamic::new(false),
            profiles: Dynamic::new(HashMap::new()),
            posts: Dynamic::new(HashMap::new()),
            pub_friend_posts: Dynamic::new(Vec::new()),
        }
    }

    /// Empty store that already finished its initial sync.
    pub fn synced() -> Self {
        let store = Self::new();
        store.mark_synced();
        store
    }

    /// Flip the sync signal to `true`.
    pub fn mark_synced(&self) {
        self.sync.set_if_changed(true);
    }

    /// Set the sync signal (e.g. to simulate a busy store).
    pub fn set_sync(&self, synced: bool) {
        self.sync.set_if_changed(synced);
    }

    /// Profile for `id`, registering it if needed.
    pub fn profile(&self, id: &Identity) -> Profile {
        if let Some(profile) = self.profiles.with(|table| table.get(id).cloned()) {
            return profile;
        }
        self.profiles.modify(|table| {
            table
                .entry(id.clone())
                .or_insert_with(|| Profile::new(id.clone()))
                .clone()
        })
    }

    /// Record a post by `author`.
    pub fn add_post(&self, author: &Identity, id: &str, timestamp_ms: u64) -> MessageId {
        let post_id = MessageId::from(id);
        self.posts.modify(|table| {
            table.insert(
                post_id.clone(),
                PostHandle::new(post_id.clone(), author.clone(), timestamp_ms),
            );
        });
        self.profile(author)
            .posts()
            .modify(|posts| posts.push(post_id.clone()));
        post_id
    }

    /// Record a post and surface it in the discovery feed.
    pub fn add_pub_friend_post(&self, author: &Identity, id: &str, timestamp_ms: u64) -> MessageId {
        let post_id = self.add_post(author, id, timestamp_ms);
        self.pub_friend_posts
            .modify(|posts| posts.push(post_id.clone()));
        post_id
    }

    /// Add an id to the discovery feed without a backing post.
    pub fn add_pub_friend_id(&self, id: &str) {
        self.pub_friend_posts
            .modify(|posts| posts.push(MessageId::from(id)));
    }

    /// `who` follows `whom`.
    pub fn follow(&self, who: &Identity, whom: &Identity) {
        self.profile(who)
            .following()
            .modify(|set| set.insert(whom.clone()));
    }

    /// `who` stops following `whom`.
    pub fn unfollow(&self, who: &Identity, whom: &Identity) {
        self.profile(who)
            .following()
            .modify(|set| set.remove(whom));
    }

    /// `who` likes `post`.
    pub fn like(&self, who: &Identity, post: &MessageId) {
        self.profile(who).likes().modify(|likes| {
            if !likes.contains(post) {
                likes.push(post.clone());
            }
        });
    }

    /// `who` clears a like on `post`.
    pub fn unlike(&self, who: &Identity, post: &MessageId) {
        self.profile(who)
            .likes()
            .modify(|likes| likes.retain(|p| p != post));
    }

    /// Mark `id` as a pub (or not).
    pub fn set_pub(&self, id: &Identity, is_pub: bool) {
        self.profile(id).pub_flag().set_if_changed(is_pub);
    }

    /// Ingest a message published by `author`.
    pub fn apply(&self, author: &Identity, message: &ActionMessage) {
        match message {
            ActionMessage::Follow { target, .. } => self.follow(author, target),
            ActionMessage::Unfollow { target } => self.unfollow(author, target),
            ActionMessage::Like { like } if like.value => self.like(author, &like.link),
            ActionMessage::Like { like } => self.unlike(author, &like.link),
            ActionMessage::Repost { .. } => {}
            ActionMessage::About { about, name } if about == author => {
                self.profile(author)
                    .display_name()
                    .set(Some(name.clone()));
            }
            ActionMessage::About { .. } => {}
        }
    }

    fn follower_count(&self, id: &Identity) -> usize {
        self.profiles.with(|table| {
            table
                .values()
                .filter(|p| p.following().with(|set| set.contains(id)))
                .count()
        })
    }
}

impl ProfileStore for MemoryProfileStore {
    fn sync(&self) -> Dynamic<bool> {
        self.sync.clone()
    }

    fn get(&self, id: &Identity) -> Profile {
        self.profile(id)
    }

    fn post_lookup(&self) -> PostLookup {
        self.posts.clone()
    }

    fn profile_lookup(&self) -> ProfileLookup {
        self.profiles.clone()
    }

    fn pub_friend_post_ids(&self) -> Dynamic<Vec<MessageId>> {
        self.pub_friend_posts.clone()
    }

    /// Most followed first; ties keep input order.
    fn rank_profile_ids(&self, ids: &[Identity], max: usize) -> Vec<Identity> {
        let mut ranked: Vec<(usize, &Identity)> =
            ids.iter().map(|id| (self.follower_count(id), id)).collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0));
        ranked.into_iter().take(max).map(|(_, id)| id.clone()).collect()
    }

    /// Pubs first, then by follower count.
    fn suggested(&self, max: usize) -> Vec<Identity> {
        let mut ids: Vec<Identity> = self.profiles.with(|table| table.keys().cloned().collect());
        ids.sort();
        let (pubs, others): (Vec<_>, Vec<_>) =
            ids.into_iter().partition(|id| self.profile(id).is_pub());
        let mut result = self.rank_profile_ids(&pubs, max);
        let remaining = max.saturating_sub(result.len());
        result.extend(self.rank_profile_ids(&others, remaining));
        result
    }
}

/// Factory handing out one shared `MemoryProfileStore`, counting opens.
pub struct MemoryStoreFactory {
    store: Arc<MemoryProfileStore>,
    opens: AtomicUsize,
    fail_next: AtomicBool,
}

impl MemoryStoreFactory {
    /// Factory over `store`.
    pub fn new(store: Arc<MemoryProfileStore>) -> Self {
        Self {
            store,
            opens: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
        }
    }

    /// Make the next `open` fail with a store error.
    pub fn fail_next_open(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Number of successful constructions.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// The shared store.
    pub fn store(&self) -> Arc<MemoryProfileStore> {
        self.store.clone()
    }
}

impl StoreFactory for MemoryStoreFactory {
    fn open(
        &self,
        log: Arc<dyn LogClient>,
        _config: &FermentConfig,
    ) -> Result<Arc<dyn ProfileStore>> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(FermentError::store("database locked"));
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(id = %log.id(), "opening in-memory profile store");
        self.store.profile(log.id());
        Ok(self.store.clone())
    }
}

/// Followed set as a `BTreeSet`, for assertions.
pub fn id_set(ids: &[&str]) -> BTreeSet<Identity> {
    ids.iter().map(|s| Identity::from(*s)).collect()
}
