//! Profile and post handles
//!
//! A `Profile` is a cheap, cloneable handle over reactive cells owned by the
//! profile store. The feed layer only reads through these handles; stores
//! write to them as they ingest messages from the log.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use ferment_core::{Dynamic, Identity, MessageId};
use serde::{Deserialize, Serialize};

/// A resolved post as exposed by the store's lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostHandle {
    /// Message id of the post
    pub id: MessageId,
    /// Author identity
    pub author: Identity,
    /// Claimed publish time (ms since epoch)
    pub timestamp_ms: u64,
}

impl PostHandle {
    /// Create a post handle.
    pub fn new(id: impl Into<MessageId>, author: impl Into<Identity>, timestamp_ms: u64) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            timestamp_ms,
        }
    }

    /// Timestamp used for recency ordering.
    pub fn timestamp(&self) -> u64 {
        self.timestamp_ms
    }
}

struct ProfileInner {
    id: Identity,
    display_name: Dynamic<Option<String>>,
    following: Dynamic<BTreeSet<Identity>>,
    posts: Dynamic<Vec<MessageId>>,
    likes: Dynamic<Vec<MessageId>>,
    is_pub: Dynamic<bool>,
}

/// Per-identity aggregate of the social graph.
///
/// `posts` is append-only in chronological order; `likes` is in the order the
/// store observed the like messages.
#[derive(Clone)]
pub struct Profile {
    inner: Arc<ProfileInner>,
}

impl Profile {
    /// Create an empty profile for `id`.
    pub fn new(id: impl Into<Identity>) -> Self {
        Self {
            inner: Arc::new(ProfileInner {
                id: id.into(),
                display_name: Dynamic::new(None),
                following: Dynamic::new(BTreeSet::new()),
                posts: Dynamic::new(Vec::new()),
                likes: Dynamic::new(Vec::new()),
                is_pub: Dynamic::new(false),
            }),
        }
    }

    /// Identity this profile describes.
    pub fn id(&self) -> &Identity {
        &self.inner.id
    }

    /// Display name asserted by the identity, if any.
    pub fn display_name(&self) -> &Dynamic<Option<String>> {
        &self.inner.display_name
    }

    /// Identities this profile follows.
    pub fn following(&self) -> &Dynamic<BTreeSet<Identity>> {
        &self.inner.following
    }

    /// Post ids authored by this identity, oldest first.
    pub fn posts(&self) -> &Dynamic<Vec<MessageId>> {
        &self.inner.posts
    }

    /// Post ids this identity liked.
    pub fn likes(&self) -> &Dynamic<Vec<MessageId>> {
        &self.inner.likes
    }

    /// Pub marker cell.
    pub fn pub_flag(&self) -> &Dynamic<bool> {
        &self.inner.is_pub
    }

    /// Whether this identity is a pub (always-on relay peer).
    pub fn is_pub(&self) -> bool {
        self.inner.is_pub.get()
    }

    /// Whether two handles point at the same underlying profile.
    pub fn ptr_eq(&self, other: &Profile) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("id", &self.inner.id)
            .field("display_name", &self.inner.display_name.get())
            .field("following", &self.inner.following.with(BTreeSet::len))
            .field("posts", &self.inner.posts.with(Vec::len))
            .field("is_pub", &self.is_pub())
            .finish()
    }
}
