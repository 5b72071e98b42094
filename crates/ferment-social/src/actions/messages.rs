//! Action message schema
//!
//! Messages are internally tagged by `type` so the serialized form matches
//! what other peers on the log expect:
//!
//! ```text
//! {"type":"follow","target":"@x","scope":"public","pub":true}
//! {"type":"unfollow","target":"@x"}
//! {"type":"ferment/like","like":{"link":"%p","value":true}}
//! {"type":"ferment/repost","repost":{"link":"%p","value":false}}
//! {"type":"about","about":"@me","name":"Alice"}
//! ```

use ferment_core::{Identity, MessageId, Result};
use serde::{Deserialize, Serialize};

/// Typed reference from a message to a target id with a toggle value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Target message
    pub link: MessageId,
    /// `true` to set, `false` to clear
    pub value: bool,
}

impl Link {
    /// Link to `target` carrying `value`.
    pub fn new(target: MessageId, value: bool) -> Self {
        Self {
            link: target,
            value,
        }
    }
}

/// Kinds of boolean link toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// `ferment/like`
    Like,
    /// `ferment/repost`
    Repost,
}

/// A social-graph message ready for the log client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActionMessage {
    /// Start following `target`.
    #[serde(rename = "follow")]
    Follow {
        /// Followed identity
        target: Identity,
        /// Configured follow scope
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scope: Option<String>,
        /// Present and `true` only when the target is a pub
        #[serde(rename = "pub", default, skip_serializing_if = "Option::is_none")]
        pub_target: Option<bool>,
    },

    /// Stop following `target`.
    #[serde(rename = "unfollow")]
    Unfollow {
        /// Unfollowed identity
        target: Identity,
    },

    /// Like or unlike a post.
    #[serde(rename = "ferment/like")]
    Like {
        /// Liked post and toggle value
        like: Link,
    },

    /// Repost or unrepost a post.
    #[serde(rename = "ferment/repost")]
    Repost {
        /// Reposted post and toggle value
        repost: Link,
    },

    /// Identity metadata assertion.
    #[serde(rename = "about")]
    About {
        /// Identity being described
        about: Identity,
        /// Display name
        name: String,
    },
}

impl ActionMessage {
    /// Follow message for `target`, stamped with `scope` and marked as a pub
    /// follow when `is_pub`.
    pub fn follow(target: Identity, scope: Option<String>, is_pub: bool) -> Self {
        Self::Follow {
            target,
            scope,
            pub_target: is_pub.then_some(true),
        }
    }

    /// Unfollow message for `target`.
    pub fn unfollow(target: Identity) -> Self {
        Self::Unfollow { target }
    }

    /// Boolean link toggle of the given kind.
    pub fn link_toggle(kind: LinkKind, target: MessageId, value: bool) -> Self {
        let link = Link::new(target, value);
        match kind {
            LinkKind::Like => Self::Like { like: link },
            LinkKind::Repost => Self::Repost { repost: link },
        }
    }

    /// Display name assertion for `own_id`.
    pub fn display_name(own_id: Identity, name: impl Into<String>) -> Self {
        Self::About {
            about: own_id,
            name: name.into(),
        }
    }

    /// Value of the `type` field.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Follow { .. } => "follow",
            Self::Unfollow { .. } => "unfollow",
            Self::Like { .. } => "ferment/like",
            Self::Repost { .. } => "ferment/repost",
            Self::About { .. } => "about",
        }
    }

    /// Serialized JSON form.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
