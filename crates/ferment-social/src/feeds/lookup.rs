//! Item lookup: ids to post handles
//!
//! Resolution keeps positions: slot `i` of the output always belongs to id
//! `i` of the input, and an id the store does not know yet becomes `None`.

use std::collections::HashMap;
use std::sync::Arc;

use ferment_core::{Computed, Dynamic, MessageId, Observable, SharedSource};

use crate::profile::PostHandle;
use crate::readiness::ReadinessGate;
use crate::store::PostLookup;

/// Map each id to its handle, `None` for misses.
pub fn resolve_ids(
    ids: &[MessageId],
    lookup: &HashMap<MessageId, PostHandle>,
) -> Vec<Option<PostHandle>> {
    ids.iter().map(|id| lookup.get(id).cloned()).collect()
}

/// A live, resolved feed plus the store's readiness.
///
/// `is_ready()` lets a consumer tell "empty because nothing is there" from
/// "empty because the store has not synced yet". It reads the readiness
/// gate, so once true it stays true.
#[derive(Clone)]
pub struct ResolvedFeed {
    items: Computed<Vec<Option<PostHandle>>>,
    sync: Dynamic<bool>,
    gate: Arc<ReadinessGate>,
}

impl ResolvedFeed {
    /// Current items, recomputed if the ids or the post table changed.
    pub fn items(&self) -> Vec<Option<PostHandle>> {
        self.items.get()
    }

    /// Current items with misses dropped.
    pub fn resolved(&self) -> Vec<PostHandle> {
        self.items.get().into_iter().flatten().collect()
    }

    /// Underlying derived value, for subscriptions or further derivation.
    pub fn computed(&self) -> &Computed<Vec<Option<PostHandle>>> {
        &self.items
    }

    /// Whether the store has completed its initial sync.
    pub fn is_ready(&self) -> bool {
        self.gate.is_ready()
    }

    /// Raw store sync signal, which may drop back to `false` while busy.
    pub fn sync(&self) -> &Dynamic<bool> {
        &self.sync
    }

    /// Number of slots, including misses.
    pub fn len(&self) -> usize {
        self.items.get().len()
    }

    /// Whether the feed currently has no slots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ResolvedFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFeed")
            .field("len", &self.len())
            .field("ready", &self.is_ready())
            .finish()
    }
}

/// Resolves id sequences against the store's post table.
#[derive(Clone)]
pub struct ItemLookup {
    posts: PostLookup,
    sync: Dynamic<bool>,
    gate: Arc<ReadinessGate>,
}

impl ItemLookup {
    /// Create a lookup over the store's post table and sync signal, with a
    /// readiness gate of its own.
    pub fn new(posts: PostLookup, sync: Dynamic<bool>) -> Self {
        let gate = ReadinessGate::new();
        gate.attach(sync.clone());
        Self::with_gate(posts, sync, Arc::new(gate))
    }

    /// Create a lookup that reports readiness through the session's gate.
    pub fn with_gate(posts: PostLookup, sync: Dynamic<bool>, gate: Arc<ReadinessGate>) -> Self {
        Self { posts, sync, gate }
    }

    /// Live resolution of `ids`, re-run in full when `ids` or the post table
    /// change.
    pub fn resolve(&self, ids: SharedSource<Vec<MessageId>>) -> ResolvedFeed {
        let deps: Vec<Arc<dyn Observable>> =
            vec![Arc::new(ids.clone()), self.posts.as_observable()];
        let posts = self.posts.clone();
        let items = Computed::new(deps, move || {
            let ids = ids.get();
            posts.with(|table| resolve_ids(&ids, table))
        });
        ResolvedFeed {
            items,
            sync: self.sync.clone(),
            gate: self.gate.clone(),
        }
    }
}
