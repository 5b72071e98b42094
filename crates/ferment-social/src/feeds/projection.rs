//! Feed projections
//!
//! Three derivations over store state, each available as a pure function and
//! as a live `Computed` that re-derives when its inputs change:
//!
//! - [`sorted_by_recency`]: newest first by post timestamp, stable on ties
//! - [`reversed_order`]: reverse index order
//! - [`union_of_followed_posts`]: every post of every followed identity
//!
//! None of these perform I/O; they only read already-resolved store state.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use ferment_core::{Computed, Identity, MessageId, Observable, SharedSource};

use crate::profile::{PostHandle, Profile};
use crate::store::{PostLookup, ProfileLookup};

/// Order `ids` newest first.
///
/// Equal timestamps keep their input order. Ids missing from `lookup` keep
/// their input order and sink below every resolved id.
pub fn sort_by_recency(
    ids: &[MessageId],
    lookup: &HashMap<MessageId, PostHandle>,
) -> Vec<MessageId> {
    let mut keyed: Vec<(&MessageId, Option<u64>)> = ids
        .iter()
        .map(|id| (id, lookup.get(id).map(PostHandle::timestamp)))
        .collect();

    // sort_by is stable, which keeps equal-timestamp items in input order
    keyed.sort_by(|(_, a), (_, b)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    keyed.into_iter().map(|(id, _)| id.clone()).collect()
}

/// Reverse `ids` by index.
pub fn reverse_ids(ids: &[MessageId]) -> Vec<MessageId> {
    ids.iter().rev().cloned().collect()
}

/// Flatten the posts of every followed identity with a known profile.
pub fn collect_followed_posts(
    following: &BTreeSet<Identity>,
    profiles: &HashMap<Identity, Profile>,
) -> Vec<MessageId> {
    let mut result = Vec::new();
    for id in following {
        if let Some(profile) = profiles.get(id) {
            profile.posts().with(|posts| result.extend(posts.iter().cloned()));
        }
    }
    result
}

/// Live newest-first ordering of `ids`.
///
/// Re-derives when `ids` changes or when the post table changes shape.
pub fn sorted_by_recency(
    ids: SharedSource<Vec<MessageId>>,
    lookup: PostLookup,
) -> Computed<Vec<MessageId>> {
    let deps: Vec<Arc<dyn Observable>> = vec![Arc::new(ids.clone()), lookup.as_observable()];
    Computed::new(deps, move || {
        let ids = ids.get();
        let sorted = lookup.with(|table| sort_by_recency(&ids, table));
        tracing::trace!(len = sorted.len(), "recomputed recency order");
        sorted
    })
}

/// Live reverse of `ids`.
pub fn reversed_order(ids: SharedSource<Vec<MessageId>>) -> Computed<Vec<MessageId>> {
    let deps: Vec<Arc<dyn Observable>> = vec![Arc::new(ids.clone())];
    Computed::new(deps, move || reverse_ids(&ids.get()))
}

/// Live union of the posts of everyone `own` follows.
///
/// Re-derives when the follow set changes, when a profile is added to the
/// table, or when any followed profile gains a post. Followed identities
/// without a profile are skipped.
pub fn union_of_followed_posts(own: &Profile, profiles: ProfileLookup) -> Computed<Vec<MessageId>> {
    let (stamp_own, stamp_profiles) = (own.clone(), profiles.clone());
    let stamp = move || {
        let mut versions = vec![stamp_own.following().version(), stamp_profiles.version()];
        stamp_own.following().with(|following| {
            stamp_profiles.with(|table| {
                versions.extend(
                    following
                        .iter()
                        .filter_map(|id| table.get(id))
                        .map(|profile| profile.posts().version()),
                );
            });
        });
        versions
    };

    let own = own.clone();
    Computed::with_stamp(stamp, move || {
        own.following()
            .with(|following| profiles.with(|table| collect_followed_posts(following, table)))
    })
}
