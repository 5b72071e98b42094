//! # Reactive Primitives for Derived Feeds
//!
//! This module provides the dependency-tracking layer that keeps feeds live
//! without a global reactive runtime.
//!
//! ## Core Types
//!
//! - [`Dynamic<T>`]: A mutable, versioned cell. Every write bumps the version
//!   and wakes async waiters.
//!
//! - [`Computed<T>`]: A derived value. Reads recompute only when the versions
//!   of its inputs moved since the previous read, so recomputation is deferred
//!   to the next read and never regresses.
//!
//! - [`Subscription<T>`] / [`ComputedSubscription<T>`]: Poll-based change
//!   detection for consumers that keep a view alive.
//!
//! ## Design Principles
//!
//! 1. **Pull-based derivation**: writes are cheap; derived values are
//!    materialized lazily on read.
//!
//! 2. **Monotonic versions**: every `Observable` exposes a version that only
//!    grows, so a later read always reflects a superset of earlier writes.
//!
//! 3. **Composable**: `Computed` is itself `Observable` and can feed another
//!    `Computed`.

mod computed;
mod dynamic;

use std::sync::Arc;

pub use computed::{Computed, ComputedSubscription};
pub use dynamic::{Dynamic, Subscription};

/// Anything that exposes a monotonically increasing change version.
pub trait Observable: Send + Sync {
    /// Current version. Grows by at least one on every observable change.
    fn version(&self) -> u64;
}

/// An observable that can also be read.
pub trait Source<T>: Observable {
    /// Current value.
    fn get(&self) -> T;
}

/// Shared, type-erased readable source.
pub type SharedSource<T> = Arc<dyn Source<T>>;

impl<T: ?Sized + Observable> Observable for Arc<T> {
    fn version(&self) -> u64 {
        (**self).version()
    }
}

impl<V, T: ?Sized + Source<V>> Source<V> for Arc<T> {
    fn get(&self) -> V {
        (**self).get()
    }
}
