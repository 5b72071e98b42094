//! Dynamic<T> - A versioned reactive cell
//!
//! `Dynamic<T>` wraps a value and bumps a version counter on every write.
//! Readers either poll the version (`Subscription`, `Computed`) or await a
//! change (`changed_since`, `wait_until`). Change notification uses
//! `tokio::sync::Notify`, which does not require a running tokio runtime.

// Lock poisoning means a writer panicked mid-update; that is unrecoverable,
// so expect() is the appropriate handling pattern here.
#![allow(clippy::expect_used)]

use std::pin::pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::Notify;

use super::computed::Computed;
use super::{Observable, Source};

struct DynamicInner<T> {
    value: RwLock<T>,
    /// Incremented after every write; never decreases.
    version: AtomicU64,
    notify: Notify,
}

/// A reactive value that can be observed for changes.
///
/// Clones share state: a write through one clone is visible through all of
/// them and bumps the shared version.
///
/// # Example
///
/// ```rust,ignore
/// use ferment_core::reactive::Dynamic;
///
/// let posts = Dynamic::new(vec!["%a"]);
/// let mut sub = posts.subscribe();
///
/// posts.modify(|p| p.push("%b"));
/// assert_eq!(sub.poll(), Some(vec!["%a", "%b"]));
/// ```
#[derive(Clone)]
pub struct Dynamic<T> {
    inner: Arc<DynamicInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> Dynamic<T> {
    /// Create a new Dynamic with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(DynamicInner {
                value: RwLock::new(value),
                version: AtomicU64::new(0),
                notify: Notify::new(),
            }),
        }
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.inner
            .value
            .read()
            .expect("Dynamic lock poisoned")
            .clone()
    }

    /// Read the current value through a closure without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.inner.value.read().expect("Dynamic lock poisoned");
        f(&guard)
    }

    /// Get the current version number.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// Replace the value, bump the version and wake async waiters.
    pub fn set(&self, value: T) {
        {
            let mut guard = self.inner.value.write().expect("Dynamic lock poisoned");
            *guard = value;
        }
        self.bump();
    }

    /// Replace the value only when it differs from the current one.
    ///
    /// Returns `true` if a write happened.
    pub fn set_if_changed(&self, value: T) -> bool
    where
        T: PartialEq,
    {
        {
            let mut guard = self.inner.value.write().expect("Dynamic lock poisoned");
            if *guard == value {
                return false;
            }
            *guard = value;
        }
        self.bump();
        true
    }

    /// Update the value using a function of the old value.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(T) -> T,
    {
        let new_value = f(self.get());
        self.set(new_value);
    }

    /// Mutate the value in place (e.g. append to a list).
    pub fn modify<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = {
            let mut guard = self.inner.value.write().expect("Dynamic lock poisoned");
            f(&mut guard)
        };
        self.bump();
        result
    }

    fn bump(&self) {
        self.inner.version.fetch_add(1, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    /// Subscribe to value changes.
    ///
    /// The subscription starts at the current version, so the first `poll()`
    /// only returns a value after a later write.
    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            source: self.clone(),
            last_version: self.version(),
        }
    }

    /// Derive a lazily recomputed value from this one.
    pub fn map<U, F>(&self, f: F) -> Computed<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        let source = self.clone();
        Computed::new(vec![self.as_observable()], move || source.with(&f))
    }

    /// Type-erased handle for use as a `Computed` dependency.
    pub fn as_observable(&self) -> Arc<dyn Observable> {
        Arc::new(self.clone())
    }

    /// Wait until the version differs from `seen`, returning the new version.
    ///
    /// Returns immediately if a write already happened after `seen`.
    pub async fn changed_since(&self, seen: u64) -> u64 {
        loop {
            let mut notified = pin!(self.inner.notify.notified());
            notified.as_mut().enable();

            let current = self.version();
            if current != seen {
                return current;
            }
            notified.await;
        }
    }

    /// Wait until `predicate` holds for the current value, then return it.
    pub async fn wait_until(&self, predicate: impl Fn(&T) -> bool) -> T {
        loop {
            let seen = self.version();
            if self.with(&predicate) {
                return self.get();
            }
            self.changed_since(seen).await;
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Observable for Dynamic<T> {
    fn version(&self) -> u64 {
        Dynamic::version(self)
    }
}

impl<T: Clone + Send + Sync + 'static> Source<T> for Dynamic<T> {
    fn get(&self) -> T {
        Dynamic::get(self)
    }
}

impl<T: Clone + Send + Sync + Default + 'static> Default for Dynamic<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + Send + Sync + std::fmt::Debug + 'static> std::fmt::Debug for Dynamic<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dynamic")
            .field("value", &self.get())
            .field("version", &self.version())
            .finish()
    }
}

/// A poll-based subscription to a `Dynamic` value.
///
/// Updates coalesce: several writes between two polls yield one value, the
/// latest.
pub struct Subscription<T> {
    source: Dynamic<T>,
    last_version: u64,
}

impl<T: Clone + Send + Sync + 'static> Subscription<T> {
    /// Check if the source has changed since the last poll.
    pub fn has_changed(&self) -> bool {
        self.source.version() != self.last_version
    }

    /// Return the new value if the source was written since the last poll.
    pub fn poll(&mut self) -> Option<T> {
        let current_version = self.source.version();
        if current_version != self.last_version {
            self.last_version = current_version;
            Some(self.source.get())
        } else {
            None
        }
    }

    /// Wait for the next write and return the value it produced.
    pub async fn changed(&mut self) -> T {
        self.last_version = self.source.changed_since(self.last_version).await;
        self.source.get()
    }

    /// Get the current value regardless of whether it changed.
    pub fn get(&self) -> T {
        self.source.get()
    }

    /// Get the last version this subscription observed.
    pub fn last_observed_version(&self) -> u64 {
        self.last_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_set_bumps_version() {
        let d = Dynamic::new(0);
        assert_eq!(d.version(), 0);

        d.set(1);
        d.set(1);
        assert_eq!(d.get(), 1);
        assert_eq!(d.version(), 2);
    }

    #[test]
    fn test_set_if_changed_skips_equal_values() {
        let d = Dynamic::new(false);
        assert!(!d.set_if_changed(false));
        assert_eq!(d.version(), 0);

        assert!(d.set_if_changed(true));
        assert_eq!(d.version(), 1);
    }

    #[test]
    fn test_modify_in_place() {
        let d = Dynamic::new(vec!["a"]);
        let len = d.modify(|v| {
            v.push("b");
            v.len()
        });
        assert_eq!(len, 2);
        assert_eq!(d.get(), vec!["a", "b"]);
        assert_eq!(d.version(), 1);
    }

    #[test]
    fn test_dynamic_clone_shares_state() {
        let d1 = Dynamic::new(0);
        let d2 = d1.clone();

        d1.set(42);
        assert_eq!(d2.get(), 42);
        assert_eq!(d2.version(), 1);
    }

    #[test]
    fn test_subscription_coalesces_updates() {
        let d = Dynamic::new(0);
        let mut sub = d.subscribe();
        assert_eq!(sub.poll(), None);

        d.set(1);
        d.set(2);
        d.set(3);

        assert!(sub.has_changed());
        assert_eq!(sub.poll(), Some(3));
        assert_eq!(sub.poll(), None);
    }

    #[test]
    fn test_map_recomputes_lazily() {
        let source = Dynamic::new(5);
        let doubled = source.map(|x| x * 2);
        assert_eq!(doubled.get(), 10);

        source.set(10);
        assert_eq!(doubled.get(), 20);
    }

    #[tokio::test]
    async fn test_changed_since_returns_immediately_when_stale() {
        let d = Dynamic::new(0);
        d.set(7);
        assert_eq!(d.changed_since(0).await, 1);
    }

    #[tokio::test]
    async fn test_wait_until_wakes_on_write() {
        let d = Dynamic::new(false);
        let writer = d.clone();

        let handle = tokio::spawn(async move { writer.set(true) });
        let value = d.wait_until(|ready| *ready).await;

        assert!(value);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_subscription_changed_awaits_next_write() {
        let d = Dynamic::new(1);
        let mut sub = d.subscribe();
        let writer = d.clone();

        tokio::spawn(async move { writer.set(2) });
        assert_eq!(sub.changed().await, 2);
        assert!(!sub.has_changed());
    }
}
