//! Computed<T> - A lazily re-derived value
//!
//! A `Computed` owns a *stamp* function that reports the versions of its
//! current inputs and a *compute* function that derives the value from them.
//! Nothing is recomputed on write; a read compares the stamp against the one
//! seen last time and re-runs `compute` only when it moved. The Computed's own
//! version increments on every stamp change, so it can in turn be an input to
//! another Computed.
//!
//! Static inputs use [`Computed::new`]. When the input set itself depends on
//! data (e.g. the posts of whoever is currently followed), use
//! [`Computed::with_stamp`] and report the versions of the inputs in use.

// Lock poisoning means compute() panicked; that is unrecoverable.
#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};

use super::{Observable, Source};

type StampFn = Box<dyn Fn() -> Vec<u64> + Send + Sync>;
type ComputeFn<T> = Box<dyn Fn() -> T + Send + Sync>;

struct ComputedState<T> {
    stamp: Option<Vec<u64>>,
    version: u64,
    value: Option<T>,
}

struct ComputedInner<T> {
    stamp: StampFn,
    compute: ComputeFn<T>,
    state: Mutex<ComputedState<T>>,
}

/// A derived value that recomputes on read when its inputs changed.
///
/// Clones share the cached value.
#[derive(Clone)]
pub struct Computed<T> {
    inner: Arc<ComputedInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> Computed<T> {
    /// Derive a value from a fixed set of inputs.
    pub fn new<F>(deps: Vec<Arc<dyn Observable>>, compute: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::with_stamp(move || deps.iter().map(|d| d.version()).collect(), compute)
    }

    /// Derive a value whose input set is itself data-dependent.
    ///
    /// `stamp` must change whenever any input in use changes. Returning the
    /// versions of every input currently read by `compute` satisfies that.
    pub fn with_stamp<S, F>(stamp: S, compute: F) -> Self
    where
        S: Fn() -> Vec<u64> + Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(ComputedInner {
                stamp: Box::new(stamp),
                compute: Box::new(compute),
                state: Mutex::new(ComputedState {
                    stamp: None,
                    version: 0,
                    value: None,
                }),
            }),
        }
    }

    /// A Computed that never changes.
    pub fn constant(value: T) -> Self {
        Self::with_stamp(Vec::new, move || value.clone())
    }

    /// Current version; advances whenever an input changed since the last
    /// call.
    pub fn version(&self) -> u64 {
        let mut state = self.inner.state.lock().expect("Computed lock poisoned");
        self.refresh(&mut state);
        state.version
    }

    /// Current value, recomputing first if any input changed.
    pub fn get(&self) -> T {
        let mut state = self.inner.state.lock().expect("Computed lock poisoned");
        self.refresh(&mut state);
        if let Some(value) = &state.value {
            return value.clone();
        }
        let value = (self.inner.compute)();
        state.value = Some(value.clone());
        value
    }

    /// Whether a read right now would recompute.
    pub fn is_stale(&self) -> bool {
        let state = self.inner.state.lock().expect("Computed lock poisoned");
        state.value.is_none() || state.stamp.as_ref() != Some(&(self.inner.stamp)())
    }

    /// Derive a further value from this one.
    pub fn map<U, F>(&self, f: F) -> Computed<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let source = self.clone();
        Computed::new(vec![self.as_observable()], move || f(source.get()))
    }

    /// Type-erased handle for use as a dependency.
    pub fn as_observable(&self) -> Arc<dyn Observable> {
        Arc::new(self.clone())
    }

    /// Poll-based subscription starting at the current version.
    pub fn subscribe(&self) -> ComputedSubscription<T> {
        ComputedSubscription {
            last_version: self.version(),
            source: self.clone(),
        }
    }

    fn refresh(&self, state: &mut ComputedState<T>) {
        let stamp = (self.inner.stamp)();
        if state.stamp.as_ref() != Some(&stamp) {
            state.stamp = Some(stamp);
            state.version += 1;
            state.value = None;
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Observable for Computed<T> {
    fn version(&self) -> u64 {
        Computed::version(self)
    }
}

impl<T: Clone + Send + Sync + 'static> Source<T> for Computed<T> {
    fn get(&self) -> T {
        Computed::get(self)
    }
}

impl<T: Clone + Send + Sync + std::fmt::Debug + 'static> std::fmt::Debug for Computed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Computed")
            .field("value", &self.get())
            .field("version", &self.version())
            .finish()
    }
}

/// Poll-based subscription to a `Computed`.
pub struct ComputedSubscription<T> {
    source: Computed<T>,
    last_version: u64,
}

impl<T: Clone + Send + Sync + 'static> ComputedSubscription<T> {
    /// Return the recomputed value if any input changed since the last poll.
    pub fn poll(&mut self) -> Option<T> {
        let current = self.source.version();
        if current != self.last_version {
            self.last_version = current;
            Some(self.source.get())
        } else {
            None
        }
    }

    /// Current value regardless of change.
    pub fn get(&self) -> T {
        self.source.get()
    }
}
