//! Readiness gate for the profile store
//!
//! The gate starts unset. The first successful store construction attaches
//! the store's sync signal; after that the gate reports ready once the signal
//! is `true`. Consumers may grab the gate before the store exists and still
//! observe the transition. Once ready, the gate stays ready for the rest of the
//! session even if the store later reports itself busy.

use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};

use ferment_core::Dynamic;
use once_cell::sync::OnceCell;
use tokio::sync::Notify;

/// Single-assignment, asynchronously resolved readiness signal.
#[derive(Default)]
pub struct ReadinessGate {
    signal: OnceCell<Dynamic<bool>>,
    attached: Notify,
    latched: AtomicBool,
}

impl ReadinessGate {
    /// Create an unset gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the store's sync signal. Only the first call has an effect.
    ///
    /// Returns `true` if this call attached the signal.
    pub fn attach(&self, signal: Dynamic<bool>) -> bool {
        if self.signal.set(signal).is_err() {
            return false;
        }
        tracing::debug!("profile store sync signal attached to readiness gate");
        self.attached.notify_waiters();
        true
    }

    /// Whether a store has been attached yet.
    pub fn is_attached(&self) -> bool {
        self.signal.get().is_some()
    }

    /// Whether the store has finished its initial sync.
    pub fn is_ready(&self) -> bool {
        if self.latched.load(Ordering::Acquire) {
            return true;
        }
        match self.signal.get() {
            Some(signal) if signal.get() => {
                self.latch();
                true
            }
            _ => false,
        }
    }

    /// Wait until the store is attached and synced.
    ///
    /// Does not trigger store construction; see
    /// [`StoreInitializer::ready`](crate::init::StoreInitializer::ready).
    pub async fn wait_ready(&self) {
        if self.is_ready() {
            return;
        }
        let signal = self.wait_attached().await;
        signal.wait_until(|synced| *synced).await;
        self.latch();
    }

    async fn wait_attached(&self) -> Dynamic<bool> {
        loop {
            let mut notified = pin!(self.attached.notified());
            notified.as_mut().enable();

            if let Some(signal) = self.signal.get() {
                return signal.clone();
            }
            notified.await;
        }
    }

    fn latch(&self) {
        if !self.latched.swap(true, Ordering::AcqRel) {
            tracing::info!("profile store ready");
        }
    }
}

impl std::fmt::Debug for ReadinessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadinessGate")
            .field("attached", &self.is_attached())
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_unset_gate_is_not_ready() {
        let gate = ReadinessGate::new();
        assert!(!gate.is_attached());
        assert!(!gate.is_ready());
    }

    #[test]
    fn test_attach_only_once() {
        let gate = ReadinessGate::new();
        let first = Dynamic::new(false);
        let second = Dynamic::new(true);

        assert!(gate.attach(first.clone()));
        assert!(!gate.attach(second));
        assert!(!gate.is_ready());

        first.set(true);
        assert!(gate.is_ready());
    }

    #[test]
    fn test_ready_never_regresses() {
        let gate = ReadinessGate::new();
        let sync = Dynamic::new(true);
        gate.attach(sync.clone());
        assert!(gate.is_ready());

        sync.set(false);
        assert!(gate.is_ready());
    }

    #[tokio::test]
    async fn test_waiter_registered_before_attach_observes_transition() {
        let gate = Arc::new(ReadinessGate::new());
        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.wait_ready().await })
        };
        tokio::task::yield_now().await;

        let sync = Dynamic::new(false);
        gate.attach(sync.clone());
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        sync.set(true);
        waiter.await.unwrap();
        assert!(gate.is_ready());
    }
}
