//! Lazy profile store initialization
//!
//! Building the profile store is expensive, so nothing constructs it until a
//! feed, profile or follow accessor first needs it. The store lives in a
//! single-assignment cell: concurrent first accesses still construct exactly
//! once, and every later access returns the same instance.

use std::sync::Arc;

use ferment_core::{FermentConfig, FermentError, Result};
use once_cell::sync::OnceCell;

use crate::log::LogClient;
use crate::readiness::ReadinessGate;
use crate::store::{ProfileStore, StoreFactory};

/// Constructs the profile store on first access and owns the readiness gate.
pub struct StoreInitializer {
    log: Arc<dyn LogClient>,
    config: FermentConfig,
    factory: Arc<dyn StoreFactory>,
    store: OnceCell<Arc<dyn ProfileStore>>,
    gate: Arc<ReadinessGate>,
}

impl StoreInitializer {
    /// Create an initializer. Does not construct the store.
    pub fn new(
        log: Arc<dyn LogClient>,
        config: FermentConfig,
        factory: Arc<dyn StoreFactory>,
    ) -> Self {
        Self {
            log,
            config,
            factory,
            store: OnceCell::new(),
            gate: Arc::new(ReadinessGate::new()),
        }
    }

    /// Return the store, constructing it on the very first call.
    ///
    /// A failed construction is returned to the caller and leaves the cell
    /// empty, so a later access retries.
    pub fn ensure_store(&self) -> Result<Arc<dyn ProfileStore>> {
        let store = self.store.get_or_try_init(|| {
            tracing::debug!(id = %self.log.id(), "constructing profile store");
            let store = self.factory.open(self.log.clone(), &self.config)?;
            self.gate.attach(store.sync());
            Ok::<_, ferment_core::FermentError>(store)
        })?;
        Ok(store.clone())
    }

    /// The store if it has already been constructed.
    pub fn try_store(&self) -> Option<Arc<dyn ProfileStore>> {
        self.store.get().cloned()
    }

    /// Readiness gate. Safe to hold before the store exists.
    pub fn gate(&self) -> Arc<ReadinessGate> {
        self.gate.clone()
    }

    /// Session configuration the store was (or will be) built with.
    pub fn config(&self) -> &FermentConfig {
        &self.config
    }

    /// Construct the store if needed and wait for its initial sync.
    pub async fn ready(&self) -> Result<Arc<dyn ProfileStore>> {
        let store = self.ensure_store()?;
        self.gate.wait_ready().await;
        Ok(store)
    }

    /// Run `callback` once the store is synced.
    ///
    /// If the store is already synced the callback runs immediately on the
    /// calling task. Otherwise a task is spawned that runs it exactly once
    /// when sync first becomes true. Deferring needs a tokio runtime; without
    /// one an internal error is returned and the callback is dropped.
    pub fn on_ready<F>(&self, callback: F) -> Result<()>
    where
        F: FnOnce(Arc<dyn ProfileStore>) + Send + 'static,
    {
        let store = self.ensure_store()?;
        if self.gate.is_ready() {
            callback(store);
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            FermentError::internal(format!("cannot defer on_ready callback: {e}"))
        })?;
        let gate = self.gate.clone();
        runtime.spawn(async move {
            gate.wait_ready().await;
            callback(store);
        });
        Ok(())
    }
}

impl std::fmt::Debug for StoreInitializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreInitializer")
            .field("constructed", &self.store.get().is_some())
            .field("gate", &self.gate)
            .finish()
    }
}
