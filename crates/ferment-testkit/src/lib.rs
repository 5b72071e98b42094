//! Ferment Testkit - Shared Test Doubles
//!
//! In-memory implementations of the store, log client and bridge transport,
//! plus fixtures wiring them into a [`FermentApi`] session.
//!
//! # Example
//!
//! ```ignore
//! use ferment_testkit::TestSession;
//!
//! let session = TestSession::synced("@me");
//! let bob = session.identity("@bob");
//! session.store.add_post(&bob, "%b1", 10);
//! session.store.follow(session.api.id(), &bob);
//!
//! let feed = session.api.following_feed()?;
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

pub mod log;
pub mod store;
pub mod transport;

use std::sync::Arc;

use ferment_core::{FermentConfig, Identity};
use ferment_social::{AddBlobRequest, FermentApi};

pub use log::MemoryLogClient;
pub use store::{id_set, MemoryProfileStore, MemoryStoreFactory};
pub use transport::RecordingTransport;

/// Session start used by fixtures, so call ids are predictable.
pub const TEST_SESSION_START_MS: u64 = 1_700_000_000_000;

/// Install a test-friendly tracing subscriber. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("ferment_core=debug,ferment_social=debug")
        .try_init();
}

/// A session over in-memory doubles, with handles to each of them.
pub struct TestSession {
    /// Facade under test
    pub api: FermentApi,
    /// Backing store
    pub store: Arc<MemoryProfileStore>,
    /// Log client the session publishes to
    pub log: Arc<MemoryLogClient>,
    /// Factory counting store constructions
    pub factory: Arc<MemoryStoreFactory>,
    /// Blob bridge transport
    pub transport: Arc<RecordingTransport<AddBlobRequest>>,
}

impl TestSession {
    /// Session for `own_id` over a store that has not synced yet.
    pub fn new(own_id: &str) -> Self {
        Self::with_config(own_id, MemoryProfileStore::new(), FermentConfig::default())
    }

    /// Session for `own_id` over an already synced store.
    pub fn synced(own_id: &str) -> Self {
        Self::with_config(own_id, MemoryProfileStore::synced(), FermentConfig::default())
    }

    /// Session with explicit store and configuration.
    pub fn with_config(own_id: &str, store: MemoryProfileStore, config: FermentConfig) -> Self {
        init_test_tracing();
        let store = Arc::new(store);
        let log = Arc::new(MemoryLogClient::new(own_id));
        log.ingest_into(store.clone());
        let factory = Arc::new(MemoryStoreFactory::new(store.clone()));
        let transport = Arc::new(RecordingTransport::new());
        let api = FermentApi::with_session_start(
            log.clone(),
            config,
            factory.clone(),
            transport.clone(),
            TEST_SESSION_START_MS,
        );
        Self {
            api,
            store,
            log,
            factory,
            transport,
        }
    }

    /// Identity handle for `name`.
    pub fn identity(&self, name: &str) -> Identity {
        Identity::from(name)
    }
}
