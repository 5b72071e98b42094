//! Session facade
//!
//! `FermentApi` is what a frontend holds for the lifetime of a session. Feed
//! and profile accessors construct the profile store on first use; write
//! actions go through the publisher; blob ingestion goes through the bridge.

use std::sync::Arc;

use ferment_core::{FermentConfig, Identity, MessageId, Result};

use crate::actions::{ActionMessage, ActionPublisher};
use crate::blobs::{AddBlobRequest, AddBlobResponse, BlobGateway, BlobSource};
use crate::bridge::{BridgeTransport, CallId};
use crate::feeds::{FeedService, ResolvedFeed};
use crate::init::StoreInitializer;
use crate::log::LogClient;
use crate::profile::{PostHandle, Profile};
use crate::readiness::ReadinessGate;
use crate::store::{ProfileStore, StoreFactory};

/// One user session over a log client and a lazily built profile store.
pub struct FermentApi {
    log: Arc<dyn LogClient>,
    init: Arc<StoreInitializer>,
    publisher: ActionPublisher,
    blobs: BlobGateway,
}

impl FermentApi {
    /// Create a session. The session start time seeds bridge call ids.
    pub fn new(
        log: Arc<dyn LogClient>,
        config: FermentConfig,
        factory: Arc<dyn StoreFactory>,
        blob_transport: Arc<dyn BridgeTransport<AddBlobRequest>>,
    ) -> Self {
        let session_start_ms = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        Self::with_session_start(log, config, factory, blob_transport, session_start_ms)
    }

    /// Create a session with an explicit start time.
    pub fn with_session_start(
        log: Arc<dyn LogClient>,
        config: FermentConfig,
        factory: Arc<dyn StoreFactory>,
        blob_transport: Arc<dyn BridgeTransport<AddBlobRequest>>,
        session_start_ms: u64,
    ) -> Self {
        let blobs = BlobGateway::new(
            blob_transport,
            session_start_ms,
            &config.bridge,
            config.blobs_port,
        );
        let init = Arc::new(StoreInitializer::new(log.clone(), config, factory));
        let publisher = ActionPublisher::new(log.clone(), init.clone());
        tracing::debug!(id = %log.id(), session_start_ms, "session created");
        Self {
            log,
            init,
            publisher,
            blobs,
        }
    }

    /// Own identity.
    pub fn id(&self) -> &Identity {
        self.log.id()
    }

    /// Readiness gate; may be held before any accessor runs.
    pub fn profiles_loaded(&self) -> Arc<ReadinessGate> {
        self.init.gate()
    }

    /// Store, constructed on first call.
    pub fn store(&self) -> Result<Arc<dyn ProfileStore>> {
        self.init.ensure_store()
    }

    /// Construct the store if needed and wait for its initial sync.
    pub async fn ready(&self) -> Result<Arc<dyn ProfileStore>> {
        self.init.ready().await
    }

    /// Run `callback` once the store is synced. See
    /// [`StoreInitializer::on_ready`].
    pub fn on_ready<F>(&self, callback: F) -> Result<()>
    where
        F: FnOnce(Arc<dyn ProfileStore>) + Send + 'static,
    {
        self.init.on_ready(callback)
    }

    fn feeds(&self) -> Result<FeedService> {
        let store = self.init.ensure_store()?;
        Ok(FeedService::new(store, self.id().clone(), self.init.gate()))
    }

    /// Recent posts from pubs and their friends.
    pub fn discovery_feed(&self) -> Result<ResolvedFeed> {
        Ok(self.feeds()?.discovery_feed())
    }

    /// Recent posts from everyone the own identity follows.
    pub fn following_feed(&self) -> Result<ResolvedFeed> {
        Ok(self.feeds()?.following_feed())
    }

    /// Posts by `id`, newest first.
    pub fn profile_feed(&self, id: &Identity) -> Result<ResolvedFeed> {
        Ok(self.feeds()?.profile_feed(id))
    }

    /// Posts liked by `id`.
    pub fn liked_feed_for(&self, id: &Identity) -> Result<ResolvedFeed> {
        Ok(self.feeds()?.liked_feed(id))
    }

    /// Profile of `id`.
    pub fn profile(&self, id: &Identity) -> Result<Profile> {
        Ok(self.store()?.get(id))
    }

    /// Own profile.
    pub fn own_profile(&self) -> Result<Profile> {
        self.profile(self.id())
    }

    /// Rank `ids` by the store's relevance, keeping at most `max`.
    pub fn rank_profile_ids(&self, ids: &[Identity], max: usize) -> Result<Vec<Identity>> {
        Ok(self.store()?.rank_profile_ids(ids, max))
    }

    /// Up to `max` suggested profiles.
    pub fn suggested_profiles(&self, max: usize) -> Result<Vec<Identity>> {
        Ok(self.store()?.suggested(max))
    }

    /// Resolve one post.
    pub fn post(&self, id: &MessageId) -> Result<Option<PostHandle>> {
        Ok(self.store()?.get_post(id))
    }

    /// Write actions.
    pub fn actions(&self) -> &ActionPublisher {
        &self.publisher
    }

    /// Append an arbitrary action message.
    pub async fn publish(&self, message: ActionMessage) -> Result<MessageId> {
        self.publisher.publish(message).await
    }

    /// Store a blob through the blob helper.
    pub async fn add_blob(&self, source: BlobSource) -> Result<String> {
        self.blobs.add_blob(source).await
    }

    /// Route a response from the blob helper back to its caller.
    pub fn deliver_blob_response(&self, call_id: &CallId, response: AddBlobResponse) -> bool {
        self.blobs.deliver(call_id, response)
    }

    /// Local URL of blob `id`.
    pub fn blob_url(&self, id: &str) -> String {
        self.blobs.blob_url(id)
    }

    /// Blob gateway.
    pub fn blobs(&self) -> &BlobGateway {
        &self.blobs
    }
}

impl std::fmt::Debug for FermentApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FermentApi")
            .field("id", self.log.id())
            .field("init", &self.init)
            .field("blobs", &self.blobs)
            .finish()
    }
}
