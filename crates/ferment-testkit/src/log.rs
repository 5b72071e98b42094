//! Recording log client

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ferment_core::{FermentError, Identity, MessageId, Result};
use ferment_social::{ActionMessage, LogClient};
use parking_lot::Mutex;

use crate::store::MemoryProfileStore;

/// Log client that keeps published messages in memory.
///
/// Optionally feeds every accepted message into a [`MemoryProfileStore`], so
/// published follows and likes show up in feeds.
pub struct MemoryLogClient {
    id: Identity,
    published: Mutex<Vec<ActionMessage>>,
    failures: Mutex<VecDeque<FermentError>>,
    seq: AtomicU64,
    store: Mutex<Option<Arc<MemoryProfileStore>>>,
}

impl MemoryLogClient {
    /// Client publishing as `id`.
    pub fn new(id: impl Into<Identity>) -> Self {
        Self {
            id: id.into(),
            published: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
            seq: AtomicU64::new(0),
            store: Mutex::new(None),
        }
    }

    /// Feed accepted messages into `store`.
    pub fn ingest_into(&self, store: Arc<MemoryProfileStore>) {
        *self.store.lock() = Some(store);
    }

    /// Reject the next publish with `error`.
    pub fn fail_next(&self, error: FermentError) {
        self.failures.lock().push_back(error);
    }

    /// Messages accepted so far, in order.
    pub fn published(&self) -> Vec<ActionMessage> {
        self.published.lock().clone()
    }

    /// Most recently accepted message.
    pub fn last(&self) -> Option<ActionMessage> {
        self.published.lock().last().cloned()
    }
}

#[async_trait]
impl LogClient for MemoryLogClient {
    fn id(&self) -> &Identity {
        &self.id
    }

    async fn publish(&self, message: ActionMessage) -> Result<MessageId> {
        if let Some(error) = self.failures.lock().pop_front() {
            return Err(error);
        }
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        let message_id = MessageId::new(format!("%{}-{seq}.sha256", self.id));
        if let Some(store) = self.store.lock().clone() {
            store.apply(&self.id, &message);
        }
        self.published.lock().push(message);
        Ok(message_id)
    }
}
