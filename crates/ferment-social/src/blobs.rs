//! Blob ingestion and URLs
//!
//! Blobs are stored by a helper on the other side of a process boundary.
//! `add_blob` goes out over the correlation bridge; reading a blob goes
//! through the local blob HTTP server.

use std::path::PathBuf;
use std::sync::Arc;

use ferment_core::{BridgeConfig, FermentError, Result};
use serde::{Deserialize, Serialize};

use crate::bridge::{BridgeTransport, CallId, CorrelationBridge};

/// Prefix some blob ids carry to mark the local blob store.
pub const BLOBSTORE_PREFIX: &str = "blobstore:";

/// What to ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlobSource {
    /// Raw bytes
    Data(Vec<u8>),
    /// A file on disk
    Path(PathBuf),
}

/// Request sent across the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddBlobRequest {
    /// Blob content or location
    pub source: BlobSource,
}

/// Remote outcome: the stored blob id, or the remote error message.
pub type AddBlobResponse = std::result::Result<String, String>;

/// Bridge specialised for blob ingestion.
pub type BlobBridge = CorrelationBridge<AddBlobRequest, AddBlobResponse>;

/// Blob operations for a session.
#[derive(Debug)]
pub struct BlobGateway {
    bridge: BlobBridge,
    blobs_port: u16,
}

impl BlobGateway {
    /// Create a gateway over `transport`.
    pub fn new(
        transport: Arc<dyn BridgeTransport<AddBlobRequest>>,
        session_start_ms: u64,
        bridge: &BridgeConfig,
        blobs_port: u16,
    ) -> Self {
        Self {
            bridge: CorrelationBridge::new(transport, session_start_ms, bridge.response_timeout()),
            blobs_port,
        }
    }

    /// Store a blob and return its id.
    pub async fn add_blob(&self, source: BlobSource) -> Result<String> {
        match self.bridge.call(AddBlobRequest { source }).await? {
            Ok(blob_id) => {
                tracing::debug!(blob_id = %blob_id, "blob stored");
                Ok(blob_id)
            }
            Err(remote) => Err(FermentError::bridge(format!("add-blob failed: {remote}"))),
        }
    }

    /// Route a response from the blob helper. See
    /// [`CorrelationBridge::deliver`].
    pub fn deliver(&self, call_id: &CallId, response: AddBlobResponse) -> bool {
        self.bridge.deliver(call_id, response)
    }

    /// URL of blob `id` on the local blob server.
    pub fn blob_url(&self, id: &str) -> String {
        blob_url(self.blobs_port, id)
    }

    /// Underlying bridge.
    pub fn bridge(&self) -> &BlobBridge {
        &self.bridge
    }
}

/// URL of blob `id` served on `localhost:port`.
pub fn blob_url(port: u16, id: &str) -> String {
    let id = id.strip_prefix(BLOBSTORE_PREFIX).unwrap_or(id);
    format!("http://localhost:{port}/{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_url_strips_store_prefix() {
        assert_eq!(blob_url(7777, "blobstore:abc"), "http://localhost:7777/abc");
        assert_eq!(blob_url(7777, "abc"), "http://localhost:7777/abc");
    }

    #[test]
    fn test_request_wire_shape() {
        let request = AddBlobRequest {
            source: BlobSource::Path(PathBuf::from("/tmp/song.ogg")),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"source": {"path": "/tmp/song.ogg"}}));
    }
}
