//! Background file-transfer status
//!
//! Mutable status record for one transfer, written by whatever drives the
//! transfer and read by the UI. The derived flags are `Computed` so they stay
//! in step with the cells they read.

use ferment_core::{Computed, Dynamic};

/// Live status of a file transfer identified by its info hash.
#[derive(Debug, Clone)]
pub struct TransferStatus {
    info_hash: String,
    /// Completion fraction, 0.0..=1.0
    pub progress: Dynamic<f64>,
    /// Bytes per second received
    pub download_speed: Dynamic<f64>,
    /// Bytes per second sent
    pub upload_speed: Dynamic<f64>,
    /// Connected peers
    pub num_peers: Dynamic<u32>,
    /// Bytes sent so far
    pub uploaded: Dynamic<u64>,
    /// Bytes received so far
    pub downloaded: Dynamic<u64>,
    /// Still resolving metadata
    pub loading: Dynamic<bool>,
    is_downloading: Computed<bool>,
    active: Computed<bool>,
    done: Computed<bool>,
}

impl TransferStatus {
    /// Fresh status: nothing transferred, still loading.
    pub fn new(info_hash: impl Into<String>) -> Self {
        let progress = Dynamic::new(0.0);
        let loading = Dynamic::new(true);
        Self {
            info_hash: info_hash.into(),
            is_downloading: progress.map(|p| *p < 1.0),
            done: progress.map(|p| *p >= 1.0),
            active: loading.map(|loading| !*loading),
            progress,
            download_speed: Dynamic::new(0.0),
            upload_speed: Dynamic::new(0.0),
            num_peers: Dynamic::new(0),
            uploaded: Dynamic::new(0),
            downloaded: Dynamic::new(0),
            loading,
        }
    }

    /// Info hash of the transfer.
    pub fn info_hash(&self) -> &str {
        &self.info_hash
    }

    /// Whether data is still arriving.
    pub fn is_downloading(&self) -> bool {
        self.is_downloading.get()
    }

    /// Whether metadata is resolved and the transfer is running.
    pub fn active(&self) -> bool {
        self.active.get()
    }

    /// Whether everything has been received. Always the opposite of
    /// `is_downloading`.
    pub fn done(&self) -> bool {
        self.done.get()
    }

    /// Reset speeds and peer count once the transfer stops.
    pub fn clear_rates(&self) {
        self.download_speed.set(0.0);
        self.upload_speed.set(0.0);
        self.num_peers.set(0);
    }
}
