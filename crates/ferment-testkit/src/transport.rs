//! Bridge transport that records outgoing calls

use ferment_core::{FermentError, Result};
use ferment_social::{BridgeTransport, CallId};
use parking_lot::Mutex;

/// Keeps every sent request so tests can answer them out of band.
pub struct RecordingTransport<Req> {
    sent: Mutex<Vec<(CallId, Req)>>,
    closed: Mutex<bool>,
}

impl<Req> Default for RecordingTransport<Req> {
    fn default() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            closed: Mutex::new(false),
        }
    }
}

impl<Req: Clone> RecordingTransport<Req> {
    /// Open transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse all further sends.
    pub fn close(&self) {
        *self.closed.lock() = true;
    }

    /// Ids of all sent calls, in send order.
    pub fn sent_ids(&self) -> Vec<CallId> {
        self.sent.lock().iter().map(|(id, _)| id.clone()).collect()
    }

    /// All sent calls, in send order.
    pub fn sent(&self) -> Vec<(CallId, Req)> {
        self.sent.lock().clone()
    }
}

impl<Req: Send> BridgeTransport<Req> for RecordingTransport<Req> {
    fn send(&self, call_id: &CallId, request: Req) -> Result<()> {
        if *self.closed.lock() {
            return Err(FermentError::bridge("transport closed"));
        }
        self.sent.lock().push((call_id.clone(), request));
        Ok(())
    }
}
