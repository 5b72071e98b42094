//! Correlation bridge for cross-process calls
//!
//! Requests leave through a [`BridgeTransport`] tagged with a per-session call
//! id of the form `{session_start_ms}-{counter}`; responses come back through
//! [`CorrelationBridge::deliver`] and are routed to the matching waiter exactly
//! once. Responses for unknown ids are dropped.
//!
//! Pending entries are bounded in time: a waiter that hits the response
//! deadline, or is dropped before a response arrives, removes its entry.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ferment_core::{FermentError, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Per-session call identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(String);

impl CallId {
    /// Build the id for call number `seq` of the session started at
    /// `session_start_ms`.
    pub fn new(session_start_ms: u64, seq: u64) -> Self {
        Self(format!("{session_start_ms}-{seq}"))
    }

    /// Wrap an id received from the remote side.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// String form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outbound half of the process boundary.
pub trait BridgeTransport<Req>: Send + Sync {
    /// Send `request` tagged with `call_id` to the remote side.
    fn send(&self, call_id: &CallId, request: Req) -> Result<()>;
}

type PendingTable<Resp> = Arc<Mutex<HashMap<CallId, oneshot::Sender<Resp>>>>;

/// Matches responses back to the calls that caused them.
pub struct CorrelationBridge<Req, Resp> {
    session_start_ms: u64,
    seq: AtomicU64,
    pending: PendingTable<Resp>,
    transport: Arc<dyn BridgeTransport<Req>>,
    timeout: Duration,
}

impl<Req, Resp> CorrelationBridge<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    /// Create a bridge for a session that started at `session_start_ms`.
    pub fn new(
        transport: Arc<dyn BridgeTransport<Req>>,
        session_start_ms: u64,
        timeout: Duration,
    ) -> Self {
        Self {
            session_start_ms,
            seq: AtomicU64::new(0),
            pending: Arc::new(Mutex::new(HashMap::new())),
            transport,
            timeout,
        }
    }

    /// Session start used as the call id prefix.
    pub fn session_start_ms(&self) -> u64 {
        self.session_start_ms
    }

    /// Register a waiter and send `request`.
    ///
    /// If the transport refuses the request the entry is removed again and the
    /// transport error is returned.
    pub fn dispatch(&self, request: Req) -> Result<PendingCall<Resp>> {
        let call_id = CallId::new(
            self.session_start_ms,
            self.seq.fetch_add(1, Ordering::Relaxed),
        );
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(call_id.clone(), tx);

        let call = PendingCall {
            call_id: call_id.clone(),
            rx,
            pending: self.pending.clone(),
            timeout: self.timeout,
        };

        tracing::debug!(call_id = %call_id, "dispatching bridge call");
        self.transport.send(&call_id, request)?;
        Ok(call)
    }

    /// Dispatch `request` and wait for its response.
    pub async fn call(&self, request: Req) -> Result<Resp> {
        self.dispatch(request)?.wait().await
    }

    /// Route a response to its waiter.
    ///
    /// Returns `false` when no waiter is registered for `call_id` (already
    /// answered, timed out, or from a previous session).
    pub fn deliver(&self, call_id: &CallId, response: Resp) -> bool {
        let Some(tx) = self.pending.lock().remove(call_id) else {
            tracing::debug!(call_id = %call_id, "dropping response for unknown call");
            return false;
        };
        if tx.send(response).is_err() {
            tracing::debug!(call_id = %call_id, "waiter gone before response");
            return false;
        }
        true
    }

    /// Number of calls still waiting for a response.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

impl<Req, Resp> fmt::Debug for CorrelationBridge<Req, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrelationBridge")
            .field("session_start_ms", &self.session_start_ms)
            .field("next_seq", &self.seq.load(Ordering::Relaxed))
            .field("pending", &self.pending.lock().len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// A dispatched call waiting for its response.
///
/// Dropping it removes the pending entry.
pub struct PendingCall<Resp> {
    call_id: CallId,
    rx: oneshot::Receiver<Resp>,
    pending: PendingTable<Resp>,
    timeout: Duration,
}

impl<Resp> PendingCall<Resp> {
    /// Id the request was sent with.
    pub fn id(&self) -> &CallId {
        &self.call_id
    }

    /// Wait for the response, up to the bridge's deadline.
    pub async fn wait(mut self) -> Result<Resp> {
        match tokio::time::timeout(self.timeout, &mut self.rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(FermentError::bridge(format!(
                "call {} abandoned by bridge",
                self.call_id
            ))),
            Err(_) => {
                tracing::warn!(
                    call_id = %self.call_id,
                    timeout = ?self.timeout,
                    "bridge call timed out"
                );
                Err(FermentError::timeout(format!(
                    "no response for call {}",
                    self.call_id
                )))
            }
        }
    }
}

impl<Resp> Drop for PendingCall<Resp> {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.call_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Refusing;

    impl BridgeTransport<u32> for Refusing {
        fn send(&self, _call_id: &CallId, _request: u32) -> Result<()> {
            Err(FermentError::bridge("renderer closed"))
        }
    }

    struct Silent;

    impl BridgeTransport<u32> for Silent {
        fn send(&self, _call_id: &CallId, _request: u32) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_call_id_format() {
        assert_eq!(CallId::new(1700000000000, 3).as_str(), "1700000000000-3");
    }

    #[test]
    fn test_transport_failure_leaves_no_entry() {
        let bridge: CorrelationBridge<u32, u32> =
            CorrelationBridge::new(Arc::new(Refusing), 1, Duration::from_secs(1));
        assert!(bridge.dispatch(7).is_err());
        assert_eq!(bridge.pending_count(), 0);
    }

    #[test]
    fn test_unknown_response_is_dropped() {
        let bridge: CorrelationBridge<u32, u32> =
            CorrelationBridge::new(Arc::new(Silent), 1, Duration::from_secs(1));
        assert!(!bridge.deliver(&CallId::from_raw("0-99"), 5));
    }

    #[test]
    fn test_dropped_call_evicts_entry() {
        let bridge: CorrelationBridge<u32, u32> =
            CorrelationBridge::new(Arc::new(Silent), 1, Duration::from_secs(1));
        let call = bridge.dispatch(1).unwrap();
        let id = call.id().clone();
        assert_eq!(bridge.pending_count(), 1);

        drop(call);
        assert_eq!(bridge.pending_count(), 0);
        assert!(!bridge.deliver(&id, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_evicts_entry() {
        let bridge: CorrelationBridge<u32, u32> =
            CorrelationBridge::new(Arc::new(Silent), 1, Duration::from_millis(50));
        let err = bridge.call(1).await.unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(bridge.pending_count(), 0);
    }
}
