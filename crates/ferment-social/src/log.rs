//! Append-only log client boundary
//!
//! The log client signs, appends and replicates messages. Ferment only hands
//! it finished messages and reads back the resulting message id.

use async_trait::async_trait;
use ferment_core::{Identity, MessageId, Result};

use crate::actions::ActionMessage;

/// Client of the append-only message log.
#[async_trait]
pub trait LogClient: Send + Sync {
    /// Own identity; the author of every published message.
    fn id(&self) -> &Identity;

    /// Append `message` to the own feed.
    ///
    /// Failures (validation, signing, network) surface as
    /// `FermentError::Publish` and are forwarded unchanged to callers.
    async fn publish(&self, message: ActionMessage) -> Result<MessageId>;
}
