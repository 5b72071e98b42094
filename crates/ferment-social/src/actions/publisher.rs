//! Action publisher
//!
//! Builds messages for user actions and submits them to the log client.
//! Builders are pure; the only suspension points are waiting for store
//! readiness (follow only) and the log client's append.

use std::sync::Arc;

use ferment_core::{Identity, MessageId, Result};

use super::messages::{ActionMessage, LinkKind};
use crate::init::StoreInitializer;
use crate::log::LogClient;

/// Completion callback for [`ActionPublisher::submit`].
pub type PublishCallback = Box<dyn FnOnce(Result<MessageId>) + Send + 'static>;

/// Turns user actions into log messages.
#[derive(Clone)]
pub struct ActionPublisher {
    log: Arc<dyn LogClient>,
    init: Arc<StoreInitializer>,
    scope: Option<String>,
}

impl ActionPublisher {
    /// Create a publisher. The follow scope is read from the initializer's
    /// configuration.
    pub fn new(log: Arc<dyn LogClient>, init: Arc<StoreInitializer>) -> Self {
        let scope = init.config().friends.scope.clone();
        Self { log, init, scope }
    }

    /// Scope stamped onto follow messages.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Append `message` to the log. Errors are returned as the log client
    /// reported them.
    pub async fn publish(&self, message: ActionMessage) -> Result<MessageId> {
        let kind = message.type_name();
        match self.log.publish(message).await {
            Ok(id) => {
                tracing::debug!(kind, id = %id, "published message");
                Ok(id)
            }
            Err(err) => {
                tracing::warn!(kind, error = %err, "publish failed");
                Err(err)
            }
        }
    }

    /// Append `message` and hand the outcome to `callback`.
    ///
    /// # Panics
    ///
    /// Panics when no callback was given and the append failed.
    pub async fn submit(&self, message: ActionMessage, callback: Option<PublishCallback>) {
        let kind = message.type_name();
        let result = self.publish(message).await;
        match (callback, result) {
            (Some(callback), result) => callback(result),
            (None, Err(err)) => {
                tracing::error!(kind, error = %err, "unhandled publish failure");
                panic!("unhandled publish failure for {kind}: {err}");
            }
            (None, Ok(_)) => {}
        }
    }

    /// Build the follow message for `id`.
    ///
    /// Waits for the store to finish its initial sync so the pub marker reflects
    /// synced data.
    pub async fn follow_message(&self, id: &Identity) -> Result<ActionMessage> {
        let store = self.init.ready().await?;
        let is_pub = store.get(id).is_pub();
        Ok(ActionMessage::follow(id.clone(), self.scope.clone(), is_pub))
    }

    /// Follow `id`.
    pub async fn follow(&self, id: &Identity) -> Result<MessageId> {
        let message = self.follow_message(id).await?;
        self.publish(message).await
    }

    /// Unfollow `id`.
    pub async fn unfollow(&self, id: &Identity) -> Result<MessageId> {
        self.publish(ActionMessage::unfollow(id.clone())).await
    }

    /// Like post `id`.
    pub async fn like(&self, id: &MessageId) -> Result<MessageId> {
        self.toggle(LinkKind::Like, id, true).await
    }

    /// Clear a like on post `id`.
    pub async fn unlike(&self, id: &MessageId) -> Result<MessageId> {
        self.toggle(LinkKind::Like, id, false).await
    }

    /// Repost post `id`.
    pub async fn repost(&self, id: &MessageId) -> Result<MessageId> {
        self.toggle(LinkKind::Repost, id, true).await
    }

    /// Clear a repost of post `id`.
    pub async fn unrepost(&self, id: &MessageId) -> Result<MessageId> {
        self.toggle(LinkKind::Repost, id, false).await
    }

    /// Assert the own display name.
    pub async fn set_own_display_name(&self, name: &str) -> Result<MessageId> {
        let message = ActionMessage::display_name(self.log.id().clone(), name);
        self.publish(message).await
    }

    async fn toggle(&self, kind: LinkKind, id: &MessageId, value: bool) -> Result<MessageId> {
        self.publish(ActionMessage::link_toggle(kind, id.clone(), value)).await
    }
}

impl std::fmt::Debug for ActionPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionPublisher")
            .field("id", self.log.id())
            .field("scope", &self.scope)
            .finish()
    }
}
