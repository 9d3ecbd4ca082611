use std::sync::Arc;

use axum::extract::ws::Message;
use skillswap_core::notification::NotificationPayload;
use skillswap_core::types::DbId;

use crate::ws::SessionRegistry;

/// Why a notification did not reach its recipient.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("user {0} has no live connection")]
    Offline(DbId),

    #[error("connection for user {0} is closed")]
    ChannelClosed(DbId),

    #[error("failed to encode notification: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Pushes notification frames onto a user's registered socket.
///
/// Delivery is fire-and-forget: the frame is queued on the connection's
/// channel and nothing waits for the client. Every failure is logged here
/// before it is returned, so callers may drop the result.
#[derive(Clone)]
pub struct NotificationDispatcher {
    sessions: Arc<SessionRegistry>,
}

impl NotificationDispatcher {
    pub fn new(sessions: Arc<SessionRegistry>) -> Self {
        Self { sessions }
    }

    pub async fn notify_user(
        &self,
        user_id: DbId,
        payload: &NotificationPayload,
    ) -> Result<(), DispatchError> {
        let result = self.try_notify(user_id, payload).await;
        match &result {
            Ok(()) => {
                tracing::debug!(user_id = %user_id, kind = ?payload.kind, "Notification queued");
            }
            Err(err @ DispatchError::Offline(_)) => {
                tracing::debug!(error = %err, "Notification dropped");
            }
            Err(err) => {
                tracing::warn!(error = %err, "Notification dropped");
            }
        }
        result
    }

    async fn try_notify(
        &self,
        user_id: DbId,
        payload: &NotificationPayload,
    ) -> Result<(), DispatchError> {
        let sender = self
            .sessions
            .sender_for(user_id)
            .await
            .ok_or(DispatchError::Offline(user_id))?;
        let text = serde_json::to_string(&payload.frame())?;
        sender
            .send(Message::Text(text.into()))
            .map_err(|_| DispatchError::ChannelClosed(user_id))
    }
}
