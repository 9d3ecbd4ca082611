use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use skillswap_core::roles::Role;
use skillswap_core::types::{DbId, Timestamp};
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// The live connection registered for one user.
pub struct Session {
    /// Identifies the socket that owns this entry.
    pub conn_id: String,
    /// Role from the verified handshake token.
    pub role: Role,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    pub connected_at: Timestamp,
}

impl Session {
    /// Whole seconds since the handshake completed.
    fn age_secs(&self) -> i64 {
        (chrono::Utc::now() - self.connected_at).num_seconds()
    }
}

/// Maps each authenticated user to at most one live connection.
///
/// Entries are added only after the handshake guard has verified a token and
/// removed when that same connection goes away. A newer connection for a
/// user replaces the older entry.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<DbId, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register `conn_id` as the live connection for `user_id`.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn register(
        &self,
        user_id: DbId,
        role: Role,
        conn_id: String,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session {
            conn_id,
            role,
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        let previous = self.sessions.write().await.insert(user_id, session);
        if let Some(previous) = previous {
            tracing::debug!(
                user_id = %user_id,
                replaced_conn_id = %previous.conn_id,
                replaced_role = %previous.role,
                replaced_after_secs = previous.age_secs(),
                "Replaced existing session"
            );
        }
        rx
    }

    /// Remove the entry for `user_id` if it still belongs to `conn_id`.
    ///
    /// Returns `false` when a newer connection has taken over the slot.
    pub async fn unregister(&self, user_id: DbId, conn_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&user_id) {
            Some(session) if session.conn_id == conn_id => {
                tracing::debug!(
                    user_id = %user_id,
                    conn_id,
                    role = %session.role,
                    connected_secs = session.age_secs(),
                    "Session closed"
                );
                sessions.remove(&user_id);
                true
            }
            _ => false,
        }
    }

    /// The outbound channel of `user_id`'s live connection, if any.
    pub async fn sender_for(&self, user_id: DbId) -> Option<WsSender> {
        self.sessions
            .read()
            .await
            .get(&user_id)
            .map(|session| session.sender.clone())
    }

    pub async fn is_online(&self, user_id: DbId) -> bool {
        self.sessions.read().await.contains_key(&user_id)
    }

    /// Return the current number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    pub async fn shutdown_all(&self) {
        let mut sessions = self.sessions.write().await;
        let count = sessions.len();
        for session in sessions.values() {
            let _ = session.sender.send(Message::Close(None));
        }
        sessions.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every registered connection.
    pub async fn ping_all(&self) {
        let sessions = self.sessions.read().await;
        for session in sessions.values() {
            let _ = session.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
