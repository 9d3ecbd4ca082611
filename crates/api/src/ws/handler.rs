use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use crate::auth::jwt::Claims;
use crate::state::AppState;
use crate::ws::guard::SocketAuth;
use crate::ws::registry::SessionRegistry;

/// Upgrade an authenticated handshake to a notification socket.
///
/// [`SocketAuth`] runs first, so a request without a valid token is answered
/// with 401 before any upgrade happens.
pub async fn ws_handler(
    SocketAuth(claims): SocketAuth,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, claims, state.sessions))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Registers the connection under the token's subject, forwards registry
/// messages to the sink on a spawned task, and drains inbound frames until
/// the client goes away.
async fn handle_socket(socket: WebSocket, claims: Claims, sessions: Arc<SessionRegistry>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let user_id = claims.sub;
    tracing::info!(
        conn_id = %conn_id,
        user_id = %user_id,
        role = %claims.role,
        "WebSocket connected"
    );

    let mut rx = sessions.register(user_id, claims.role, conn_id.clone()).await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Clients only listen; inbound frames other than Close are ignored.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    sessions.unregister(user_id, &conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, user_id = %user_id, "WebSocket disconnected");
}
