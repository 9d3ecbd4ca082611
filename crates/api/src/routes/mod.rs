pub mod health;
pub mod notification;
pub mod request;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws                       WebSocket (token in query)
///
/// /requests                 list, create
/// /requests/{id}            get, update (PATCH), delete
///
/// /notifications/test       push a notification (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/requests", request::router())
        .nest("/notifications", notification::router())
}
