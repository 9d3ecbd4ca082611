//! Route definitions for the `/requests` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::request;
use crate::state::AppState;

/// Routes mounted at `/requests`.
///
/// ```text
/// GET    /        -> list_requests
/// POST   /        -> create_request
/// GET    /{id}    -> get_request
/// PATCH  /{id}    -> update_request
/// DELETE /{id}    -> delete_request
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(request::list_requests).post(request::create_request),
        )
        .route(
            "/{id}",
            get(request::get_request)
                .patch(request::update_request)
                .delete(request::delete_request),
        )
}
