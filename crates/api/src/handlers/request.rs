//! Handlers for the `/requests` resource.
//!
//! All endpoints require authentication via [`AuthUser`]. Identifiers that
//! are not UUIDs resolve to 404. Bodies and queries that fail to deserialize
//! are rejected as [`AppError`] so they share the JSON error shape.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use skillswap_core::error::CoreError;
use skillswap_core::types::{parse_id, DbId};
use skillswap_db::models::request::{RequestPage, RequestResponse};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::services::request::{DeleteResponse, ListRequestsQuery, SKILL_NOT_FOUND};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /requests`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    #[serde(default)]
    #[validate(length(min = 1, message = "offeredSkillId must not be empty"))]
    pub offered_skill_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "requestedSkillId must not be empty"))]
    pub requested_skill_id: String,
}

/// Body of `PATCH /requests/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateRequestBody {
    #[serde(default)]
    pub action: Option<String>,
}

fn request_id(raw: &str) -> AppResult<DbId> {
    parse_id(raw).ok_or_else(|| AppError::not_found(format!("Request with id {raw} not found")))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/requests
pub async fn create_request(
    auth: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateRequestBody>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RequestResponse>)> {
    let Json(body) = payload?;
    body.validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let (Some(offered), Some(requested)) = (
        parse_id(&body.offered_skill_id),
        parse_id(&body.requested_skill_id),
    ) else {
        return Err(AppError::not_found(SKILL_NOT_FOUND));
    };

    let created = state
        .requests()
        .create(auth.user_id, offered, requested)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/requests
///
/// Query: `type` (`incoming` | `outgoing`), `status`, `isRead`, `page`, `limit`.
pub async fn list_requests(
    auth: AuthUser,
    State(state): State<AppState>,
    query: Result<Query<ListRequestsQuery>, QueryRejection>,
) -> AppResult<Json<RequestPage>> {
    let Query(query) = query?;
    let page = state.requests().find_all(auth.user_id, query).await?;
    Ok(Json(page))
}

/// GET /api/v1/requests/{id}
pub async fn get_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<RequestResponse>> {
    let id = request_id(&id)?;
    let request = state.requests().find_one(auth.user_id, id, auth.role).await?;
    Ok(Json(request))
}

/// PATCH /api/v1/requests/{id}
pub async fn update_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateRequestBody>, JsonRejection>,
) -> AppResult<Json<RequestResponse>> {
    let id = request_id(&id)?;
    let Json(body) = payload?;
    let action = body.action.unwrap_or_default();
    let request = state.requests().update(id, &action, &auth).await?;
    Ok(Json(request))
}

/// DELETE /api/v1/requests/{id}
pub async fn delete_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    let id = request_id(&id)?;
    let deleted = state.requests().remove(id, &auth).await?;
    Ok(Json(deleted))
}
