//! Handler for manually pushing a notification to a connected user.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use skillswap_core::error::CoreError;
use skillswap_core::notification::{NotificationPayload, NotificationType};
use skillswap_core::types::parse_id;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// Body of `POST /notifications/test`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TestNotificationBody {
    pub recipient_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    #[validate(length(min = 1, message = "skillName must not be empty"))]
    pub skill_name: String,
    #[validate(length(min = 1, message = "sender must not be empty"))]
    pub sender: String,
}

/// POST /api/v1/notifications/test
///
/// Admin only. Delivery failure is reported in the body as
/// `delivered: false`, never as an error status.
pub async fn send_test_notification(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    payload: Result<Json<TestNotificationBody>, JsonRejection>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let Json(body) = payload?;
    body.validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;
    let recipient_id = parse_id(&body.recipient_id).ok_or_else(|| {
        AppError::Core(CoreError::Validation(
            "recipientId must be a valid identifier".into(),
        ))
    })?;

    let payload = NotificationPayload::new(body.kind, body.skill_name, body.sender);
    let delivered = state
        .dispatcher()
        .notify_user(recipient_id, &payload)
        .await
        .is_ok();
    tracing::info!(
        admin_id = %admin.user_id,
        recipient_id = %recipient_id,
        delivered,
        "Test notification sent"
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Notification sent",
            "recipientId": recipient_id,
            "payload": payload,
            "delivered": delivered,
        })),
    ))
}
