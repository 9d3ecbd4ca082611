//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server is
//! involved.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use skillswap_api::error::AppError;
use skillswap_core::error::CoreError;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: each domain error maps to its status and code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn core_errors_map_to_statuses() {
    let cases = [
        (
            CoreError::NotFound("Request with id x not found".into()),
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
        ),
        (
            CoreError::Validation("offeredSkillId must not be empty".into()),
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
        ),
        (
            CoreError::BadRequest("Invalid action".into()),
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
        ),
        (
            CoreError::Conflict("stale proposal".into()),
            StatusCode::CONFLICT,
            "CONFLICT",
        ),
        (
            CoreError::Unauthorized("no token".into()),
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
        ),
        (
            CoreError::Forbidden("Access denied".into()),
            StatusCode::FORBIDDEN,
            "FORBIDDEN",
        ),
    ];

    for (err, status, code) in cases {
        let message = match &err {
            CoreError::NotFound(m)
            | CoreError::Validation(m)
            | CoreError::BadRequest(m)
            | CoreError::Conflict(m)
            | CoreError::Unauthorized(m)
            | CoreError::Forbidden(m)
            | CoreError::Internal(m) => m.clone(),
        };
        let (actual_status, json) = error_to_response(AppError::Core(err)).await;
        assert_eq!(actual_status, status);
        assert_eq!(json["code"], code);
        assert_eq!(json["error"], message);
    }
}

// ---------------------------------------------------------------------------
// Test: internal errors are sanitized
// ---------------------------------------------------------------------------

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::Core(CoreError::Internal("secret database credentials leaked".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert!(!json.to_string().contains("secret"));
    assert_eq!(json["error"], "An internal error occurred");
}

// ---------------------------------------------------------------------------
// Test: sqlx RowNotFound maps to 404, other sqlx errors to sanitized 500
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sqlx_errors_are_classified() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");

    let (status, json) = error_to_response(AppError::Database(sqlx::Error::PoolTimedOut)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}
