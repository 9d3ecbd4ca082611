//! Exchange request entity model, filters, and response shapes.

use serde::Serialize;
use skillswap_core::exchange::{RequestStatus, RequestType};
use skillswap_core::types::{DbId, Timestamp};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use super::decode_error;
use super::skill::Skill;
use super::user::{User, UserResponse};

/// A row from the `exchange_requests` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    pub id: DbId,
    pub sender_id: DbId,
    pub receiver_id: DbId,
    pub offered_skill_id: DbId,
    pub requested_skill_id: DbId,
    pub status: RequestStatus,
    pub is_read: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl<'r> FromRow<'r, PgRow> for ExchangeRequest {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(Self {
            id: row.try_get("id")?,
            sender_id: row.try_get("sender_id")?,
            receiver_id: row.try_get("receiver_id")?,
            offered_skill_id: row.try_get("offered_skill_id")?,
            requested_skill_id: row.try_get("requested_skill_id")?,
            status: status.parse().map_err(|e| decode_error("status", e))?,
            is_read: row.try_get("is_read")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Unique constraint over `(sender_id, offered_skill_id, requested_skill_id)`.
pub const UQ_SENDER_OFFERED_REQUESTED: &str = "uq_exchange_requests_sender_offered_requested";

/// Whether `err` is a unique violation of [`UQ_SENDER_OFFERED_REQUESTED`].
pub fn is_duplicate_request(err: &sqlx::Error) -> bool {
    err.as_database_error().is_some_and(|db| {
        db.is_unique_violation() && db.constraint() == Some(UQ_SENDER_OFFERED_REQUESTED)
    })
}

/// DTO for inserting a request. Status and read flag take their column
/// defaults (`pending`, `false`).
#[derive(Debug, Clone)]
pub struct NewExchangeRequest {
    pub sender_id: DbId,
    pub receiver_id: DbId,
    pub offered_skill_id: DbId,
    pub requested_skill_id: DbId,
}

/// Listing filter for one user's requests.
#[derive(Debug, Clone, Copy)]
pub struct RequestFilter {
    pub user_id: DbId,
    /// `None` means both incoming and outgoing.
    pub scope: Option<RequestType>,
    pub status: Option<RequestStatus>,
    pub is_read: Option<bool>,
}

impl RequestFilter {
    /// Whether `request` falls inside this filter.
    pub fn matches(&self, request: &ExchangeRequest) -> bool {
        let in_scope = match self.scope {
            Some(RequestType::Incoming) => request.receiver_id == self.user_id,
            Some(RequestType::Outgoing) => request.sender_id == self.user_id,
            None => request.sender_id == self.user_id || request.receiver_id == self.user_id,
        };
        in_scope
            && self.status.map_or(true, |s| s == request.status)
            && self.is_read.map_or(true, |r| r == request.is_read)
    }
}

/// A request with its four relations loaded.
#[derive(Debug, Clone)]
pub struct RequestDetail {
    pub request: ExchangeRequest,
    pub sender: User,
    pub receiver: User,
    pub offered_skill: Skill,
    pub requested_skill: Skill,
}

/// API representation of a request. Users are rendered through
/// [`UserResponse`], so credentials can never leak through this type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestResponse {
    pub id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub status: RequestStatus,
    pub is_read: bool,
    pub sender: UserResponse,
    pub receiver: UserResponse,
    pub offered_skill: Skill,
    pub requested_skill: Skill,
}

impl From<RequestDetail> for RequestResponse {
    fn from(detail: RequestDetail) -> Self {
        let RequestDetail {
            request,
            sender,
            receiver,
            offered_skill,
            requested_skill,
        } = detail;
        Self {
            id: request.id,
            created_at: request.created_at,
            updated_at: request.updated_at,
            status: request.status,
            is_read: request.is_read,
            sender: sender.into(),
            receiver: receiver.into(),
            offered_skill,
            requested_skill,
        }
    }
}

/// One page of requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPage {
    pub data: Vec<RequestResponse>,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub total: i64,
}
