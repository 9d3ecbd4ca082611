//! Repository for the `exchange_requests` table.

use sqlx::PgPool;
use skillswap_core::exchange::{RequestStatus, RequestType};
use skillswap_core::types::DbId;

use crate::models::request::{ExchangeRequest, NewExchangeRequest, RequestFilter};

const COLUMNS: &str = "id, sender_id, receiver_id, offered_skill_id, requested_skill_id, \
                       status, is_read, created_at, updated_at";

/// Provides CRUD operations for exchange requests.
pub struct RequestRepo;

impl RequestRepo {
    /// Insert a new request, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &NewExchangeRequest,
    ) -> Result<ExchangeRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO exchange_requests
                (sender_id, receiver_id, offered_skill_id, requested_skill_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExchangeRequest>(&query)
            .bind(input.sender_id)
            .bind(input.receiver_id)
            .bind(input.offered_skill_id)
            .bind(input.requested_skill_id)
            .fetch_one(pool)
            .await
    }

    /// Find a request by internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ExchangeRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM exchange_requests WHERE id = $1");
        sqlx::query_as::<_, ExchangeRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the request a sender already made for the same skill pair.
    pub async fn find_by_triple(
        pool: &PgPool,
        sender_id: DbId,
        offered_skill_id: DbId,
        requested_skill_id: DbId,
    ) -> Result<Option<ExchangeRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM exchange_requests
             WHERE sender_id = $1 AND offered_skill_id = $2 AND requested_skill_id = $3"
        );
        sqlx::query_as::<_, ExchangeRequest>(&query)
            .bind(sender_id)
            .bind(offered_skill_id)
            .bind(requested_skill_id)
            .fetch_optional(pool)
            .await
    }

    /// List one page of requests matching `filter`, newest first.
    ///
    /// Ties on `created_at` are broken by `id` so paging is stable.
    pub async fn list(
        pool: &PgPool,
        filter: &RequestFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ExchangeRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM exchange_requests
             WHERE {scope}
               AND ($2::TEXT IS NULL OR status = $2)
               AND ($3::BOOLEAN IS NULL OR is_read = $3)
             ORDER BY created_at DESC, id DESC
             LIMIT $4 OFFSET $5",
            scope = scope_clause(filter.scope),
        );
        sqlx::query_as::<_, ExchangeRequest>(&query)
            .bind(filter.user_id)
            .bind(filter.status.map(RequestStatus::as_str))
            .bind(filter.is_read)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count all requests matching `filter`.
    pub async fn count(pool: &PgPool, filter: &RequestFilter) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM exchange_requests
             WHERE {scope}
               AND ($2::TEXT IS NULL OR status = $2)
               AND ($3::BOOLEAN IS NULL OR is_read = $3)",
            scope = scope_clause(filter.scope),
        );
        sqlx::query_scalar::<_, i64>(&query)
            .bind(filter.user_id)
            .bind(filter.status.map(RequestStatus::as_str))
            .bind(filter.is_read)
            .fetch_one(pool)
            .await
    }

    /// Persist a new status and read flag.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_state(
        pool: &PgPool,
        id: DbId,
        status: RequestStatus,
        is_read: bool,
    ) -> Result<Option<ExchangeRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE exchange_requests SET
                status = $2,
                is_read = $3,
                updated_at = clock_timestamp()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExchangeRequest>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(is_read)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a request. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM exchange_requests WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// SQL predicate restricting rows to the side(s) of the exchange `$1` is on.
fn scope_clause(scope: Option<RequestType>) -> &'static str {
    match scope {
        Some(RequestType::Incoming) => "receiver_id = $1",
        Some(RequestType::Outgoing) => "sender_id = $1",
        None => "(sender_id = $1 OR receiver_id = $1)",
    }
}
