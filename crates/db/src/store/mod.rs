//! The storage collaborator consumed by the request lifecycle engine.
//!
//! [`ExchangeStore`] exposes exactly the reads and writes the engine needs
//! across users, skills, and requests. [`PgExchangeStore`] delegates to the
//! repositories; [`MemoryExchangeStore`] keeps everything in process for
//! tests and local runs without Postgres.

mod memory;
mod postgres;

use async_trait::async_trait;
use skillswap_core::exchange::RequestStatus;
use skillswap_core::types::DbId;

use crate::models::request::{ExchangeRequest, NewExchangeRequest, RequestDetail, RequestFilter};
use crate::models::skill::Skill;
use crate::models::user::UserWithSkills;

pub use memory::MemoryExchangeStore;
pub use postgres::PgExchangeStore;

#[async_trait]
pub trait ExchangeStore: Send + Sync {
    /// Look up a skill with its owner id.
    async fn find_skill(&self, id: DbId) -> Result<Option<Skill>, sqlx::Error>;

    /// Look up a user with owned and acquired skills loaded fresh.
    async fn find_user_with_skills(&self, id: DbId)
        -> Result<Option<UserWithSkills>, sqlx::Error>;

    async fn find_request_by_triple(
        &self,
        sender_id: DbId,
        offered_skill_id: DbId,
        requested_skill_id: DbId,
    ) -> Result<Option<ExchangeRequest>, sqlx::Error>;

    async fn insert_request(
        &self,
        input: &NewExchangeRequest,
    ) -> Result<ExchangeRequest, sqlx::Error>;

    async fn find_request(&self, id: DbId) -> Result<Option<ExchangeRequest>, sqlx::Error>;

    /// Resolve the sender, receiver, and both skills of `request`.
    ///
    /// Returns `None` if any relation has disappeared.
    async fn load_detail(
        &self,
        request: ExchangeRequest,
    ) -> Result<Option<RequestDetail>, sqlx::Error>;

    /// One page of requests matching `filter` (newest first) and the total
    /// number of matches.
    async fn list_requests(
        &self,
        filter: &RequestFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<RequestDetail>, i64), sqlx::Error>;

    async fn update_request_state(
        &self,
        id: DbId,
        status: RequestStatus,
        is_read: bool,
    ) -> Result<Option<ExchangeRequest>, sqlx::Error>;

    /// Add a skill to a user's acquired set. `false` if already present.
    async fn grant_skill(&self, user_id: DbId, skill_id: DbId) -> Result<bool, sqlx::Error>;

    async fn delete_request(&self, id: DbId) -> Result<bool, sqlx::Error>;

    /// Reachability check for `/health`.
    async fn ping(&self) -> Result<(), sqlx::Error>;
}
