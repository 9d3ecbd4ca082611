//! Skill entity model.

use serde::Serialize;
use skillswap_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `skills` table. Carries no secrets, so it is serialized
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: DbId,
    pub created_at: Timestamp,
}

/// DTO for inserting a skill (seeding and tests; skill CRUD lives in the
/// skill service).
#[derive(Debug, Clone)]
pub struct CreateSkill {
    pub title: String,
    pub description: Option<String>,
    pub owner_id: DbId,
}
