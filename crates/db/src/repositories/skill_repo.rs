//! Repository for the `skills` and `user_acquired_skills` tables.

use sqlx::PgPool;
use skillswap_core::types::DbId;

use crate::models::skill::{CreateSkill, Skill};

const COLUMNS: &str = "id, title, description, owner_id, created_at";

/// Provides skill lookups and the acquired-skill set.
pub struct SkillRepo;

impl SkillRepo {
    /// Insert a new skill, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSkill) -> Result<Skill, sqlx::Error> {
        let query = format!(
            "INSERT INTO skills (title, description, owner_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Skill>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.owner_id)
            .fetch_one(pool)
            .await
    }

    /// Find a skill by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Skill>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM skills WHERE id = $1");
        sqlx::query_as::<_, Skill>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load every skill whose id is in `ids`. Order is unspecified.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Skill>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM skills WHERE id = ANY($1)");
        sqlx::query_as::<_, Skill>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Skills created by `owner_id`.
    pub async fn list_owned_by(pool: &PgPool, owner_id: DbId) -> Result<Vec<Skill>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM skills WHERE owner_id = $1 ORDER BY created_at");
        sqlx::query_as::<_, Skill>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Skills `user_id` obtained through accepted exchanges.
    pub async fn list_acquired_by(pool: &PgPool, user_id: DbId) -> Result<Vec<Skill>, sqlx::Error> {
        sqlx::query_as::<_, Skill>(
            "SELECT s.id, s.title, s.description, s.owner_id, s.created_at
             FROM skills s
             JOIN user_acquired_skills a ON a.skill_id = s.id
             WHERE a.user_id = $1
             ORDER BY a.acquired_at",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Add `skill_id` to the acquired set of `user_id`.
    ///
    /// Returns `false` if the pair was already present.
    pub async fn grant_acquired(
        pool: &PgPool,
        user_id: DbId,
        skill_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO user_acquired_skills (user_id, skill_id)
             VALUES ($1, $2)
             ON CONFLICT (user_id, skill_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(skill_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
