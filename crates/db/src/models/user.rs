//! User entity model and the sanitized response shape.

use serde::Serialize;
use skillswap_core::roles::Role;
use skillswap_core::types::{DbId, Timestamp};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use super::decode_error;
use super::skill::Skill;

/// Full user row from the `users` table.
///
/// Contains the password hash and refresh token -- NEVER serialize this to
/// API responses directly. Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub refresh_token: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let role: String = row.try_get("role")?;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: role.parse().map_err(|e| decode_error("role", e))?,
            refresh_token: row.try_get("refresh_token")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Safe user representation for API responses (no password hash, no
/// refresh token).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse::from(&user)
    }
}

/// DTO for inserting a user (seeding and tests; account management lives
/// in the user service).
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// A user together with freshly loaded skill sets.
#[derive(Debug, Clone)]
pub struct UserWithSkills {
    pub user: User,
    /// Skills the user created and owns.
    pub skills: Vec<Skill>,
    /// Skills obtained through accepted exchanges.
    pub acquired_skills: Vec<Skill>,
}

impl UserWithSkills {
    /// Whether `skill_id` is among the skills this user owns.
    pub fn owns(&self, skill_id: DbId) -> bool {
        self.skills.iter().any(|s| s.id == skill_id)
    }

    /// Whether the user owns `skill_id` or has acquired it.
    pub fn holds(&self, skill_id: DbId) -> bool {
        self.owns(skill_id) || self.acquired_skills.iter().any(|s| s.id == skill_id)
    }
}
