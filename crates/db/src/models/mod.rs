//! Row models and DTOs.
//!
//! Each submodule contains:
//! - An entity struct matching the database row
//! - A create DTO for inserts where the table is written by this crate
//! - A `Serialize` response type for anything that leaves the API

pub mod request;
pub mod skill;
pub mod user;

use sqlx::error::BoxDynError;

/// Wrap a text-to-enum parse failure as a column decode error.
pub(crate) fn decode_error(column: &str, message: String) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: BoxDynError::from(message),
    }
}
