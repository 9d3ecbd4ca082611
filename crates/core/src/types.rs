/// All primary keys are PostgreSQL UUIDs generated by `gen_random_uuid()`.
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Parse a path identifier into a [`DbId`].
///
/// Returns `None` for anything that is not a UUID; callers treat that as
/// "no such entity" rather than a malformed request.
pub fn parse_id(raw: &str) -> Option<DbId> {
    uuid::Uuid::parse_str(raw.trim()).ok()
}
