use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use chrono::Utc;
use skillswap_core::exchange::RequestStatus;
use skillswap_core::types::{DbId, Timestamp};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ExchangeStore;
use crate::models::request::{
    ExchangeRequest, NewExchangeRequest, RequestDetail, RequestFilter, UQ_SENDER_OFFERED_REQUESTED,
};
use crate::models::skill::{CreateSkill, Skill};
use crate::models::user::{CreateUser, User, UserWithSkills};

/// In-process [`ExchangeStore`].
///
/// Mirrors the Postgres semantics the engine relies on: generated ids,
/// server-assigned strictly increasing timestamps, newest-first listing, an
/// idempotent acquired-skill set, and the unique request triple.
#[derive(Default)]
pub struct MemoryExchangeStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<DbId, User>,
    skills: HashMap<DbId, Skill>,
    /// `(user_id, skill_id)` in grant order.
    acquired: Vec<(DbId, DbId)>,
    /// Insertion order.
    requests: Vec<ExchangeRequest>,
    last_timestamp: Option<Timestamp>,
}

impl Inner {
    /// Wall-clock time, nudged forward so no two writes share a timestamp.
    fn next_timestamp(&mut self) -> Timestamp {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + chrono::Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }

    fn detail(&self, request: &ExchangeRequest) -> Option<RequestDetail> {
        Some(RequestDetail {
            request: request.clone(),
            sender: self.users.get(&request.sender_id)?.clone(),
            receiver: self.users.get(&request.receiver_id)?.clone(),
            offered_skill: self.skills.get(&request.offered_skill_id)?.clone(),
            requested_skill: self.skills.get(&request.requested_skill_id)?.clone(),
        })
    }
}

/// Stand-in for the Postgres `unique_violation` (SQLSTATE 23505) raised on
/// [`UQ_SENDER_OFFERED_REQUESTED`].
#[derive(Debug)]
struct UniqueViolation {
    constraint: &'static str,
}

impl fmt::Display for UniqueViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "duplicate key value violates unique constraint \"{}\"",
            self.constraint
        )
    }
}

impl std::error::Error for UniqueViolation {}

impl sqlx::error::DatabaseError for UniqueViolation {
    fn message(&self) -> &str {
        "duplicate key value violates unique constraint"
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed("23505"))
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self
    }

    fn constraint(&self) -> Option<&str> {
        Some(self.constraint)
    }

    fn kind(&self) -> sqlx::error::ErrorKind {
        sqlx::error::ErrorKind::UniqueViolation
    }
}

impl MemoryExchangeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user.
    pub async fn add_user(&self, input: CreateUser) -> User {
        let mut inner = self.inner.write().await;
        let now = inner.next_timestamp();
        let user = User {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            password_hash: input.password_hash,
            role: input.role,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id, user.clone());
        user
    }

    /// Seed a skill. The owner does not have to exist.
    pub async fn add_skill(&self, input: CreateSkill) -> Skill {
        let mut inner = self.inner.write().await;
        let skill = Skill {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            owner_id: input.owner_id,
            created_at: inner.next_timestamp(),
        };
        inner.skills.insert(skill.id, skill.clone());
        skill
    }

    /// Number of stored requests.
    pub async fn request_count(&self) -> usize {
        self.inner.read().await.requests.len()
    }
}

#[async_trait]
impl ExchangeStore for MemoryExchangeStore {
    async fn find_skill(&self, id: DbId) -> Result<Option<Skill>, sqlx::Error> {
        Ok(self.inner.read().await.skills.get(&id).cloned())
    }

    async fn find_user_with_skills(
        &self,
        id: DbId,
    ) -> Result<Option<UserWithSkills>, sqlx::Error> {
        let inner = self.inner.read().await;
        let Some(user) = inner.users.get(&id).cloned() else {
            return Ok(None);
        };

        let mut skills: Vec<Skill> = inner
            .skills
            .values()
            .filter(|s| s.owner_id == id)
            .cloned()
            .collect();
        skills.sort_by_key(|s| s.created_at);

        let acquired_skills = inner
            .acquired
            .iter()
            .filter(|(user_id, _)| *user_id == id)
            .filter_map(|(_, skill_id)| inner.skills.get(skill_id).cloned())
            .collect();

        Ok(Some(UserWithSkills {
            user,
            skills,
            acquired_skills,
        }))
    }

    async fn find_request_by_triple(
        &self,
        sender_id: DbId,
        offered_skill_id: DbId,
        requested_skill_id: DbId,
    ) -> Result<Option<ExchangeRequest>, sqlx::Error> {
        Ok(self
            .inner
            .read()
            .await
            .requests
            .iter()
            .find(|r| {
                r.sender_id == sender_id
                    && r.offered_skill_id == offered_skill_id
                    && r.requested_skill_id == requested_skill_id
            })
            .cloned())
    }

    async fn insert_request(
        &self,
        input: &NewExchangeRequest,
    ) -> Result<ExchangeRequest, sqlx::Error> {
        let mut inner = self.inner.write().await;
        let duplicate = inner.requests.iter().any(|r| {
            r.sender_id == input.sender_id
                && r.offered_skill_id == input.offered_skill_id
                && r.requested_skill_id == input.requested_skill_id
        });
        if duplicate {
            return Err(sqlx::Error::Database(Box::new(UniqueViolation {
                constraint: UQ_SENDER_OFFERED_REQUESTED,
            })));
        }
        let now = inner.next_timestamp();
        let request = ExchangeRequest {
            id: Uuid::new_v4(),
            sender_id: input.sender_id,
            receiver_id: input.receiver_id,
            offered_skill_id: input.offered_skill_id,
            requested_skill_id: input.requested_skill_id,
            status: RequestStatus::Pending,
            is_read: false,
            created_at: now,
            updated_at: now,
        };
        inner.requests.push(request.clone());
        Ok(request)
    }

    async fn find_request(&self, id: DbId) -> Result<Option<ExchangeRequest>, sqlx::Error> {
        Ok(self
            .inner
            .read()
            .await
            .requests
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn load_detail(
        &self,
        request: ExchangeRequest,
    ) -> Result<Option<RequestDetail>, sqlx::Error> {
        Ok(self.inner.read().await.detail(&request))
    }

    async fn list_requests(
        &self,
        filter: &RequestFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<RequestDetail>, i64), sqlx::Error> {
        let inner = self.inner.read().await;

        let mut matching: Vec<&ExchangeRequest> =
            inner.requests.iter().filter(|r| filter.matches(r)).collect();
        // Newest first; later insertion wins ties.
        matching.reverse();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .filter_map(|r| inner.detail(r))
            .collect();

        Ok((page, total))
    }

    async fn update_request_state(
        &self,
        id: DbId,
        status: RequestStatus,
        is_read: bool,
    ) -> Result<Option<ExchangeRequest>, sqlx::Error> {
        let mut inner = self.inner.write().await;
        let now = inner.next_timestamp();
        Ok(inner.requests.iter_mut().find(|r| r.id == id).map(|r| {
            r.status = status;
            r.is_read = is_read;
            r.updated_at = now;
            r.clone()
        }))
    }

    async fn grant_skill(&self, user_id: DbId, skill_id: DbId) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.write().await;
        if inner.acquired.contains(&(user_id, skill_id)) {
            return Ok(false);
        }
        inner.acquired.push((user_id, skill_id));
        Ok(true)
    }

    async fn delete_request(&self, id: DbId) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.write().await;
        let before = inner.requests.len();
        inner.requests.retain(|r| r.id != id);
        Ok(inner.requests.len() < before)
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use skillswap_core::exchange::RequestType;
    use skillswap_core::roles::Role;

    use super::*;

    async fn seed_user(store: &MemoryExchangeStore, name: &str) -> User {
        store
            .add_user(CreateUser {
                name: name.to_string(),
                email: format!("{name}@example.com"),
                password_hash: "hash".to_string(),
                role: Role::User,
            })
            .await
    }

    async fn seed_skill(store: &MemoryExchangeStore, owner: &User, title: &str) -> Skill {
        store
            .add_skill(CreateSkill {
                title: title.to_string(),
                description: None,
                owner_id: owner.id,
            })
            .await
    }

    #[tokio::test]
    async fn grant_skill_is_idempotent() {
        let store = MemoryExchangeStore::new();
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;
        let guitar = seed_skill(&store, &bob, "Guitar").await;

        assert!(store.grant_skill(alice.id, guitar.id).await.unwrap());
        assert!(!store.grant_skill(alice.id, guitar.id).await.unwrap());

        let loaded = store.find_user_with_skills(alice.id).await.unwrap().unwrap();
        assert_eq!(loaded.acquired_skills.len(), 1);
        assert!(loaded.holds(guitar.id));
        assert!(!loaded.owns(guitar.id));
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_scoped() {
        let store = MemoryExchangeStore::new();
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;
        let a1 = seed_skill(&store, &alice, "Chess").await;
        let a2 = seed_skill(&store, &alice, "Go").await;
        let b1 = seed_skill(&store, &bob, "Guitar").await;

        let first = store
            .insert_request(&NewExchangeRequest {
                sender_id: alice.id,
                receiver_id: bob.id,
                offered_skill_id: a1.id,
                requested_skill_id: b1.id,
            })
            .await
            .unwrap();
        let second = store
            .insert_request(&NewExchangeRequest {
                sender_id: alice.id,
                receiver_id: bob.id,
                offered_skill_id: a2.id,
                requested_skill_id: b1.id,
            })
            .await
            .unwrap();
        assert!(second.created_at > first.created_at);

        let filter = RequestFilter {
            user_id: bob.id,
            scope: Some(RequestType::Incoming),
            status: None,
            is_read: None,
        };
        let (page, total) = store.list_requests(&filter, 10, 0).await.unwrap();
        assert_eq!(total, 2);
        let ids: Vec<DbId> = page.iter().map(|d| d.request.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        let outgoing = RequestFilter {
            scope: Some(RequestType::Outgoing),
            ..filter
        };
        let (page, total) = store.list_requests(&outgoing, 10, 0).await.unwrap();
        assert_eq!(total, 0);
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn inserting_the_same_triple_twice_is_a_unique_violation() {
        let store = MemoryExchangeStore::new();
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;
        let a = seed_skill(&store, &alice, "Chess").await;
        let b = seed_skill(&store, &bob, "Guitar").await;
        let input = NewExchangeRequest {
            sender_id: alice.id,
            receiver_id: bob.id,
            offered_skill_id: a.id,
            requested_skill_id: b.id,
        };

        store.insert_request(&input).await.unwrap();
        let err = store.insert_request(&input).await.unwrap_err();

        assert!(crate::models::request::is_duplicate_request(&err));
        let db_err = err.as_database_error().unwrap();
        assert_eq!(db_err.code().as_deref(), Some("23505"));
        assert_eq!(store.request_count().await, 1);
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let store = MemoryExchangeStore::new();
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;
        let a = seed_skill(&store, &alice, "Chess").await;
        let b = seed_skill(&store, &bob, "Guitar").await;
        let request = store
            .insert_request(&NewExchangeRequest {
                sender_id: alice.id,
                receiver_id: bob.id,
                offered_skill_id: a.id,
                requested_skill_id: b.id,
            })
            .await
            .unwrap();

        assert!(store.delete_request(request.id).await.unwrap());
        assert!(!store.delete_request(request.id).await.unwrap());
        assert_eq!(store.request_count().await, 0);
    }
}
