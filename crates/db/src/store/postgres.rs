use std::collections::HashMap;

use async_trait::async_trait;
use skillswap_core::exchange::RequestStatus;
use skillswap_core::types::DbId;

use super::ExchangeStore;
use crate::models::request::{ExchangeRequest, NewExchangeRequest, RequestDetail, RequestFilter};
use crate::models::skill::Skill;
use crate::models::user::{User, UserWithSkills};
use crate::repositories::{RequestRepo, SkillRepo, UserRepo};
use crate::DbPool;

/// [`ExchangeStore`] backed by PostgreSQL.
///
/// Each call is its own unit of work; nothing here opens a transaction.
#[derive(Clone)]
pub struct PgExchangeStore {
    pool: DbPool,
}

impl PgExchangeStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Batch-load relations for a set of requests and stitch them together.
    ///
    /// Requests whose relations vanished between queries are dropped.
    async fn hydrate(
        &self,
        requests: Vec<ExchangeRequest>,
    ) -> Result<Vec<RequestDetail>, sqlx::Error> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let mut user_ids: Vec<DbId> = requests
            .iter()
            .flat_map(|r| [r.sender_id, r.receiver_id])
            .collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let mut skill_ids: Vec<DbId> = requests
            .iter()
            .flat_map(|r| [r.offered_skill_id, r.requested_skill_id])
            .collect();
        skill_ids.sort_unstable();
        skill_ids.dedup();

        let users: HashMap<DbId, User> = UserRepo::find_by_ids(&self.pool, &user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        let skills: HashMap<DbId, Skill> = SkillRepo::find_by_ids(&self.pool, &skill_ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let requested = requests.len();
        let details: Vec<RequestDetail> = requests
            .into_iter()
            .filter_map(|request| {
                Some(RequestDetail {
                    sender: users.get(&request.sender_id)?.clone(),
                    receiver: users.get(&request.receiver_id)?.clone(),
                    offered_skill: skills.get(&request.offered_skill_id)?.clone(),
                    requested_skill: skills.get(&request.requested_skill_id)?.clone(),
                    request,
                })
            })
            .collect();

        if details.len() < requested {
            tracing::warn!(
                dropped = requested - details.len(),
                "Requests skipped because a related user or skill no longer exists"
            );
        }
        Ok(details)
    }
}

#[async_trait]
impl ExchangeStore for PgExchangeStore {
    async fn find_skill(&self, id: DbId) -> Result<Option<Skill>, sqlx::Error> {
        SkillRepo::find_by_id(&self.pool, id).await
    }

    async fn find_user_with_skills(
        &self,
        id: DbId,
    ) -> Result<Option<UserWithSkills>, sqlx::Error> {
        let Some(user) = UserRepo::find_by_id(&self.pool, id).await? else {
            return Ok(None);
        };
        let skills = SkillRepo::list_owned_by(&self.pool, id).await?;
        let acquired_skills = SkillRepo::list_acquired_by(&self.pool, id).await?;
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
        RequestRepo::find_by_triple(&self.pool, sender_id, offered_skill_id, requested_skill_id)
            .await
    }

    async fn insert_request(
        &self,
        input: &NewExchangeRequest,
    ) -> Result<ExchangeRequest, sqlx::Error> {
        RequestRepo::create(&self.pool, input).await
    }

    async fn find_request(&self, id: DbId) -> Result<Option<ExchangeRequest>, sqlx::Error> {
        RequestRepo::find_by_id(&self.pool, id).await
    }

    async fn load_detail(
        &self,
        request: ExchangeRequest,
    ) -> Result<Option<RequestDetail>, sqlx::Error> {
        Ok(self.hydrate(vec![request]).await?.pop())
    }

    async fn list_requests(
        &self,
        filter: &RequestFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<RequestDetail>, i64), sqlx::Error> {
        let total = RequestRepo::count(&self.pool, filter).await?;
        let rows = RequestRepo::list(&self.pool, filter, limit, offset).await?;
        Ok((self.hydrate(rows).await?, total))
    }

    async fn update_request_state(
        &self,
        id: DbId,
        status: RequestStatus,
        is_read: bool,
    ) -> Result<Option<ExchangeRequest>, sqlx::Error> {
        RequestRepo::update_state(&self.pool, id, status, is_read).await
    }

    async fn grant_skill(&self, user_id: DbId, skill_id: DbId) -> Result<bool, sqlx::Error> {
        SkillRepo::grant_acquired(&self.pool, user_id, skill_id).await
    }

    async fn delete_request(&self, id: DbId) -> Result<bool, sqlx::Error> {
        RequestRepo::delete(&self.pool, id).await
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        crate::health_check(&self.pool).await
    }
}
