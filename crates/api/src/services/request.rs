//! The request lifecycle engine.
//!
//! [`RequestService`] creates, lists, transitions, and deletes exchange
//! requests. It reads users and skills through the [`ExchangeStore`] and
//! pushes notifications through the [`NotificationDispatcher`] once the
//! triggering write has been persisted. Notification failures never reach
//! the caller.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use skillswap_core::exchange::{apply_action, RequestAction, RequestStatus, RequestType};
use skillswap_core::notification::{NotificationPayload, NotificationType};
use skillswap_core::pagination::PageWindow;
use skillswap_core::roles::Role;
use skillswap_core::types::DbId;
use skillswap_db::models::request::{
    is_duplicate_request, ExchangeRequest, NewExchangeRequest, RequestDetail, RequestFilter,
    RequestPage, RequestResponse,
};
use skillswap_db::models::user::UserWithSkills;
use skillswap_db::ExchangeStore;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::notifications::NotificationDispatcher;

pub const SKILL_NOT_FOUND: &str = "Offered or requested skill does not exist";
const NOT_ON_BEHALF: &str = "Request was not generated on behalf of the authenticated user";
const SENDER_NOT_FOUND: &str = "Request was generated by a non-existent user";
const RECEIVER_NOT_FOUND: &str = "Request is addressed to a non-existent user";
const SENDER_LACKS_SKILL: &str = "Authenticated user does not own the offered skill";
const RECEIVER_LACKS_SKILL: &str = "Receiver no longer owns the requested skill";
const PAGE_NOT_FOUND: &str = "Page not found";
const ACCESS_DENIED: &str = "Access denied";
const RECEIVER_ONLY: &str = "Only the receiver of a request can update it";
const INVALID_ACTION: &str = "Invalid action";
const DELETE_FORBIDDEN: &str = "Cannot delete a request created by another user";

/// Listing filter as it arrives on `GET /requests`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequestsQuery {
    #[serde(rename = "type")]
    pub scope: Option<RequestType>,
    pub status: Option<RequestStatus>,
    pub is_read: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Body returned by [`RequestService::remove`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

#[derive(Clone)]
pub struct RequestService {
    store: Arc<dyn ExchangeStore>,
    dispatcher: NotificationDispatcher,
}

impl RequestService {
    pub fn new(store: Arc<dyn ExchangeStore>, dispatcher: NotificationDispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Propose exchanging `offered_skill_id` (owned by the sender) for
    /// `requested_skill_id` (owned by the receiver).
    pub async fn create(
        &self,
        sender_id: DbId,
        offered_skill_id: DbId,
        requested_skill_id: DbId,
    ) -> AppResult<RequestResponse> {
        let offered = self.store.find_skill(offered_skill_id).await?;
        let requested = self.store.find_skill(requested_skill_id).await?;
        let (Some(offered), Some(requested)) = (offered, requested) else {
            return Err(AppError::not_found(SKILL_NOT_FOUND));
        };

        if offered.owner_id != sender_id {
            return Err(AppError::forbidden(NOT_ON_BEHALF));
        }

        let sender = self
            .store
            .find_user_with_skills(offered.owner_id)
            .await?
            .ok_or_else(|| AppError::not_found(SENDER_NOT_FOUND))?;
        let receiver = self
            .store
            .find_user_with_skills(requested.owner_id)
            .await?
            .ok_or_else(|| AppError::not_found(RECEIVER_NOT_FOUND))?;

        // Ownership was derived from `owner_id` above, so these fire only if a
        // skill changes hands between the reads.
        if !sender.owns(offered.id) {
            return Err(AppError::forbidden(SENDER_LACKS_SKILL));
        }
        if !receiver.owns(requested.id) {
            return Err(AppError::conflict(RECEIVER_LACKS_SKILL));
        }

        let duplicate = || {
            AppError::bad_request(format!(
                "Such a request already exists: \"{}\" was already offered for \"{}\"",
                offered.title, requested.title
            ))
        };

        let existing = self
            .store
            .find_request_by_triple(sender.user.id, offered.id, requested.id)
            .await?;
        if existing.is_some() {
            return Err(duplicate());
        }

        // A concurrent create can pass the lookup; the unique constraint decides.
        let request = self
            .store
            .insert_request(&NewExchangeRequest {
                sender_id: sender.user.id,
                receiver_id: receiver.user.id,
                offered_skill_id: offered.id,
                requested_skill_id: requested.id,
            })
            .await
            .map_err(|e| {
                if is_duplicate_request(&e) {
                    duplicate()
                } else {
                    AppError::Database(e)
                }
            })?;
        tracing::info!(
            request_id = %request.id,
            sender_id = %request.sender_id,
            receiver_id = %request.receiver_id,
            "Exchange request created"
        );

        let payload = NotificationPayload::new(
            NotificationType::NewRequest,
            &requested.title,
            &sender.user.name,
        );
        let _ = self.dispatcher.notify_user(receiver.user.id, &payload).await;

        Ok(RequestDetail {
            request,
            sender: sender.user,
            receiver: receiver.user,
            offered_skill: offered,
            requested_skill: requested,
        }
        .into())
    }

    /// One page of the requests `user_id` sent or received.
    pub async fn find_all(
        &self,
        user_id: DbId,
        query: ListRequestsQuery,
    ) -> AppResult<RequestPage> {
        let window = PageWindow::new(query.page, query.limit);
        let filter = RequestFilter {
            user_id,
            scope: query.scope,
            status: query.status,
            is_read: query.is_read,
        };

        let (details, total) = self
            .store
            .list_requests(&filter, window.limit, window.offset())
            .await?;

        if window.is_out_of_range(total) {
            return Err(AppError::not_found(PAGE_NOT_FOUND));
        }

        Ok(RequestPage {
            data: details.into_iter().map(RequestResponse::from).collect(),
            page: window.page,
            limit: window.limit,
            total_pages: window.total_pages(total),
            total,
        })
    }

    /// A single request, visible to its two parties and to admins.
    pub async fn find_one(
        &self,
        user_id: DbId,
        id: DbId,
        role: Role,
    ) -> AppResult<RequestResponse> {
        let request = self.load_request(id).await?;
        let detail = self.load_detail(request).await?;

        let is_party = user_id == detail.sender.id || user_id == detail.receiver.id;
        if !is_party && !role.is_admin() {
            return Err(AppError::forbidden(ACCESS_DENIED));
        }

        Ok(detail.into())
    }

    /// Apply `action` (`read`, `accept`, `reject`) on behalf of `actor`.
    ///
    /// Ordinary users may only act on requests they received. Accepting
    /// grants each party the other's skill before the new status is saved;
    /// the three writes are independent.
    pub async fn update(
        &self,
        id: DbId,
        action: &str,
        actor: &AuthUser,
    ) -> AppResult<RequestResponse> {
        let request = self.load_request(id).await?;

        if actor.role == Role::User && actor.user_id != request.receiver_id {
            return Err(AppError::forbidden(RECEIVER_ONLY));
        }

        let action: RequestAction = action
            .parse()
            .map_err(|_| AppError::bad_request(INVALID_ACTION))?;
        let transition = apply_action(request.status, action);

        if transition.transfers_skills {
            self.transfer_skills(&request).await?;
        }

        let updated = self
            .store
            .update_request_state(id, transition.status, transition.is_read)
            .await?
            .ok_or_else(|| request_not_found(id))?;
        tracing::info!(
            request_id = %id,
            actor_id = %actor.user_id,
            action = action.as_str(),
            status = %updated.status,
            "Exchange request updated"
        );

        let detail = self.load_detail(updated).await?;

        if let Some(kind) = transition.notification {
            let payload =
                NotificationPayload::new(kind, &detail.requested_skill.title, &detail.sender.name);
            let _ = self.dispatcher.notify_user(detail.receiver.id, &payload).await;
        }

        Ok(detail.into())
    }

    /// Delete a request. Only its sender or an admin may do so.
    pub async fn remove(&self, id: DbId, actor: &AuthUser) -> AppResult<DeleteResponse> {
        let request = self.load_request(id).await?;

        if !actor.is_admin() && actor.user_id != request.sender_id {
            return Err(AppError::forbidden(DELETE_FORBIDDEN));
        }

        if !self.store.delete_request(id).await? {
            return Err(request_not_found(id));
        }
        tracing::info!(request_id = %id, actor_id = %actor.user_id, "Exchange request deleted");

        Ok(DeleteResponse {
            message: format!("Request with id: {id} deleted"),
        })
    }

    async fn load_request(&self, id: DbId) -> AppResult<ExchangeRequest> {
        self.store
            .find_request(id)
            .await?
            .ok_or_else(|| request_not_found(id))
    }

    async fn load_detail(&self, request: ExchangeRequest) -> AppResult<RequestDetail> {
        let id = request.id;
        self.store
            .load_detail(request)
            .await?
            .ok_or_else(|| request_not_found(id))
    }

    async fn participant(&self, user_id: DbId, missing: &str) -> AppResult<UserWithSkills> {
        self.store
            .find_user_with_skills(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(missing))
    }

    /// Give the sender the requested skill and the receiver the offered one,
    /// skipping whichever side already holds its skill.
    async fn transfer_skills(&self, request: &ExchangeRequest) -> AppResult<()> {
        let sender = self.participant(request.sender_id, SENDER_NOT_FOUND).await?;
        let receiver = self.participant(request.receiver_id, RECEIVER_NOT_FOUND).await?;

        if !sender.holds(request.requested_skill_id) {
            self.store
                .grant_skill(sender.user.id, request.requested_skill_id)
                .await?;
        }
        if !receiver.holds(request.offered_skill_id) {
            self.store
                .grant_skill(receiver.user.id, request.offered_skill_id)
                .await?;
        }
        Ok(())
    }
}

fn request_not_found(id: DbId) -> AppError {
    AppError::not_found(format!("Request with id {id} not found"))
}
