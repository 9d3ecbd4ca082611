use std::sync::Arc;

use skillswap_db::ExchangeStore;

use crate::config::ServerConfig;
use crate::notifications::NotificationDispatcher;
use crate::services::RequestService;
use crate::ws::SessionRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Users, skills, and requests.
    pub store: Arc<dyn ExchangeStore>,
    pub config: Arc<ServerConfig>,
    /// Live notification sockets keyed by user.
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ExchangeStore>,
        config: ServerConfig,
        sessions: Arc<SessionRegistry>,
    ) -> Self {
        Self {
            store,
            config: Arc::new(config),
            sessions,
        }
    }

    pub fn dispatcher(&self) -> NotificationDispatcher {
        NotificationDispatcher::new(Arc::clone(&self.sessions))
    }

    pub fn requests(&self) -> RequestService {
        RequestService::new(Arc::clone(&self.store), self.dispatcher())
    }
}
