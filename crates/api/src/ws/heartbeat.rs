use std::sync::Arc;
use std::time::Duration;

use crate::ws::registry::SessionRegistry;

/// Interval between heartbeat pings (in seconds).
const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Spawn a background task that pings every registered socket.
///
/// Runs until aborted through the returned handle during shutdown.
pub fn start_heartbeat(sessions: Arc<SessionRegistry>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));

        loop {
            interval.tick().await;
            let count = sessions.connection_count().await;
            tracing::debug!(count, "WebSocket heartbeat ping");
            sessions.ping_all().await;
        }
    })
}
