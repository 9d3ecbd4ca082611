//! WebSocket infrastructure for real-time notifications.
//!
//! Provides the per-user session registry, the handshake guard, heartbeat
//! monitoring, and the HTTP upgrade handler used by Axum routes.

pub mod guard;
mod handler;
mod heartbeat;
pub mod registry;

pub use guard::SocketAuth;
pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use registry::SessionRegistry;
