//! Best-effort delivery of request notifications to connected users.

mod dispatcher;

pub use dispatcher::{DispatchError, NotificationDispatcher};
