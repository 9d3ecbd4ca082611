//! Domain vocabulary shared by the database and API layers.
//!
//! Nothing in this crate performs I/O. It defines identifiers, the error
//! taxonomy, roles, the exchange request state machine, pagination
//! arithmetic, and the real-time notification payload.

pub mod error;
pub mod exchange;
pub mod notification;
pub mod pagination;
pub mod roles;
pub mod types;
