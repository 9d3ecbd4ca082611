//! Skill-exchange API server library.
//!
//! Exposes config, state, error handling, the request lifecycle service,
//! routes, and the WebSocket notification plumbing so integration tests and
//! the binary entrypoint share the same building blocks.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod notifications;
pub mod router;
pub mod routes;
pub mod services;
pub mod state;
pub mod ws;
