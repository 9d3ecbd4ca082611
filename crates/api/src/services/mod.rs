//! Domain services invoked by HTTP handlers.

pub mod request;

pub use request::RequestService;
