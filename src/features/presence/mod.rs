//! Online/offline presence tracking.
//!
//! Clients ping while a session is active and report offline on teardown.
//! The canonical state lives in `presence_records`; a projection on
//! `profiles` is written through best-effort so inbox and thread reads can
//! show counterpart presence without touching this feature.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::PresenceService;
