//! Thread messaging for both chat subsystems.
//!
//! A thread id alone does not say which physical tables it lives in; every
//! thread-scoped operation goes through the schema resolver first and then
//! runs against the store the thread resolved to.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/threads/property` | Yes | Start (or resume) a property inquiry |
//! | POST | `/api/threads/community` | Yes | Start (or resume) a community conversation |
//! | GET | `/api/threads/{thread_id}/messages` | Yes | Open a thread, one page oldest first |
//! | POST | `/api/threads/{thread_id}/messages` | Yes | Send a message |
//! | POST | `/api/threads/{thread_id}/read` | Yes | Mark the counterpart's messages read |
//! | DELETE | `/api/threads/{thread_id}` | Yes | Delete a thread and its media |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::{SchemaResolver, ThreadService, ThreadStore};
