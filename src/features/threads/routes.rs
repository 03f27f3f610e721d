use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::features::threads::handlers;
use crate::features::threads::services::ThreadService;

/// Create routes for thread messaging
///
/// Note: This feature requires authentication
pub fn routes(service: Arc<ThreadService>) -> Router {
    Router::new()
        .route("/api/threads/property", post(handlers::start_property_thread))
        .route(
            "/api/threads/community",
            post(handlers::start_community_thread),
        )
        .route(
            "/api/threads/{thread_id}/messages",
            get(handlers::list_thread_messages).post(handlers::send_message),
        )
        .route(
            "/api/threads/{thread_id}/read",
            post(handlers::mark_thread_read),
        )
        .route("/api/threads/{thread_id}", delete(handlers::delete_thread))
        .with_state(service)
}
