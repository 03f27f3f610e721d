use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::presence::handlers;
use crate::features::presence::services::PresenceService;

/// Create routes for presence tracking
///
/// Note: This feature requires authentication
pub fn routes(service: Arc<PresenceService>) -> Router {
    Router::new()
        .route("/api/presence/ping", post(handlers::record_ping))
        .route("/api/presence/offline", post(handlers::go_offline))
        .route("/api/presence/{account_id}", get(handlers::get_presence))
        .with_state(service)
}
