use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::inbox::handlers;
use crate::features::inbox::services::InboxService;

/// Create routes for the unified inbox
///
/// Note: This feature requires authentication
pub fn routes(service: Arc<InboxService>) -> Router {
    Router::new()
        .route("/api/inbox", get(handlers::get_inbox))
        .with_state(service)
}
