use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::notifications::handlers;
use crate::features::notifications::services::NotificationService;

/// Create routes for notification listing
///
/// Note: This feature requires authentication
pub fn routes(service: Arc<NotificationService>) -> Router {
    Router::new()
        .route("/api/notifications", get(handlers::get_notifications))
        .with_state(service)
}
