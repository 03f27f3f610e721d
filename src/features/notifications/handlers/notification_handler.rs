use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::notifications::dtos::NotificationDto;
use crate::features::notifications::services::NotificationService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Recent notifications for the caller, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Notification rows the decider recorded", body = ApiResponse<Vec<NotificationDto>>),
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn get_notifications(
    user: AuthenticatedUser,
    State(service): State<Arc<NotificationService>>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<NotificationDto>>>> {
    let (rows, total) = service.list_for_user(&user.account_id, &query).await?;
    let notifications: Vec<NotificationDto> = rows.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::success(
        Some(notifications),
        None,
        Some(Meta { total }),
    )))
}
