use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::presence::dtos::PresenceDto;
use crate::features::presence::services::PresenceService;
use crate::shared::types::ApiResponse;

/// Record activity for the authenticated account
#[utoipa::path(
    post,
    path = "/api/presence/ping",
    responses(
        (status = 200, description = "Account marked online", body = ApiResponse<PresenceDto>),
    ),
    security(("bearer_auth" = [])),
    tag = "presence"
)]
pub async fn record_ping(
    user: AuthenticatedUser,
    State(service): State<Arc<PresenceService>>,
) -> Result<Json<ApiResponse<PresenceDto>>> {
    let record = service.ping(&user.account_id).await?;
    Ok(Json(ApiResponse::success(Some(record.into()), None, None)))
}

/// End the authenticated account's session
#[utoipa::path(
    post,
    path = "/api/presence/offline",
    responses(
        (status = 200, description = "Account marked offline with last seen stamped", body = ApiResponse<PresenceDto>),
    ),
    security(("bearer_auth" = [])),
    tag = "presence"
)]
pub async fn go_offline(
    user: AuthenticatedUser,
    State(service): State<Arc<PresenceService>>,
) -> Result<Json<ApiResponse<PresenceDto>>> {
    let record = service.end_session(&user.account_id).await?;
    Ok(Json(ApiResponse::success(Some(record.into()), None, None)))
}

/// Current presence for one account
#[utoipa::path(
    get,
    path = "/api/presence/{account_id}",
    params(
        ("account_id" = String, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Presence record", body = ApiResponse<PresenceDto>),
        (status = 404, description = "No presence recorded for this account"),
    ),
    security(("bearer_auth" = [])),
    tag = "presence"
)]
pub async fn get_presence(
    _user: AuthenticatedUser,
    State(service): State<Arc<PresenceService>>,
    Path(account_id): Path<String>,
) -> Result<Json<ApiResponse<PresenceDto>>> {
    let record = service
        .get(&account_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No presence recorded for this account".to_string()))?;

    Ok(Json(ApiResponse::success(Some(record.into()), None, None)))
}
