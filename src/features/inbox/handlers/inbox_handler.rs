use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::inbox::dtos::{InboxQuery, InboxResponseDto};
use crate::features::inbox::services::InboxService;
use crate::shared::types::{ApiResponse, Meta};

/// Unified inbox across property and community conversations
#[utoipa::path(
    get,
    path = "/api/inbox",
    params(InboxQuery),
    responses(
        (status = 200, description = "Conversations newest first with unread totals", body = ApiResponse<InboxResponseDto>),
    ),
    security(("bearer_auth" = [])),
    tag = "inbox"
)]
pub async fn get_inbox(
    user: AuthenticatedUser,
    State(service): State<Arc<InboxService>>,
    Query(query): Query<InboxQuery>,
) -> Result<Json<ApiResponse<InboxResponseDto>>> {
    let page = service
        .get_inbox(&user.account_id, query.scope, &query.pagination())
        .await?;

    let meta = Meta {
        total: page.total_in_scope,
    };
    Ok(Json(ApiResponse::success(
        Some(page.into()),
        None,
        Some(meta),
    )))
}
