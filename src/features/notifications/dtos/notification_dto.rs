use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::notifications::models::NotificationRow;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDto {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub message_id: Uuid,
    /// "property" or "community"
    pub thread_kind: String,
    /// Channel names the decider selected when the message arrived
    pub channels: Vec<String>,
    pub preview: String,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationRow> for NotificationDto {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: row.id,
            thread_id: row.thread_id,
            message_id: row.message_id,
            thread_kind: row.thread_kind,
            channels: row.channels,
            preview: row.preview,
            created_at: row.created_at,
        }
    }
}
