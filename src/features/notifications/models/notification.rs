use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted channel decision. One row per message the decider saw for a
/// recipient; the in-app badge inventory reads these back. Reads are always
/// scoped to one recipient, so the row does not carry the recipient id.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub message_id: Uuid,
    pub thread_kind: String,
    pub channels: Vec<String>,
    pub preview: String,
    pub created_at: DateTime<Utc>,
}
