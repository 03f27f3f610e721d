use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::threads::models::{
    MessageAttachment, ThreadKind, ThreadMessage, ThreadRecord,
};

#[derive(Debug, Clone, FromRow)]
pub struct CommunityThreadRow {
    pub id: Uuid,
    pub initiator_id: String,
    pub partner_id: String,
    pub created_at: DateTime<Utc>,
    pub last_message_at: Option<DateTime<Utc>>,
}

impl CommunityThreadRow {
    pub fn into_record(self) -> ThreadRecord {
        ThreadRecord {
            id: self.id,
            kind: ThreadKind::Community,
            starter_id: self.initiator_id,
            recipient_id: self.partner_id,
            listing_id: None,
            created_at: self.created_at,
            last_activity_at: self.last_message_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CommunityMessageRow {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub sender_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl CommunityMessageRow {
    pub fn into_message(self) -> ThreadMessage {
        ThreadMessage {
            id: self.id,
            thread_id: self.thread_id,
            sender_id: self.sender_id,
            body: self.body,
            created_at: self.created_at,
            read_at: self.read_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CommunityAttachmentRow {
    pub id: Uuid,
    pub message_id: Uuid,
    pub storage_key: String,
    pub mime_type: String,
    pub size_bytes: i64,
}

impl CommunityAttachmentRow {
    pub fn into_attachment(self) -> MessageAttachment {
        MessageAttachment {
            id: self.id,
            message_id: self.message_id,
            storage_key: self.storage_key,
            mime_type: self.mime_type,
            size_bytes: self.size_bytes,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CommunityLastMessageRow {
    pub thread_id: Uuid,
    pub sender_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
