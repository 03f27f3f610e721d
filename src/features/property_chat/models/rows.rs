use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::inbox::models::ListingSummary;
use crate::features::threads::models::{
    MessageAttachment, ThreadKind, ThreadMessage, ThreadRecord,
};

// Property chat predates the naming standard used by the rest of the schema:
// `created` instead of `created_at`, `seen_at` instead of `read_at`,
// `last_activity` instead of `last_message_at`, and owner/seeker instead of
// initiator/partner. These row types are the only place the old names exist.

#[derive(Debug, Clone, FromRow)]
pub struct PropertyThreadRow {
    pub id: Uuid,
    pub listing_id: Option<Uuid>,
    pub owner_id: String,
    pub seeker_id: String,
    pub created: DateTime<Utc>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl PropertyThreadRow {
    pub fn into_record(self) -> ThreadRecord {
        ThreadRecord {
            id: self.id,
            kind: ThreadKind::Property,
            starter_id: self.seeker_id,
            recipient_id: self.owner_id,
            listing_id: self.listing_id,
            created_at: self.created,
            last_activity_at: self.last_activity,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PropertyMessageRow {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub sender_id: String,
    pub body: String,
    pub created: DateTime<Utc>,
    pub seen_at: Option<DateTime<Utc>>,
}

impl PropertyMessageRow {
    pub fn into_message(self) -> ThreadMessage {
        ThreadMessage {
            id: self.id,
            thread_id: self.thread_id,
            sender_id: self.sender_id,
            body: self.body,
            created_at: self.created,
            read_at: self.seen_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PropertyAttachmentRow {
    pub id: Uuid,
    pub message_id: Uuid,
    pub storage_key: String,
    pub mime_type: String,
    pub size_bytes: i64,
}

impl PropertyAttachmentRow {
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

/// Most recent message per thread, for inbox rows
#[derive(Debug, Clone, FromRow)]
pub struct PropertyLastMessageRow {
    pub thread_id: Uuid,
    pub sender_id: String,
    pub body: String,
    pub created: DateTime<Utc>,
}

/// Listing columns consumed by chat
#[derive(Debug, Clone, FromRow)]
pub struct ListingRow {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub monthly_rent: Option<Decimal>,
    pub cover_url: Option<String>,
}

impl ListingRow {
    pub fn into_summary(self) -> ListingSummary {
        ListingSummary {
            id: self.id,
            title: self.title,
            monthly_rent: self.monthly_rent,
            cover_url: self.cover_url,
        }
    }
}
