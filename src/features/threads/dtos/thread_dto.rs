use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::inbox::dtos::{CounterpartDto, ListingSummaryDto};
use crate::features::threads::models::{
    AttachmentLink, MessageWithAttachments, NewAttachment, SentMessage, StartedThread, ThreadKind,
    ThreadView,
};

/// Metadata for a blob already uploaded through the media service
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentUploadDto {
    /// Storage key returned by the upload endpoint
    #[validate(length(min = 1, max = 512, message = "Storage key must be 1-512 characters"))]
    pub storage_key: String,

    /// MIME type reported for the blob
    #[validate(length(min = 3, max = 255, message = "MIME type must be 3-255 characters"))]
    pub mime_type: String,

    /// Blob size in bytes
    pub size_bytes: i64,
}

impl From<AttachmentUploadDto> for NewAttachment {
    fn from(dto: AttachmentUploadDto) -> Self {
        Self {
            storage_key: dto.storage_key,
            mime_type: dto.mime_type,
            size_bytes: dto.size_bytes,
        }
    }
}

/// Request DTO for sending a message into an existing thread
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageDto {
    /// Message text; trimmed server-side, 1-1000 characters after trimming
    #[validate(length(min = 1, max = 4000, message = "Message body must be 1-4000 characters"))]
    pub body: String,

    /// Attachments for this message (at most 10)
    #[serde(default)]
    #[validate(length(max = 10, message = "A message can include at most 10 attachments"), nested)]
    pub attachments: Vec<AttachmentUploadDto>,
}

/// Request DTO for starting a property inquiry from a listing page
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartPropertyThreadDto {
    /// The listing being inquired about
    pub listing_id: Uuid,

    /// First message text
    #[validate(length(min = 1, max = 4000, message = "Message body must be 1-4000 characters"))]
    pub body: String,
}

/// Request DTO for starting a community conversation
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartCommunityThreadDto {
    /// Account id of the member to talk to
    #[validate(length(min = 1, max = 64, message = "Recipient id must be 1-64 characters"))]
    pub recipient_id: String,

    /// First message text
    #[validate(length(min = 1, max = 4000, message = "Message body must be 1-4000 characters"))]
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentDto {
    pub id: Uuid,
    pub mime_type: String,
    pub size_bytes: i64,
    /// Presigned download URL; absent when presigning failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl From<AttachmentLink> for AttachmentDto {
    fn from(link: AttachmentLink) -> Self {
        Self {
            id: link.attachment.id,
            mime_type: link.attachment.mime_type,
            size_bytes: link.attachment.size_bytes,
            download_url: link.download_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: Uuid,
    pub sender_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    /// When the other participant read the message; never cleared once set
    pub read_at: Option<DateTime<Utc>>,
    pub attachments: Vec<AttachmentDto>,
}

impl From<MessageWithAttachments> for MessageDto {
    fn from(entry: MessageWithAttachments) -> Self {
        Self {
            id: entry.message.id,
            sender_id: entry.message.sender_id,
            body: entry.message.body,
            created_at: entry.message.created_at,
            read_at: entry.message.read_at,
            attachments: entry.attachments.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<SentMessage> for MessageDto {
    fn from(sent: SentMessage) -> Self {
        Self {
            id: sent.message.id,
            sender_id: sent.message.sender_id,
            body: sent.message.body,
            created_at: sent.message.created_at,
            read_at: sent.message.read_at,
            attachments: sent.attachments.into_iter().map(Into::into).collect(),
        }
    }
}

/// One opened thread: header context plus a page of messages oldest first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThreadViewDto {
    pub id: Uuid,
    pub kind: ThreadKind,
    pub counterpart: CounterpartDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_listing: Option<ListingSummaryDto>,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<MessageDto>,
}

impl From<ThreadView> for ThreadViewDto {
    fn from(view: ThreadView) -> Self {
        Self {
            id: view.thread.id,
            kind: view.thread.kind,
            counterpart: view.counterpart.into(),
            related_listing: view.related_listing.map(Into::into),
            created_at: view.thread.created_at,
            messages: view.messages.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartedThreadDto {
    pub thread_id: Uuid,
    pub kind: ThreadKind,
    pub message: MessageDto,
}

impl From<StartedThread> for StartedThreadDto {
    fn from(started: StartedThread) -> Self {
        Self {
            thread_id: started.thread.id,
            kind: started.thread.kind,
            message: started.sent.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadResponseDto {
    /// How many messages this call transitioned to read
    pub updated_count: u64,
}

/// Uniform deletion envelope. Always returned with HTTP 200 so the response
/// shape carries the outcome; a non-participant sees exactly what a caller
/// targeting a missing thread sees.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteThreadResponseDto {
    pub ok: bool,
    /// Reason code when `ok` is false: "not_found" or "internal"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeleteThreadResponseDto {
    pub fn done() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn failed(reason: &str) -> Self {
        Self {
            ok: false,
            error: Some(reason.to_string()),
        }
    }
}
