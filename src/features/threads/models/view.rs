use crate::features::inbox::models::{CounterpartIdentity, ListingSummary};
use crate::features::notifications::services::NotificationChannel;
use crate::features::threads::models::{MessageAttachment, ThreadMessage, ThreadRecord};

/// An attachment row paired with a presigned download URL. The URL is
/// best-effort: when presigning fails the attachment is still listed.
#[derive(Debug, Clone)]
pub struct AttachmentLink {
    pub attachment: MessageAttachment,
    pub download_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MessageWithAttachments {
    pub message: ThreadMessage,
    pub attachments: Vec<AttachmentLink>,
}

/// One opened thread: header context plus a page of messages
#[derive(Debug, Clone)]
pub struct ThreadView {
    pub thread: ThreadRecord,
    pub counterpart: CounterpartIdentity,
    pub related_listing: Option<ListingSummary>,
    pub messages: Vec<MessageWithAttachments>,
    pub total_messages: i64,
}

/// A message accepted by the send path, with the channel decision made for
/// the recipient
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub message: ThreadMessage,
    pub attachments: Vec<AttachmentLink>,
    pub channels: Vec<NotificationChannel>,
}

/// Result of a start-conversation entry point
#[derive(Debug, Clone)]
pub struct StartedThread {
    pub thread: ThreadRecord,
    pub sent: SentMessage,
}
