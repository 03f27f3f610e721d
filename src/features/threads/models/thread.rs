use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Which chat subsystem a thread belongs to. Thread ids are never reused
/// across kinds, so the kind also identifies the physical tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ThreadKind {
    Property,
    Community,
}

impl ThreadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadKind::Property => "property",
            ThreadKind::Community => "community",
        }
    }
}

impl std::fmt::Display for ThreadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The physical column/table layout a thread's rows live in. Property chat
/// predates the current naming standard; community chat follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadConvention {
    Legacy,
    Modern,
}

/// A thread row, normalized from either physical layout
#[derive(Debug, Clone)]
pub struct ThreadRecord {
    pub id: Uuid,
    pub kind: ThreadKind,
    /// Who opened the thread (legacy: seeker, modern: initiator)
    pub starter_id: String,
    /// The other participant (legacy: listing owner, modern: partner)
    pub recipient_id: String,
    /// Present only for property threads
    pub listing_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl ThreadRecord {
    pub fn involves(&self, account_id: &str) -> bool {
        self.starter_id == account_id || self.recipient_id == account_id
    }

    /// The other participant, if `account_id` is one of the two
    pub fn counterpart_of(&self, account_id: &str) -> Option<&str> {
        if self.starter_id == account_id {
            Some(self.recipient_id.as_str())
        } else if self.recipient_id == account_id {
            Some(self.starter_id.as_str())
        } else {
            None
        }
    }
}

/// A message row, normalized from either physical layout
#[derive(Debug, Clone)]
pub struct ThreadMessage {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub sender_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    /// Set when the recipient read the message; once set it is never cleared
    pub read_at: Option<DateTime<Utc>>,
}

/// An attachment row. Owned by its message and deleted with it.
#[derive(Debug, Clone)]
pub struct MessageAttachment {
    pub id: Uuid,
    pub message_id: Uuid,
    pub storage_key: String,
    pub mime_type: String,
    pub size_bytes: i64,
}

/// Attachment metadata accepted on message send. The blob itself was already
/// uploaded through the media service.
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub storage_key: String,
    pub mime_type: String,
    pub size_bytes: i64,
}

/// Result of appending one message inside a store transaction
#[derive(Debug, Clone)]
pub struct AppendOutcome {
    pub message: ThreadMessage,
    /// Attachment rows inserted alongside the message, in upload order.
    /// Returned from the same transaction so callers never have to read
    /// back what they just wrote.
    pub attachments: Vec<MessageAttachment>,
    /// Recipient's unread count for the thread including the appended
    /// message, counted under the same row lock that serialized the insert
    pub recipient_unread_after: i64,
}

/// What a completed thread deletion leaves behind for blob cleanup
#[derive(Debug, Clone, Default)]
pub struct DeletedThread {
    pub attachment_keys: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(starter: &str, recipient: &str) -> ThreadRecord {
        ThreadRecord {
            id: Uuid::new_v4(),
            kind: ThreadKind::Community,
            starter_id: starter.to_string(),
            recipient_id: recipient.to_string(),
            listing_id: None,
            created_at: Utc::now(),
            last_activity_at: None,
        }
    }

    #[test]
    fn counterpart_resolves_both_directions() {
        let t = record("alice", "bob");
        assert_eq!(t.counterpart_of("alice"), Some("bob"));
        assert_eq!(t.counterpart_of("bob"), Some("alice"));
        assert_eq!(t.counterpart_of("mallory"), None);
    }

    #[test]
    fn involves_only_participants() {
        let t = record("alice", "bob");
        assert!(t.involves("alice"));
        assert!(t.involves("bob"));
        assert!(!t.involves("mallory"));
    }
}
