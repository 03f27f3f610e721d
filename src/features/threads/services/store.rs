use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::threads::models::{
    AppendOutcome, DeletedThread, MessageAttachment, NewAttachment, ThreadConvention,
    ThreadMessage, ThreadRecord,
};

/// One physical thread store. Each chat subsystem implements this over its
/// own tables and column names; nothing above this trait knows which layout
/// a thread lives in.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    fn convention(&self) -> ThreadConvention;

    /// Cheap existence check used by schema resolution. Implementations
    /// surface database errors untouched so the resolver can distinguish
    /// "table missing" from real failures.
    async fn probe(&self, thread_id: Uuid) -> Result<bool>;

    async fn find_thread(&self, thread_id: Uuid) -> Result<Option<ThreadRecord>>;

    /// Look up the one active thread between two participants, in either
    /// order.
    async fn find_by_participants(&self, a: &str, b: &str) -> Result<Option<ThreadRecord>>;

    async fn create_thread(
        &self,
        starter_id: &str,
        recipient_id: &str,
        listing_id: Option<Uuid>,
    ) -> Result<ThreadRecord>;

    async fn count_messages(&self, thread_id: Uuid) -> Result<i64>;

    /// Page of messages oldest first
    async fn messages_page(
        &self,
        thread_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ThreadMessage>>;

    /// Attachments for a set of messages, in upload order
    async fn attachments_for_messages(
        &self,
        message_ids: &[Uuid],
    ) -> Result<Vec<MessageAttachment>>;

    /// Persist one message with its attachments in a single transaction.
    /// The thread row is locked for the duration so that concurrent sends to
    /// the same thread observe strictly increasing unread counts.
    async fn append_message(
        &self,
        thread_id: Uuid,
        sender_id: &str,
        recipient_id: &str,
        body: &str,
        attachments: &[NewAttachment],
    ) -> Result<AppendOutcome>;

    /// Set the read timestamp on every unread message not authored by
    /// `reader_id`. Returns how many rows changed; repeat calls change none.
    async fn mark_read(&self, thread_id: Uuid, reader_id: &str) -> Result<u64>;

    /// Update the thread's denormalized last-activity column
    async fn touch_last_activity(&self, thread_id: Uuid, at: DateTime<Utc>) -> Result<()>;

    /// Remove the thread with its messages and attachment rows. Returns the
    /// storage keys of removed attachments so blobs can be cleaned up.
    async fn delete_thread(&self, thread_id: Uuid) -> Result<DeletedThread>;
}
