use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::features::threads::models::ThreadKind;

/// The other participant of a conversation as shown in the inbox.
/// Presence fields come from the denormalized projection on `profiles`.
#[derive(Debug, Clone)]
pub struct CounterpartIdentity {
    pub id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub is_online: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
}

/// Most recent message of a conversation, summarized for list rendering
#[derive(Debug, Clone)]
pub struct LastMessageSummary {
    pub body: String,
    pub created_at: DateTime<Utc>,
    /// Authored by the viewing user
    pub is_mine: bool,
}

/// Listing card attached to property conversations
#[derive(Debug, Clone)]
pub struct ListingSummary {
    pub id: Uuid,
    pub title: String,
    pub monthly_rent: Option<Decimal>,
    pub cover_url: Option<String>,
}

/// One inbox row, computed on read. Both chat subsystems project into this
/// shape; it is never persisted.
#[derive(Debug, Clone)]
pub struct UnifiedConversation {
    pub id: Uuid,
    pub kind: ThreadKind,
    pub counterpart: CounterpartIdentity,
    pub last_message: Option<LastMessageSummary>,
    /// Messages not authored by the viewer and not yet read
    pub unread_count: i64,
    /// Later of thread creation and last message time
    pub updated_at: DateTime<Utc>,
    pub related_listing: Option<ListingSummary>,
}

/// Unread totals across the merged, unfiltered inbox. Kept independent of
/// the requested scope so tab badges stay consistent while switching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnreadCounts {
    pub all: i64,
    pub property: i64,
    pub community: i64,
}

impl UnreadCounts {
    pub fn add(&mut self, kind: ThreadKind, unread: i64) {
        self.all += unread;
        match kind {
            ThreadKind::Property => self.property += unread,
            ThreadKind::Community => self.community += unread,
        }
    }
}

/// Result of one inbox read
#[derive(Debug, Clone)]
pub struct InboxPage {
    pub conversations: Vec<UnifiedConversation>,
    pub counts: UnreadCounts,
    /// True when at least one source failed or timed out and contributed
    /// nothing to this response
    pub partial: bool,
    /// Conversations in the merged window matching the requested scope,
    /// before pagination
    pub total_in_scope: i64,
}
