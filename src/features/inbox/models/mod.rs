mod conversation;
mod profile;

pub use conversation::{
    CounterpartIdentity, InboxPage, LastMessageSummary, ListingSummary, UnifiedConversation,
    UnreadCounts,
};
pub use profile::ProfileRow;
