mod inbox_service;
mod profile_lookup;
mod source;

pub use inbox_service::InboxService;
pub use profile_lookup::ProfileDirectory;
pub use source::ConversationSource;
