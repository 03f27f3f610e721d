pub mod community_source;
pub mod community_store;

pub use community_source::CommunityConversationSource;
pub use community_store::CommunityThreadStore;
