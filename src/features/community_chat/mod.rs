pub mod models;
pub mod services;

pub use services::{CommunityConversationSource, CommunityThreadStore};
