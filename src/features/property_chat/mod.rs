pub mod models;
pub mod services;

pub use services::{ListingDirectory, PropertyConversationSource, PropertyThreadStore};
