pub mod auth;
pub mod community_chat;
pub mod inbox;
pub mod notifications;
pub mod presence;
pub mod property_chat;
pub mod threads;
