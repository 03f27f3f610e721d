pub mod channel_decider;
pub mod notification_service;

pub use channel_decider::{BurstState, NotificationChannel};
pub use notification_service::NotificationService;
