pub mod notification_handler;

pub use notification_handler::{__path_get_notifications, get_notifications};
