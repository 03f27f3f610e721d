pub mod inbox_handler;

pub use inbox_handler::{__path_get_inbox, get_inbox};
