pub mod presence_handler;

pub use presence_handler::{
    __path_get_presence, __path_go_offline, __path_record_ping, get_presence, go_offline,
    record_ping,
};
