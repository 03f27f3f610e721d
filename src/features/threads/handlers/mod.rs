pub mod thread_handler;

pub use thread_handler::{
    __path_delete_thread, __path_list_thread_messages, __path_mark_thread_read,
    __path_send_message, __path_start_community_thread, __path_start_property_thread,
    delete_thread, list_thread_messages, mark_thread_read, send_message, start_community_thread,
    start_property_thread,
};
