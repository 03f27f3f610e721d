mod thread;
mod view;

pub use thread::{
    AppendOutcome, DeletedThread, MessageAttachment, NewAttachment, ThreadConvention, ThreadKind,
    ThreadMessage, ThreadRecord,
};
pub use view::{AttachmentLink, MessageWithAttachments, SentMessage, StartedThread, ThreadView};
