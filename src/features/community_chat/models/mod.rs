pub mod rows;

pub use rows::{
    CommunityAttachmentRow, CommunityLastMessageRow, CommunityMessageRow, CommunityThreadRow,
};
