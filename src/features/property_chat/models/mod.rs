pub mod rows;

pub use rows::{
    ListingRow, PropertyAttachmentRow, PropertyLastMessageRow, PropertyMessageRow,
    PropertyThreadRow,
};
