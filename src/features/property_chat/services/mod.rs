pub mod listing_lookup;
pub mod property_source;
pub mod property_store;

pub use listing_lookup::ListingDirectory;
pub use property_source::PropertyConversationSource;
pub use property_store::PropertyThreadStore;
