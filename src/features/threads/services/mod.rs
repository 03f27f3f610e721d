pub mod schema_resolver;
pub mod store;
pub mod thread_service;

pub use schema_resolver::{ResolutionCache, SchemaResolver};
pub use store::ThreadStore;
pub use thread_service::ThreadService;
