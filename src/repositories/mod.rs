pub mod catalog_repository;
pub mod inbox_repository;
pub mod kv_store;
pub mod session_repository;

pub use catalog_repository::{CatalogRepository, StaticCatalogRepository};
pub use inbox_repository::{InboxRepository, KeyValueInboxRepository};
pub use kv_store::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore, STORE_FILE_NAME};
pub use session_repository::{InMemorySessionRepository, SessionRepository};
