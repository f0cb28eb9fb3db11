pub mod manager;
pub mod memory_store;
pub mod models;
pub mod pg_store;
pub mod query_builder;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory_store::MemoryStore;
pub use pg_store::PgStore;
pub use store::{Store, StoreError};
