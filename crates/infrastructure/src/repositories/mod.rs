pub mod memory_zone_store;
pub mod zone_store_repository;

pub use memory_zone_store::InMemoryZoneStore;
pub use zone_store_repository::SqliteZoneStore;
