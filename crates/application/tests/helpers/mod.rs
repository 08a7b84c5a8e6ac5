#![allow(dead_code)]

mod fixtures;
mod mock_response_cache;
mod mock_zone_store;

pub use fixtures::*;
pub use mock_response_cache::MockResponseCache;
pub use mock_zone_store::MockZoneStore;
