mod response_cache;
mod zone_store;

pub use response_cache::ResponseCache;
pub use zone_store::{ZoneNodeInfo, ZoneStore};
