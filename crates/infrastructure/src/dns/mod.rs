pub mod query_client;
pub mod response_cache;

pub use query_client::{QueryExchange, UdpQueryClient};
pub use response_cache::LruResponseCache;
