use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    /// Upper bound on records fetched per (zone, type).
    #[serde(default = "default_record_limit")]
    pub record_limit: usize,

    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    #[serde(default = "default_max_concurrent_queries")]
    pub max_concurrent_queries: usize,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            record_limit: default_record_limit(),
            query_timeout_ms: default_query_timeout_ms(),
            max_concurrent_queries: default_max_concurrent_queries(),
        }
    }
}

fn default_record_limit() -> usize {
    13
}

fn default_query_timeout_ms() -> u64 {
    2000
}

fn default_max_concurrent_queries() -> usize {
    64
}
