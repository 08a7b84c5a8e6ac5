use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Ceiling in seconds for an entry's lifetime.
    #[serde(default = "default_max_ttl")]
    pub max_ttl: u32,

    /// Lifetime in seconds of responses that carry no records.
    #[serde(default = "default_negative_ttl")]
    pub negative_ttl: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_entries: default_max_entries(),
            max_ttl: default_max_ttl(),
            negative_ttl: default_negative_ttl(),
        }
    }
}

fn default_max_entries() -> usize {
    10_000
}

fn default_max_ttl() -> u32 {
    3600
}

fn default_negative_ttl() -> u32 {
    60
}
