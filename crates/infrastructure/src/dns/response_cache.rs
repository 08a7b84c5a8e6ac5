use chiral_dns_application::ports::ResponseCache;
use chiral_dns_domain::config::CacheConfig;
use chiral_dns_domain::QuestionKey;
use lru::LruCache;
use rustc_hash::FxBuildHasher;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

type ResponseLru = LruCache<QuestionKey, CachedResponse, FxBuildHasher>;

struct CachedResponse {
    bytes: Vec<u8>,
    expires_at: Instant,
}

/// Bounded response cache: least recently used entries are evicted first and
/// every entry expires with the shortest TTL it carries.
pub struct LruResponseCache {
    entries: Mutex<ResponseLru>,
    max_ttl: u32,
    negative_ttl: u32,
}

impl LruResponseCache {
    pub fn new(capacity: NonZeroUsize, max_ttl: u32, negative_ttl: u32) -> Self {
        Self {
            entries: Mutex::new(LruCache::with_hasher(capacity, FxBuildHasher)),
            max_ttl,
            negative_ttl,
        }
    }

    /// `None` when the configuration disables caching.
    pub fn from_config(config: &CacheConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let capacity = NonZeroUsize::new(config.max_entries)?;
        Some(Self::new(capacity, config.max_ttl, config.negative_ttl))
    }

    /// Lifetime of an entry whose records carry `min_ttl`.
    pub fn lifetime(&self, min_ttl: Option<u32>) -> Duration {
        let secs = min_ttl.unwrap_or(self.negative_ttl).min(self.max_ttl);
        Duration::from_secs(secs as u64)
    }

    fn lock(&self) -> MutexGuard<'_, ResponseLru> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ResponseCache for LruResponseCache {
    fn get(&self, key: &QuestionKey) -> Option<Vec<u8>> {
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => return Some(entry.bytes.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
            debug!(question = %key, "Cached response expired");
        }
        None
    }

    fn insert(&self, key: QuestionKey, response: Vec<u8>, min_ttl: Option<u32>) {
        let lifetime = self.lifetime(min_ttl);
        if lifetime.is_zero() {
            return;
        }
        let entry = CachedResponse {
            bytes: response,
            expires_at: Instant::now() + lifetime,
        };
        if let Some((evicted, _)) = self.lock().push(key, entry) {
            debug!(question = %evicted, "Cache entry displaced");
        }
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    fn clear(&self) {
        self.lock().clear();
    }
}
