use super::UseCases;
use chiral_dns_application::use_cases::HandleDnsPacketUseCase;
use chiral_dns_domain::Config;
use chiral_dns_infrastructure::dns::LruResponseCache;
use std::sync::Arc;
use tracing::info;

pub struct DnsServices {
    pub handler: Arc<HandleDnsPacketUseCase>,
}

impl DnsServices {
    pub fn new(config: &Config, use_cases: &UseCases) -> Self {
        let handler = HandleDnsPacketUseCase::new(use_cases.resolver.clone());

        let handler = match LruResponseCache::from_config(&config.cache) {
            Some(cache) => {
                info!(
                    max_entries = config.cache.max_entries,
                    max_ttl = config.cache.max_ttl,
                    negative_ttl = config.cache.negative_ttl,
                    "Response cache enabled"
                );
                handler.with_cache(Arc::new(cache))
            }
            None => handler,
        };

        Self {
            handler: Arc::new(handler),
        }
    }
}
