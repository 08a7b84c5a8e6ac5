use super::ResolveQueryUseCase;
use crate::ports::ResponseCache;
use chiral_dns_domain::compressor::HEADER_LENGTH;
use chiral_dns_domain::{DomainError, Message, Opcode};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

const RD_BIT: u8 = 0x01;

/// Per-process packet counters.
#[derive(Debug, Default)]
pub struct QueryCounters {
    received: AtomicU64,
    answered: AtomicU64,
    dropped: AtomicU64,
    cache_hits: AtomicU64,
    failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryCountersSnapshot {
    pub received: u64,
    pub answered: u64,
    pub dropped: u64,
    pub cache_hits: u64,
    pub failures: u64,
}

impl QueryCounters {
    pub fn snapshot(&self) -> QueryCountersSnapshot {
        QueryCountersSnapshot {
            received: self.received.load(Ordering::Relaxed),
            answered: self.answered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Turns one inbound datagram into the bytes to send back, if any.
pub struct HandleDnsPacketUseCase {
    resolver: Arc<ResolveQueryUseCase>,
    cache: Option<Arc<dyn ResponseCache>>,
    counters: Arc<QueryCounters>,
}

impl HandleDnsPacketUseCase {
    pub fn new(resolver: Arc<ResolveQueryUseCase>) -> Self {
        Self {
            resolver,
            cache: None,
            counters: Arc::new(QueryCounters::default()),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn counters(&self) -> Arc<QueryCounters> {
        Arc::clone(&self.counters)
    }

    /// `Ok(None)` means the packet is dropped without a reply: it did not
    /// decode, it is itself a response, or its opcode is not QUERY.
    pub async fn execute(&self, packet: &[u8]) -> Result<Option<Vec<u8>>, DomainError> {
        QueryCounters::bump(&self.counters.received);

        let query = match Message::parse_query(packet) {
            Ok(query) => query,
            Err(e) => {
                debug!(error = %e, len = packet.len(), "Dropping malformed packet");
                QueryCounters::bump(&self.counters.dropped);
                return Ok(None);
            }
        };

        let header = query.header();
        if header.response || header.opcode != Opcode::Query {
            debug!(
                id = header.id,
                response = header.response,
                opcode = header.opcode.as_str(),
                "Dropping packet that is not a standard query"
            );
            QueryCounters::bump(&self.counters.dropped);
            return Ok(None);
        }

        let key = query.question().key();
        if let Some(cache) = &self.cache {
            if let Some(mut cached) = cache.get(&key) {
                splice_query_fields(
                    &mut cached,
                    header.id,
                    header.recursion_desired,
                    &query.question().name.to_wire(),
                );
                QueryCounters::bump(&self.counters.cache_hits);
                QueryCounters::bump(&self.counters.answered);
                debug!(question = %key, "Cache hit");
                return Ok(Some(cached));
            }
        }

        let response = match self.resolver.answer(&query).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, question = %key, "Query abandoned");
                QueryCounters::bump(&self.counters.failures);
                return Err(e);
            }
        };

        let bytes = response.encode_for_udp().inspect_err(|e| {
            warn!(error = %e, question = %key, "Failed to encode response");
            QueryCounters::bump(&self.counters.failures);
        })?;

        if let Some(cache) = &self.cache {
            let min_ttl = response.records().map(|r| r.ttl()).min();
            cache.insert(key, bytes.clone(), min_ttl);
        }

        QueryCounters::bump(&self.counters.answered);
        Ok(Some(bytes))
    }
}

/// Overwrites the ID, the RD flag and the question name spelling of an
/// encoded response. The question name sits uncompressed right after the header.
fn splice_query_fields(response: &mut [u8], id: u16, recursion_desired: bool, qname: &[u8]) {
    if response.len() < 3 {
        return;
    }
    response[..2].copy_from_slice(&id.to_be_bytes());
    if recursion_desired {
        response[2] |= RD_BIT;
    } else {
        response[2] &= !RD_BIT;
    }
    if let Some(cached) = response.get_mut(HEADER_LENGTH..HEADER_LENGTH + qname.len()) {
        if cached.eq_ignore_ascii_case(qname) {
            cached.copy_from_slice(qname);
        }
    }
}
