mod handle_packet;
mod resolve_query;

pub use handle_packet::{HandleDnsPacketUseCase, QueryCounters, QueryCountersSnapshot};
pub use resolve_query::{ResolveQueryUseCase, MAX_RECORDS};
