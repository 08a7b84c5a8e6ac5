pub mod console;
pub mod dns;
pub mod zones;

pub use console::{ConsoleMode, ConsoleOutput, ConsoleSession};
pub use dns::{
    HandleDnsPacketUseCase, QueryCounters, QueryCountersSnapshot, ResolveQueryUseCase,
    MAX_RECORDS,
};
pub use zones::{LoadReport, LoadZoneFileUseCase, RejectedLine, ZoneAdminUseCase};
