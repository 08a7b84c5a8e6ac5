//! Chiral DNS Domain Layer
pub mod compressor;
pub mod config;
pub mod errors;
pub mod name;
pub mod stats;
pub mod wire;
pub mod zone_file;

pub use compressor::{CompressionEntry, Compressor};
pub use config::{CliOverrides, Config};
pub use errors::{DomainError, WireError};
pub use name::{Label, Name, ZoneId, ZoneNode, ROOT_ZONE};
pub use stats::ZoneStatistics;
pub use wire::{
    dump_packet, DnsClass, Header, Message, Opcode, Question, QuestionKey, Rdata,
    ResourceRecord, RecordType, ResponseCode, Soa,
};
pub use zone_file::{parse_rdata, parse_ttl, parse_txt, ZoneFileEntry, MAX_RDATA_LENGTH};
