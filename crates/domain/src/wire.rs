//! RFC1035 message encoding and decoding.
mod header;
mod message;
mod packet_dumper;
mod question;
mod rdata;
mod record;
mod record_type;

pub use header::{Header, Opcode, ResponseCode, SectionCounts};
pub use message::{Message, MAX_UDP_PAYLOAD};
pub use packet_dumper::dump_packet;
pub use question::{Question, QuestionKey};
pub use rdata::{Rdata, Soa};
pub use record::ResourceRecord;
pub use record_type::{DnsClass, RecordType, ANY_TYPES, SUPPORTED_TYPES};

use crate::errors::WireError;

pub(crate) fn read_u16(buf: &[u8], pos: usize) -> Result<u16, WireError> {
    buf.get(pos..pos + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .ok_or_else(|| {
            WireError::OutOfRange(format!("16-bit field at offset {} is truncated", pos))
        })
}

pub(crate) fn read_u32(buf: &[u8], pos: usize) -> Result<u32, WireError> {
    buf.get(pos..pos + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| {
            WireError::OutOfRange(format!("32-bit field at offset {} is truncated", pos))
        })
}
