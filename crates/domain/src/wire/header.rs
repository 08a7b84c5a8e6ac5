use super::read_u16;
use crate::compressor::HEADER_LENGTH;
use crate::errors::WireError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Opcode {
    #[default]
    Query,
    IQuery,
    Status,
}

impl Opcode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Opcode::Query),
            1 => Some(Opcode::IQuery),
            2 => Some(Opcode::Status),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Opcode::Query => 0,
            Opcode::IQuery => 1,
            Opcode::Status => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Opcode::Query => "QUERY",
            Opcode::IQuery => "IQUERY",
            Opcode::Status => "STATUS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseCode {
    #[default]
    NoError,
    FormErr,
    ServFail,
    NxDomain,
    NotImp,
    Refused,
}

impl ResponseCode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ResponseCode::NoError),
            1 => Some(ResponseCode::FormErr),
            2 => Some(ResponseCode::ServFail),
            3 => Some(ResponseCode::NxDomain),
            4 => Some(ResponseCode::NotImp),
            5 => Some(ResponseCode::Refused),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            ResponseCode::NoError => 0,
            ResponseCode::FormErr => 1,
            ResponseCode::ServFail => 2,
            ResponseCode::NxDomain => 3,
            ResponseCode::NotImp => 4,
            ResponseCode::Refused => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResponseCode::NoError => "NOERROR",
            ResponseCode::FormErr => "FORMERR",
            ResponseCode::ServFail => "SERVFAIL",
            ResponseCode::NxDomain => "NXDOMAIN",
            ResponseCode::NotImp => "NOTIMP",
            ResponseCode::Refused => "REFUSED",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionCounts {
    pub question: u16,
    pub answer: u16,
    pub authority: u16,
    pub additional: u16,
}

/// The fixed 12-byte message header.
///
/// Section counts are private: a `Message` sets them from its own sections.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    pub id: u16,
    pub response: bool,
    pub opcode: Opcode,
    pub authoritative: bool,
    pub truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
    pub rcode: ResponseCode,
    counts: SectionCounts,
}

const FLAG_QR: u16 = 1 << 15;
const FLAG_AA: u16 = 1 << 10;
const FLAG_TC: u16 = 1 << 9;
const FLAG_RD: u16 = 1 << 8;
const FLAG_RA: u16 = 1 << 7;

impl Header {
    pub fn query(id: u16) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Response header for `query`: same id and opcode, RD echoed.
    pub fn response_to(query: &Header) -> Self {
        Self {
            id: query.id,
            response: true,
            opcode: query.opcode,
            recursion_desired: query.recursion_desired,
            ..Self::default()
        }
    }

    pub fn counts(&self) -> SectionCounts {
        self.counts
    }

    pub(crate) fn with_counts(mut self, counts: SectionCounts) -> Self {
        self.counts = counts;
        self
    }

    pub fn flags(&self) -> u16 {
        let mut flags = ((self.opcode.to_u8() as u16) << 11) | self.rcode.to_u8() as u16;
        if self.response {
            flags |= FLAG_QR;
        }
        if self.authoritative {
            flags |= FLAG_AA;
        }
        if self.truncated {
            flags |= FLAG_TC;
        }
        if self.recursion_desired {
            flags |= FLAG_RD;
        }
        if self.recursion_available {
            flags |= FLAG_RA;
        }
        flags
    }

    /// Parses the header. QDCOUNT must be 1 and OPCODE/RCODE must be known values.
    pub fn read(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < HEADER_LENGTH {
            return Err(WireError::OutOfRange(format!(
                "packet of {} bytes is shorter than the header",
                buf.len()
            )));
        }
        let id = read_u16(buf, 0)?;
        let flags = read_u16(buf, 2)?;
        let counts = SectionCounts {
            question: read_u16(buf, 4)?,
            answer: read_u16(buf, 6)?,
            authority: read_u16(buf, 8)?,
            additional: read_u16(buf, 10)?,
        };
        if counts.question != 1 {
            return Err(WireError::Protocol(format!(
                "QDCOUNT is {}, expected 1",
                counts.question
            )));
        }
        let opcode_bits = ((flags >> 11) & 0x0F) as u8;
        let opcode = Opcode::from_u8(opcode_bits)
            .ok_or_else(|| WireError::Protocol(format!("unsupported opcode {}", opcode_bits)))?;
        let rcode_bits = (flags & 0x0F) as u8;
        let rcode = ResponseCode::from_u8(rcode_bits)
            .ok_or_else(|| WireError::Protocol(format!("unsupported rcode {}", rcode_bits)))?;

        Ok(Self {
            id,
            response: flags & FLAG_QR != 0,
            opcode,
            authoritative: flags & FLAG_AA != 0,
            truncated: flags & FLAG_TC != 0,
            recursion_desired: flags & FLAG_RD != 0,
            recursion_available: flags & FLAG_RA != 0,
            rcode,
            counts,
        })
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.id.to_be_bytes());
        out.extend_from_slice(&self.flags().to_be_bytes());
        out.extend_from_slice(&self.counts.question.to_be_bytes());
        out.extend_from_slice(&self.counts.answer.to_be_bytes());
        out.extend_from_slice(&self.counts.authority.to_be_bytes());
        out.extend_from_slice(&self.counts.additional.to_be_bytes());
    }
}
