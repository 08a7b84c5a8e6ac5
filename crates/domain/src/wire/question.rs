use super::{read_u16, DnsClass, RecordType};
use crate::compressor::Compressor;
use crate::errors::WireError;
use crate::name::Name;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: Name,
    pub qtype: RecordType,
    pub qclass: DnsClass,
}

impl Question {
    pub fn new(name: Name, qtype: RecordType) -> Self {
        Self {
            name,
            qtype,
            qclass: DnsClass::In,
        }
    }

    /// Reads a question at `pos`, returning it and the offset after it.
    /// Only the IN class is accepted.
    pub fn read(buf: &[u8], pos: usize) -> Result<(Self, usize), WireError> {
        let (name, pos) = Name::read(buf, pos)?;
        let qtype = RecordType::from_u16(read_u16(buf, pos)?);
        let qclass = DnsClass::from_u16(read_u16(buf, pos + 2)?);
        if qclass != DnsClass::In {
            return Err(WireError::Protocol(format!(
                "question class {} is not IN",
                qclass
            )));
        }
        Ok((
            Self {
                name,
                qtype,
                qclass,
            },
            pos + 4,
        ))
    }

    pub fn encoded_len(&self) -> usize {
        self.name.encoded_len() + 4
    }

    pub fn compress(
        &self,
        compressor: &mut Compressor,
        offset: usize,
    ) -> Result<(Self, usize), WireError> {
        let name = compressor.compress(&self.name, offset)?;
        let next = offset + name.encoded_len() + 4;
        Ok((
            Self {
                name,
                qtype: self.qtype,
                qclass: self.qclass,
            },
            next,
        ))
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        self.name.write(out);
        out.extend_from_slice(&self.qtype.to_u16().to_be_bytes());
        out.extend_from_slice(&self.qclass.to_u16().to_be_bytes());
    }

    pub fn key(&self) -> QuestionKey {
        QuestionKey {
            name: self.name.to_plain(),
            qtype: self.qtype,
        }
    }
}

/// Cache key for a question: the name (case-insensitive) and the query type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuestionKey {
    name: Name,
    qtype: RecordType,
}

impl QuestionKey {
    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn qtype(&self) -> RecordType {
        self.qtype
    }
}

impl From<&Question> for QuestionKey {
    fn from(question: &Question) -> Self {
        question.key()
    }
}

impl fmt::Display for QuestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.qtype)
    }
}
