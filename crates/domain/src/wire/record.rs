use super::{read_u16, read_u32, DnsClass, Rdata, RecordType};
use crate::compressor::Compressor;
use crate::errors::WireError;
use crate::name::Name;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Fixed bytes between the owner name and the rdata: TYPE, CLASS, TTL, RDLENGTH.
const FIXED_FIELDS: usize = 10;

#[derive(Debug, Clone)]
pub struct ResourceRecord {
    name: Name,
    rdata: Rdata,
    ttl: u32,
}

impl ResourceRecord {
    pub fn new(name: Name, rdata: Rdata) -> Self {
        let ttl = rdata.ttl();
        Self { name, rdata, ttl }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn rdata(&self) -> &Rdata {
        &self.rdata
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn record_type(&self) -> RecordType {
        self.rdata.record_type()
    }

    pub fn encoded_len(&self) -> usize {
        self.name.encoded_len() + FIXED_FIELDS + self.rdata.encoded_len()
    }

    pub fn compress(
        &self,
        compressor: &mut Compressor,
        offset: usize,
    ) -> Result<(Self, usize), WireError> {
        let name = compressor.compress(&self.name, offset)?;
        let rdata_offset = offset + name.encoded_len() + FIXED_FIELDS;
        let (rdata, next) = self.rdata.compress(compressor, rdata_offset)?;
        Ok((
            Self {
                name,
                rdata,
                ttl: self.ttl,
            },
            next,
        ))
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        self.name.write(out);
        out.extend_from_slice(&self.record_type().to_u16().to_be_bytes());
        out.extend_from_slice(&DnsClass::In.to_u16().to_be_bytes());
        out.extend_from_slice(&self.ttl.to_be_bytes());
        out.extend_from_slice(&(self.rdata.encoded_len() as u16).to_be_bytes());
        self.rdata.write(out);
    }

    pub fn read(buf: &[u8], pos: usize) -> Result<(Self, usize), WireError> {
        let (name, pos) = Name::read(buf, pos)?;
        let rtype = RecordType::from_u16(read_u16(buf, pos)?);
        let class = DnsClass::from_u16(read_u16(buf, pos + 2)?);
        if class != DnsClass::In {
            return Err(WireError::Protocol(format!(
                "record class {} is not IN",
                class
            )));
        }
        let ttl = read_u32(buf, pos + 4)?;
        let rdlength = read_u16(buf, pos + 8)? as usize;
        let rdata_pos = pos + FIXED_FIELDS;
        let rdata = Rdata::read(rtype, ttl, buf, rdata_pos, rdlength)?;
        Ok((Self { name, rdata, ttl }, rdata_pos + rdlength))
    }
}

impl PartialEq for ResourceRecord {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.rdata == other.rdata
    }
}

impl Eq for ResourceRecord {}

impl Hash for ResourceRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.rdata.hash(state);
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} IN {}", self.name, self.ttl, self.rdata)
    }
}
