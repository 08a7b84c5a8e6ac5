use super::{read_u16, read_u32, RecordType};
use crate::compressor::Compressor;
use crate::errors::WireError;
use crate::name::Name;
use std::fmt;
use std::net::Ipv4Addr;

const TXT_CHUNK: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Soa {
    pub mname: Name,
    pub rname: Name,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

/// Typed record payload. Each variant carries its own TTL; an SOA's TTL is its minimum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Rdata {
    A {
        ttl: u32,
        address: Ipv4Addr,
    },
    Ns {
        ttl: u32,
        server: Name,
    },
    Cname {
        ttl: u32,
        target: Name,
    },
    Mx {
        ttl: u32,
        preference: u16,
        exchange: Name,
    },
    Soa(Soa),
    Txt {
        ttl: u32,
        text: String,
    },
}

impl Rdata {
    pub fn record_type(&self) -> RecordType {
        match self {
            Rdata::A { .. } => RecordType::A,
            Rdata::Ns { .. } => RecordType::NS,
            Rdata::Cname { .. } => RecordType::CNAME,
            Rdata::Mx { .. } => RecordType::MX,
            Rdata::Soa(_) => RecordType::SOA,
            Rdata::Txt { .. } => RecordType::TXT,
        }
    }

    pub fn ttl(&self) -> u32 {
        match self {
            Rdata::A { ttl, .. }
            | Rdata::Ns { ttl, .. }
            | Rdata::Cname { ttl, .. }
            | Rdata::Mx { ttl, .. }
            | Rdata::Txt { ttl, .. } => *ttl,
            Rdata::Soa(soa) => soa.minimum,
        }
    }

    /// Names this payload points at, used to find glue A records.
    pub fn names(&self) -> Vec<&Name> {
        match self {
            Rdata::Ns { server, .. } => vec![server],
            Rdata::Cname { target, .. } => vec![target],
            Rdata::Mx { exchange, .. } => vec![exchange],
            Rdata::Soa(soa) => vec![&soa.mname],
            Rdata::A { .. } | Rdata::Txt { .. } => Vec::new(),
        }
    }

    /// RDLENGTH as written, which shrinks once contained names are compressed.
    pub fn encoded_len(&self) -> usize {
        match self {
            Rdata::A { .. } => 4,
            Rdata::Ns { server, .. } => server.encoded_len(),
            Rdata::Cname { target, .. } => target.encoded_len(),
            Rdata::Mx { exchange, .. } => 2 + exchange.encoded_len(),
            Rdata::Soa(soa) => soa.mname.encoded_len() + soa.rname.encoded_len() + 20,
            Rdata::Txt { text, .. } => text.len() + txt_chunk_count(text),
        }
    }

    /// Compresses contained names as written at `offset`, returning the
    /// payload and the offset just past it.
    pub fn compress(
        &self,
        compressor: &mut Compressor,
        offset: usize,
    ) -> Result<(Self, usize), WireError> {
        let compressed = match self {
            Rdata::A { .. } | Rdata::Txt { .. } => self.clone(),
            Rdata::Ns { ttl, server } => Rdata::Ns {
                ttl: *ttl,
                server: compressor.compress(server, offset)?,
            },
            Rdata::Cname { ttl, target } => Rdata::Cname {
                ttl: *ttl,
                target: compressor.compress(target, offset)?,
            },
            Rdata::Mx {
                ttl,
                preference,
                exchange,
            } => Rdata::Mx {
                ttl: *ttl,
                preference: *preference,
                exchange: compressor.compress(exchange, offset + 2)?,
            },
            Rdata::Soa(soa) => {
                let mname = compressor.compress(&soa.mname, offset)?;
                let rname = compressor.compress(&soa.rname, offset + mname.encoded_len())?;
                Rdata::Soa(Soa {
                    mname,
                    rname,
                    ..soa.clone()
                })
            }
        };
        let next = offset + compressed.encoded_len();
        Ok((compressed, next))
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        match self {
            Rdata::A { address, .. } => out.extend_from_slice(&address.octets()),
            Rdata::Ns { server, .. } => server.write(out),
            Rdata::Cname { target, .. } => target.write(out),
            Rdata::Mx {
                preference,
                exchange,
                ..
            } => {
                out.extend_from_slice(&preference.to_be_bytes());
                exchange.write(out);
            }
            Rdata::Soa(soa) => {
                soa.mname.write(out);
                soa.rname.write(out);
                for value in [soa.serial, soa.refresh, soa.retry, soa.expire, soa.minimum] {
                    out.extend_from_slice(&value.to_be_bytes());
                }
            }
            Rdata::Txt { text, .. } => {
                if text.is_empty() {
                    out.push(0);
                }
                for chunk in text.as_bytes().chunks(TXT_CHUNK) {
                    out.push(chunk.len() as u8);
                    out.extend_from_slice(chunk);
                }
            }
        }
    }

    /// Decodes `rdlength` bytes at `pos` as a payload of `rtype`.
    pub fn read(
        rtype: RecordType,
        ttl: u32,
        buf: &[u8],
        pos: usize,
        rdlength: usize,
    ) -> Result<Self, WireError> {
        let end = pos + rdlength;
        if end > buf.len() {
            return Err(WireError::OutOfRange(format!(
                "rdata at offset {} runs past end of packet",
                pos
            )));
        }
        let (rdata, consumed_to) = match rtype {
            RecordType::A => {
                let octets = buf.get(pos..pos + 4).ok_or_else(|| {
                    WireError::OutOfRange(format!("A rdata at offset {} is truncated", pos))
                })?;
                let address = Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]);
                (Rdata::A { ttl, address }, pos + 4)
            }
            RecordType::NS => {
                let (server, next) = Name::read(buf, pos)?;
                (Rdata::Ns { ttl, server }, next)
            }
            RecordType::CNAME => {
                let (target, next) = Name::read(buf, pos)?;
                (Rdata::Cname { ttl, target }, next)
            }
            RecordType::MX => {
                let preference = read_u16(buf, pos)?;
                let (exchange, next) = Name::read(buf, pos + 2)?;
                (
                    Rdata::Mx {
                        ttl,
                        preference,
                        exchange,
                    },
                    next,
                )
            }
            RecordType::SOA => {
                let (mname, next) = Name::read(buf, pos)?;
                let (rname, next) = Name::read(buf, next)?;
                let soa = Soa {
                    mname,
                    rname,
                    serial: read_u32(buf, next)?,
                    refresh: read_u32(buf, next + 4)?,
                    retry: read_u32(buf, next + 8)?,
                    expire: read_u32(buf, next + 12)?,
                    minimum: read_u32(buf, next + 16)?,
                };
                (Rdata::Soa(soa), next + 20)
            }
            RecordType::TXT => {
                let mut bytes = Vec::with_capacity(rdlength);
                let mut cursor = pos;
                while cursor < end {
                    let len = buf[cursor] as usize;
                    let chunk = buf.get(cursor + 1..cursor + 1 + len).ok_or_else(|| {
                        WireError::OutOfRange(format!(
                            "TXT chunk at offset {} is truncated",
                            cursor
                        ))
                    })?;
                    bytes.extend_from_slice(chunk);
                    cursor += 1 + len;
                }
                let text = String::from_utf8(bytes)
                    .map_err(|_| WireError::InvalidFormat("TXT data is not UTF-8".to_string()))?;
                (Rdata::Txt { ttl, text }, cursor)
            }
            other => {
                return Err(WireError::Protocol(format!(
                    "record type {} is not supported",
                    other
                )));
            }
        };
        if consumed_to != end {
            return Err(WireError::InvalidFormat(format!(
                "{} rdata at offset {} declares {} bytes but holds {}",
                rtype,
                pos,
                rdlength,
                consumed_to.saturating_sub(pos)
            )));
        }
        Ok(rdata)
    }
}

fn txt_chunk_count(text: &str) -> usize {
    text.len().div_ceil(TXT_CHUNK).max(1)
}

impl fmt::Display for Rdata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rdata::A { address, .. } => write!(f, "A {}", address),
            Rdata::Ns { server, .. } => write!(f, "NS {}", server),
            Rdata::Cname { target, .. } => write!(f, "CNAME {}", target),
            Rdata::Mx {
                preference,
                exchange,
                ..
            } => write!(f, "MX {} {}", preference, exchange),
            Rdata::Soa(soa) => write!(
                f,
                "SOA {} {} {} {} {} {} {}",
                soa.mname, soa.rname, soa.serial, soa.refresh, soa.retry, soa.expire, soa.minimum
            ),
            Rdata::Txt { text, .. } => write!(f, "TXT \"{}\"", text),
        }
    }
}
