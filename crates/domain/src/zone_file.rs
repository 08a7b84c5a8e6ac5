//! Line grammar shared by the zone-file loader and the console:
//!
//! ```text
//! mp 43200 SOA ns1.nic.mp hostmaster.nic.mp 3 14400 7200 604800 43200
//! mp 14400 NS ns1.nic.mp
//! nic.mp 14400 MX 10 mail.nic.mp
//! *.foo.mp 1h A 192.0.2.7
//! ; comment
//! # comment
//! ```
use crate::errors::DomainError;
use crate::name::Name;
use crate::wire::{Rdata, RecordType, Soa};
use std::net::Ipv4Addr;

/// Largest RDATA an RDLENGTH field can describe.
pub const MAX_RDATA_LENGTH: usize = u16::MAX as usize;

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneFileEntry {
    pub name: Name,
    /// Set when the owner was written as `*.name`.
    pub wildcard: bool,
    pub rdata: Rdata,
}

impl ZoneFileEntry {
    /// Parses one line. Blank lines and comments yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, DomainError> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            return Ok(None);
        }
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(invalid(format!(
                "expected 'name ttl TYPE args...', got {} fields",
                tokens.len()
            )));
        }

        let (owner, wildcard) = match tokens[0].strip_prefix("*.") {
            Some(rest) => (rest, true),
            None => (tokens[0], false),
        };
        let name = parse_name(owner)?;
        let ttl = parse_ttl(tokens[1])?;
        let record_type: RecordType = tokens[2].parse().map_err(invalid)?;
        let rdata = if record_type == RecordType::TXT {
            parse_txt(ttl, after_fields(trimmed, 3))?
        } else {
            parse_rdata(record_type, ttl, &tokens[3..])?
        };

        Ok(Some(Self {
            name,
            wildcard,
            rdata,
        }))
    }
}

/// Parses a TTL in seconds, or with an `h` (hours) or `d` (days) suffix.
pub fn parse_ttl(text: &str) -> Result<u32, DomainError> {
    let (digits, multiplier) = if let Some(d) = text.strip_suffix(['d', 'D']) {
        (d, 86_400u64)
    } else if let Some(h) = text.strip_suffix(['h', 'H']) {
        (h, 3_600u64)
    } else {
        (text, 1u64)
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(format!("invalid TTL '{}'", text)));
    }
    let value = digits
        .parse::<u64>()
        .ok()
        .and_then(|v| v.checked_mul(multiplier))
        .filter(|v| *v <= i32::MAX as u64)
        .ok_or_else(|| invalid(format!("TTL '{}' is out of range", text)))?;
    Ok(value as u32)
}

/// Builds a payload of `record_type` from its textual arguments.
pub fn parse_rdata(record_type: RecordType, ttl: u32, args: &[&str]) -> Result<Rdata, DomainError> {
    let expect = |count: usize| {
        if args.len() == count {
            Ok(())
        } else {
            Err(invalid(format!(
                "{} takes {} argument(s), got {}",
                record_type,
                count,
                args.len()
            )))
        }
    };

    match record_type {
        RecordType::A => {
            expect(1)?;
            let address: Ipv4Addr = args[0]
                .parse()
                .map_err(|_| invalid(format!("invalid IPv4 address '{}'", args[0])))?;
            Ok(Rdata::A { ttl, address })
        }
        RecordType::NS => {
            expect(1)?;
            Ok(Rdata::Ns {
                ttl,
                server: parse_name(args[0])?,
            })
        }
        RecordType::CNAME => {
            expect(1)?;
            Ok(Rdata::Cname {
                ttl,
                target: parse_name(args[0])?,
            })
        }
        RecordType::MX => {
            expect(2)?;
            let preference = args[0]
                .parse::<u16>()
                .map_err(|_| invalid(format!("invalid MX preference '{}'", args[0])))?;
            Ok(Rdata::Mx {
                ttl,
                preference,
                exchange: parse_name(args[1])?,
            })
        }
        RecordType::SOA => {
            expect(7)?;
            let number = |i: usize| {
                args[i]
                    .parse::<u32>()
                    .map_err(|_| invalid(format!("invalid SOA number '{}'", args[i])))
            };
            Ok(Rdata::Soa(Soa {
                mname: parse_name(args[0])?,
                rname: parse_name(args[1])?,
                serial: number(2)?,
                refresh: number(3)?,
                retry: number(4)?,
                expire: number(5)?,
                minimum: number(6)?,
            }))
        }
        RecordType::TXT => parse_txt(ttl, &args.join(" ")),
        other => Err(invalid(format!("record type {} is not supported", other))),
    }
}

/// Builds a TXT payload from the raw text, dropping one pair of enclosing quotes.
pub fn parse_txt(ttl: u32, raw: &str) -> Result<Rdata, DomainError> {
    if raw.is_empty() {
        return Err(invalid("TXT needs text".to_string()));
    }
    let text = raw
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(raw)
        .to_string();
    let rdata = Rdata::Txt { ttl, text };
    if rdata.encoded_len() > MAX_RDATA_LENGTH {
        return Err(invalid(format!(
            "TXT data of {} bytes exceeds {}",
            rdata.encoded_len(),
            MAX_RDATA_LENGTH
        )));
    }
    Ok(rdata)
}

/// `text` after its first `count` whitespace-separated fields.
fn after_fields(text: &str, count: usize) -> &str {
    let mut rest = text.trim_start();
    for _ in 0..count {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = rest[end..].trim_start();
    }
    rest
}

fn parse_name(text: &str) -> Result<Name, DomainError> {
    Name::parse(text).map_err(|e| invalid(format!("invalid name '{}': {}", text, e)))
}

fn invalid(reason: String) -> DomainError {
    DomainError::InvalidRecord(reason)
}
