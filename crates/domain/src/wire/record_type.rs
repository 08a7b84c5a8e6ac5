use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    NS,
    MD,
    MF,
    CNAME,
    SOA,
    MB,
    MG,
    MR,
    NULL,
    WKS,
    PTR,
    HINFO,
    MINFO,
    MX,
    TXT,
    AAAA,
    SRV,
    OPT,
    IXFR,
    AXFR,
    MAILB,
    MAILA,
    ANY,
    Unknown(u16),
}

/// Types this server stores and answers.
pub const SUPPORTED_TYPES: [RecordType; 6] = [
    RecordType::A,
    RecordType::NS,
    RecordType::CNAME,
    RecordType::MX,
    RecordType::SOA,
    RecordType::TXT,
];

/// Types merged into an ANY answer.
pub const ANY_TYPES: [RecordType; 4] = [
    RecordType::A,
    RecordType::MX,
    RecordType::NS,
    RecordType::CNAME,
];

const NAMED: [(RecordType, u16, &str); 24] = [
    (RecordType::A, 1, "A"),
    (RecordType::NS, 2, "NS"),
    (RecordType::MD, 3, "MD"),
    (RecordType::MF, 4, "MF"),
    (RecordType::CNAME, 5, "CNAME"),
    (RecordType::SOA, 6, "SOA"),
    (RecordType::MB, 7, "MB"),
    (RecordType::MG, 8, "MG"),
    (RecordType::MR, 9, "MR"),
    (RecordType::NULL, 10, "NULL"),
    (RecordType::WKS, 11, "WKS"),
    (RecordType::PTR, 12, "PTR"),
    (RecordType::HINFO, 13, "HINFO"),
    (RecordType::MINFO, 14, "MINFO"),
    (RecordType::MX, 15, "MX"),
    (RecordType::TXT, 16, "TXT"),
    (RecordType::AAAA, 28, "AAAA"),
    (RecordType::SRV, 33, "SRV"),
    (RecordType::OPT, 41, "OPT"),
    (RecordType::IXFR, 251, "IXFR"),
    (RecordType::AXFR, 252, "AXFR"),
    (RecordType::MAILB, 253, "MAILB"),
    (RecordType::MAILA, 254, "MAILA"),
    (RecordType::ANY, 255, "ANY"),
];

impl RecordType {
    pub fn to_u16(self) -> u16 {
        if let RecordType::Unknown(code) = self {
            return code;
        }
        NAMED
            .iter()
            .find(|(t, _, _)| *t == self)
            .map_or(0, |(_, code, _)| *code)
    }

    pub fn from_u16(code: u16) -> Self {
        NAMED
            .iter()
            .find(|(_, c, _)| *c == code)
            .map_or(RecordType::Unknown(code), |(t, _, _)| *t)
    }

    /// Mnemonic for named types; `None` for unknown codes.
    pub fn mnemonic(self) -> Option<&'static str> {
        NAMED
            .iter()
            .find(|(t, _, _)| *t == self)
            .map(|(_, _, name)| *name)
    }

    pub fn is_supported(self) -> bool {
        SUPPORTED_TYPES.contains(&self)
    }
}

impl From<u16> for RecordType {
    fn from(code: u16) -> Self {
        Self::from_u16(code)
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        if let Some((t, _, _)) = NAMED.iter().find(|(_, _, name)| *name == upper) {
            return Ok(*t);
        }
        upper
            .strip_prefix("TYPE")
            .and_then(|code| code.parse::<u16>().ok())
            .map(Self::from_u16)
            .ok_or_else(|| format!("Invalid record type: {}", s))
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mnemonic() {
            Some(name) => f.write_str(name),
            None => write!(f, "TYPE{}", self.to_u16()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnsClass {
    In,
    Chaos,
    Hesiod,
    Other(u16),
}

impl DnsClass {
    pub fn to_u16(self) -> u16 {
        match self {
            DnsClass::In => 1,
            DnsClass::Chaos => 3,
            DnsClass::Hesiod => 4,
            DnsClass::Other(code) => code,
        }
    }

    pub fn from_u16(code: u16) -> Self {
        match code {
            1 => DnsClass::In,
            3 => DnsClass::Chaos,
            4 => DnsClass::Hesiod,
            other => DnsClass::Other(other),
        }
    }
}

impl fmt::Display for DnsClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DnsClass::In => f.write_str("IN"),
            DnsClass::Chaos => f.write_str("CH"),
            DnsClass::Hesiod => f.write_str("HS"),
            DnsClass::Other(code) => write!(f, "CLASS{}", code),
        }
    }
}
