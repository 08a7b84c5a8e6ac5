use chiral_dns_domain::{
    parse_ttl, DomainError, Name, Rdata, RecordType, ZoneFileEntry, MAX_RDATA_LENGTH,
};
use std::net::Ipv4Addr;

fn entry(line: &str) -> ZoneFileEntry {
    ZoneFileEntry::parse(line).unwrap().unwrap()
}

#[test]
fn test_comments_and_blank_lines_are_skipped() {
    assert!(ZoneFileEntry::parse("").unwrap().is_none());
    assert!(ZoneFileEntry::parse("   ").unwrap().is_none());
    assert!(ZoneFileEntry::parse("# a comment").unwrap().is_none());
    assert!(ZoneFileEntry::parse("  ; another").unwrap().is_none());
}

#[test]
fn test_soa_line() {
    let parsed = entry("mp 43200 SOA ns1.nic.mp hostmaster.nic.mp 3 14400 7200 604800 43200");

    assert_eq!(parsed.name, Name::parse("mp").unwrap());
    assert!(!parsed.wildcard);
    match parsed.rdata {
        Rdata::Soa(soa) => {
            assert_eq!(soa.mname, Name::parse("ns1.nic.mp").unwrap());
            assert_eq!(soa.serial, 3);
            assert_eq!(soa.minimum, 43200);
        }
        other => panic!("expected SOA, got {}", other),
    }
}

#[test]
fn test_mx_and_ns_lines() {
    let mx = entry("nic.mp 14400 MX 10 mail.nic.mp");
    assert_eq!(
        mx.rdata,
        Rdata::Mx {
            ttl: 14400,
            preference: 10,
            exchange: Name::parse("mail.nic.mp").unwrap(),
        }
    );

    let ns = entry("mp 1d ns ns1.nic.mp");
    assert_eq!(ns.rdata.record_type(), RecordType::NS);
    assert_eq!(ns.rdata.ttl(), 86_400);
}

#[test]
fn test_wildcard_owner() {
    let parsed = entry("*.foo.mp 1h A 192.0.2.7");

    assert!(parsed.wildcard);
    assert_eq!(parsed.name, Name::parse("foo.mp").unwrap());
    assert_eq!(
        parsed.rdata,
        Rdata::A {
            ttl: 3600,
            address: Ipv4Addr::new(192, 0, 2, 7),
        }
    );
}

#[test]
fn test_txt_joins_and_unquotes() {
    let parsed = entry("nic.mp 60 TXT \"hello zone world\"");

    assert_eq!(
        parsed.rdata,
        Rdata::Txt {
            ttl: 60,
            text: "hello zone world".to_string(),
        }
    );
}

#[test]
fn test_txt_keeps_inner_whitespace() {
    let parsed = entry("nic.mp 60   TXT  \"two  spaces\tand a tab\"  ");

    assert_eq!(
        parsed.rdata,
        Rdata::Txt {
            ttl: 60,
            text: "two  spaces\tand a tab".to_string(),
        }
    );
}

#[test]
fn test_txt_longer_than_rdlength_is_rejected() {
    let line = format!("nic.mp 60 TXT {}", "x".repeat(MAX_RDATA_LENGTH));

    assert!(matches!(
        ZoneFileEntry::parse(&line),
        Err(DomainError::InvalidRecord(_))
    ));
}

#[test]
fn test_txt_at_rdlength_limit_is_accepted() {
    // 256 chunks of up to 255 bytes, each with a length byte.
    let text = "x".repeat(MAX_RDATA_LENGTH - 256);
    let parsed = entry(&format!("nic.mp 60 TXT {}", text));

    assert_eq!(parsed.rdata.encoded_len(), MAX_RDATA_LENGTH);
}

#[test]
fn test_wrong_argument_count() {
    let err = ZoneFileEntry::parse("nic.mp 60 MX mail.nic.mp").unwrap_err();

    assert!(matches!(err, DomainError::InvalidRecord(_)));
}

#[test]
fn test_unsupported_type() {
    assert!(ZoneFileEntry::parse("nic.mp 60 AAAA ::1").is_err());
    assert!(ZoneFileEntry::parse("nic.mp 60 BOGUS x").is_err());
}

#[test]
fn test_bad_address() {
    assert!(ZoneFileEntry::parse("nic.mp 60 A 300.1.1.1").is_err());
}

#[test]
fn test_ttl_suffixes_and_bounds() {
    assert_eq!(parse_ttl("300").unwrap(), 300);
    assert_eq!(parse_ttl("12h").unwrap(), 43_200);
    assert_eq!(parse_ttl("2D").unwrap(), 172_800);
    assert_eq!(parse_ttl("2147483647").unwrap(), i32::MAX as u32);

    assert!(parse_ttl("2147483648").is_err());
    assert!(parse_ttl("-5").is_err());
    assert!(parse_ttl("h").is_err());
    assert!(parse_ttl("99999999d").is_err());
}
