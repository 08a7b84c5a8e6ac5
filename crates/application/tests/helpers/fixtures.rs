#![allow(dead_code)]

use super::MockZoneStore;
use chiral_dns_application::use_cases::{
    HandleDnsPacketUseCase, ResolveQueryUseCase, ZoneAdminUseCase,
};
use chiral_dns_domain::{Message, Name, Question, RecordType, ZoneFileEntry};
use std::sync::Arc;

/// The `mp` test zone: an authoritative apex, a delegated `sub.mp`, a
/// wildcard under `foo.mp` and a two-link CNAME chain.
pub const MP_ZONE: &[&str] = &[
    "mp 43200 SOA ns1.nic.mp hostmaster.nic.mp 3 14400 7200 604800 43200",
    "mp 14400 NS ns1.nic.mp",
    "mp 14400 NS ns2.nic.mp",
    "ns1.nic.mp 14400 A 192.0.2.1",
    "ns2.nic.mp 14400 A 192.0.2.2",
    "nic.mp 3600 A 192.0.2.10",
    "nic.mp 3600 MX 10 mail.nic.mp",
    "nic.mp 3600 TXT \"nic of mp\"",
    "mail.nic.mp 3600 A 192.0.2.25",
    "www.nic.mp 3600 CNAME nic.mp",
    "alias.nic.mp 3600 CNAME www.nic.mp",
    "sub.mp 14400 NS ns.sub.mp",
    "ns.sub.mp 14400 A 192.0.2.53",
    "*.foo.mp 600 A 192.0.2.7",
];

pub struct TestZone {
    pub store: Arc<MockZoneStore>,
    pub admin: Arc<ZoneAdminUseCase>,
    pub resolver: Arc<ResolveQueryUseCase>,
}

impl TestZone {
    pub fn empty() -> Self {
        let store = Arc::new(MockZoneStore::new());
        let admin = Arc::new(ZoneAdminUseCase::new(store.clone()));
        let resolver = Arc::new(ResolveQueryUseCase::new(store.clone()));
        Self {
            store,
            admin,
            resolver,
        }
    }

    pub async fn mp() -> Self {
        let zone = Self::empty();
        zone.load(MP_ZONE).await;
        zone
    }

    pub async fn load(&self, lines: &[&str]) {
        for line in lines {
            let entry = ZoneFileEntry::parse(line)
                .expect("fixture line parses")
                .expect("fixture line is a record");
            self.admin.add_entry(entry).await.expect("fixture loads");
        }
    }

    pub fn packet_handler(&self) -> HandleDnsPacketUseCase {
        HandleDnsPacketUseCase::new(self.resolver.clone())
    }
}

pub fn name(text: &str) -> Name {
    Name::parse(text).expect("valid name")
}

pub fn query(id: u16, qname: &str, qtype: RecordType) -> Message {
    Message::query(id, Question::new(name(qname), qtype))
}

pub fn query_bytes(id: u16, qname: &str, qtype: RecordType) -> Vec<u8> {
    query(id, qname, qtype).to_bytes()
}
