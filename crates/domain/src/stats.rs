use chrono::{DateTime, Utc};
use serde::Serialize;

/// Row counts of a zone store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneStatistics {
    pub started_at: DateTime<Utc>,
    pub zones: u64,
    pub a_records: u64,
    pub ns_records: u64,
    pub cname_records: u64,
    pub mx_records: u64,
    pub soa_records: u64,
    pub txt_records: u64,
}

impl ZoneStatistics {
    pub fn empty(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            zones: 0,
            a_records: 0,
            ns_records: 0,
            cname_records: 0,
            mx_records: 0,
            soa_records: 0,
            txt_records: 0,
        }
    }

    pub fn total_records(&self) -> u64 {
        self.a_records
            + self.ns_records
            + self.cname_records
            + self.mx_records
            + self.soa_records
            + self.txt_records
    }
}
