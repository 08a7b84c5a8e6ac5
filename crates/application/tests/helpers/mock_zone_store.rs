#![allow(dead_code)]

use async_trait::async_trait;
use chiral_dns_application::ports::{ZoneNodeInfo, ZoneStore};
use chiral_dns_domain::{
    DomainError, Label, Name, Rdata, RecordType, ZoneId, ZoneNode, ZoneStatistics, ROOT_ZONE,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
struct MockNode {
    label: Label,
    parent: ZoneId,
    wildcard: bool,
}

#[derive(Default)]
struct State {
    nodes: HashMap<ZoneId, MockNode>,
    records: Vec<(i64, ZoneId, Rdata)>,
    next_id: ZoneId,
}

#[derive(Clone)]
pub struct MockZoneStore {
    state: Arc<RwLock<State>>,
    should_fail: Arc<RwLock<bool>>,
    resolve_calls: Arc<AtomicUsize>,
}

impl MockZoneStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State {
                next_id: 1,
                ..State::default()
            })),
            should_fail: Arc::new(RwLock::new(false)),
            resolve_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub async fn set_should_fail(&self, fail: bool) {
        *self.should_fail.write().await = fail;
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    pub async fn node_count(&self) -> usize {
        self.state.read().await.nodes.len()
    }

    pub async fn record_count(&self) -> usize {
        self.state.read().await.records.len()
    }

    async fn check(&self) -> Result<(), DomainError> {
        if *self.should_fail.read().await {
            return Err(DomainError::StoreFailure("mock store failure".to_string()));
        }
        Ok(())
    }

    fn child(state: &State, parent: ZoneId, label: &Label) -> Option<(ZoneId, bool)> {
        state
            .nodes
            .iter()
            .find(|(_, node)| node.parent == parent && &node.label == label)
            .map(|(id, node)| (*id, node.wildcard))
    }

    fn name_of(state: &State, zone: ZoneId) -> Option<Name> {
        let mut labels = Vec::new();
        let mut zones = Vec::new();
        let mut current = zone;
        while current != ROOT_ZONE {
            let node = state.nodes.get(&current)?;
            labels.push(node.label.clone());
            zones.push(ZoneNode::new(current, node.wildcard));
            current = node.parent;
        }
        zones.reverse();
        Name::from_labels(labels).ok()?.resolved(zones).ok()
    }

    fn resolved_names(state: &State, rdata: &Rdata) -> Option<Rdata> {
        let fetch = |name: &Name| Self::name_of(state, name.zone_id());
        Some(match rdata {
            Rdata::Ns { ttl, server } => Rdata::Ns {
                ttl: *ttl,
                server: fetch(server)?,
            },
            Rdata::Cname { ttl, target } => Rdata::Cname {
                ttl: *ttl,
                target: fetch(target)?,
            },
            Rdata::Mx {
                ttl,
                preference,
                exchange,
            } => Rdata::Mx {
                ttl: *ttl,
                preference: *preference,
                exchange: fetch(exchange)?,
            },
            Rdata::Soa(soa) => {
                let mut soa = soa.clone();
                soa.mname = fetch(&soa.mname)?;
                soa.rname = fetch(&soa.rname)?;
                Rdata::Soa(soa)
            }
            other => other.clone(),
        })
    }
}

#[async_trait]
impl ZoneStore for MockZoneStore {
    async fn resolve_name(&self, name: &Name) -> Result<Name, DomainError> {
        self.check().await?;
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;
        let mut zones = Vec::new();
        let mut parent = ROOT_ZONE;
        for label in name.labels().iter().rev() {
            match Self::child(&state, parent, label) {
                Some((id, wildcard)) => {
                    zones.push(ZoneNode::new(id, wildcard));
                    parent = id;
                }
                None => break,
            }
        }
        Ok(name.resolved(zones)?)
    }

    async fn get_records(
        &self,
        zone: ZoneId,
        record_type: RecordType,
        limit: usize,
    ) -> Result<Vec<Rdata>, DomainError> {
        self.check().await?;
        let state = self.state.read().await;
        Ok(state
            .records
            .iter()
            .filter(|(_, z, rdata)| *z == zone && rdata.record_type() == record_type)
            .filter_map(|(_, _, rdata)| Self::resolved_names(&state, rdata))
            .take(limit)
            .collect())
    }

    async fn is_wildcard_zone(&self, zone: ZoneId) -> Result<bool, DomainError> {
        self.check().await?;
        let state = self.state.read().await;
        Ok(state.nodes.get(&zone).is_some_and(|node| node.wildcard))
    }

    async fn name_for_zone_node(&self, zone: ZoneId) -> Result<Option<Name>, DomainError> {
        self.check().await?;
        let state = self.state.read().await;
        Ok(Self::name_of(&state, zone))
    }

    async fn add_zone_node(
        &self,
        parent: ZoneId,
        label: &Label,
        wildcard: bool,
    ) -> Result<ZoneId, DomainError> {
        self.check().await?;
        let mut state = self.state.write().await;
        if parent != ROOT_ZONE && !state.nodes.contains_key(&parent) {
            return Err(DomainError::NotFound(format!("zone {}", parent)));
        }
        if Self::child(&state, parent, label).is_some() {
            return Err(DomainError::InvalidRecord(format!(
                "duplicate label {} under zone {}",
                label, parent
            )));
        }
        let id = state.next_id;
        state.next_id += 1;
        state.nodes.insert(
            id,
            MockNode {
                label: label.clone(),
                parent,
                wildcard,
            },
        );
        Ok(id)
    }

    async fn add_record(&self, zone: ZoneId, rdata: &Rdata) -> Result<i64, DomainError> {
        self.check().await?;
        if rdata.names().iter().any(|name| !name.is_fully_resolved()) {
            return Err(DomainError::InvalidRecord(
                "record names must be resolved".to_string(),
            ));
        }
        let mut state = self.state.write().await;
        let id = state.records.len() as i64 + 1;
        state.records.push((id, zone, rdata.clone()));
        Ok(id)
    }

    async fn child_nodes(&self, zone: ZoneId) -> Result<Vec<ZoneNodeInfo>, DomainError> {
        self.check().await?;
        let state = self.state.read().await;
        let mut children: Vec<ZoneNodeInfo> = state
            .nodes
            .iter()
            .filter(|(_, node)| node.parent == zone)
            .map(|(id, node)| ZoneNodeInfo {
                id: *id,
                label: node.label.clone(),
                wildcard: node.wildcard,
            })
            .collect();
        children.sort_by_key(|child| child.id);
        Ok(children)
    }

    async fn set_wildcard_zone(&self, zone: ZoneId, wildcard: bool) -> Result<(), DomainError> {
        self.check().await?;
        let mut state = self.state.write().await;
        let node = state
            .nodes
            .get_mut(&zone)
            .ok_or_else(|| DomainError::NotFound(format!("zone {}", zone)))?;
        node.wildcard = wildcard;
        Ok(())
    }

    async fn delete_records(
        &self,
        zone: ZoneId,
        record_type: RecordType,
    ) -> Result<u64, DomainError> {
        self.check().await?;
        let mut state = self.state.write().await;
        let before = state.records.len();
        state
            .records
            .retain(|(_, z, rdata)| !(*z == zone && rdata.record_type() == record_type));
        Ok((before - state.records.len()) as u64)
    }

    async fn delete_zone_node(&self, zone: ZoneId) -> Result<(), DomainError> {
        self.check().await?;
        let mut state = self.state.write().await;
        if state.nodes.values().any(|node| node.parent == zone) {
            return Err(DomainError::ZoneInUse(format!("zone {} has children", zone)));
        }
        let referenced = state.records.iter().any(|(_, owner, rdata)| {
            *owner != zone && rdata.names().iter().any(|name| name.zone_id() == zone)
        });
        if referenced {
            return Err(DomainError::ZoneInUse(format!("zone {} is referenced", zone)));
        }
        state.records.retain(|(_, owner, _)| *owner != zone);
        state
            .nodes
            .remove(&zone)
            .map(|_| ())
            .ok_or_else(|| DomainError::NotFound(format!("zone {}", zone)))
    }

    async fn statistics(&self) -> Result<ZoneStatistics, DomainError> {
        self.check().await?;
        let state = self.state.read().await;
        let count = |record_type: RecordType| {
            state
                .records
                .iter()
                .filter(|(_, _, rdata)| rdata.record_type() == record_type)
                .count() as u64
        };
        let mut stats = ZoneStatistics::empty(chrono::Utc::now());
        stats.zones = state.nodes.len() as u64;
        stats.a_records = count(RecordType::A);
        stats.ns_records = count(RecordType::NS);
        stats.cname_records = count(RecordType::CNAME);
        stats.mx_records = count(RecordType::MX);
        stats.soa_records = count(RecordType::SOA);
        stats.txt_records = count(RecordType::TXT);
        Ok(stats)
    }
}
