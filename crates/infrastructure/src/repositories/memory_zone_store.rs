use async_trait::async_trait;
use chiral_dns_application::ports::{ZoneNodeInfo, ZoneStore};
use chiral_dns_domain::{
    DomainError, Label, Name, Rdata, RecordType, Soa, ZoneId, ZoneNode, ZoneStatistics, ROOT_ZONE,
};
use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;

struct Node {
    label: Label,
    parent: ZoneId,
    wildcard: bool,
}

struct Tree {
    nodes: FxHashMap<ZoneId, Node>,
    /// `(parent, label)` to child. Label hashing ignores case.
    children: FxHashMap<(ZoneId, Label), ZoneId>,
    records: FxHashMap<ZoneId, Vec<Rdata>>,
    next_zone: ZoneId,
    next_record: i64,
}

impl Tree {
    fn name_of(&self, zone: ZoneId) -> Option<Name> {
        let mut labels = Vec::new();
        let mut nodes = Vec::new();
        let mut current = zone;
        while current != ROOT_ZONE {
            let node = self.nodes.get(&current)?;
            labels.push(node.label.clone());
            nodes.push(ZoneNode::new(current, node.wildcard));
            current = node.parent;
        }
        nodes.reverse();
        Name::from_labels(labels).and_then(|n| n.resolved(nodes)).ok()
    }

    /// Target names are kept as zone references and rebuilt on read, so
    /// wildcard changes show up in returned names.
    fn materialize(&self, rdata: &Rdata) -> Result<Rdata, DomainError> {
        let name = |target: &Name| {
            self.name_of(target.zone_id()).ok_or_else(|| {
                DomainError::StoreFailure(format!(
                    "record references missing zone {}",
                    target.zone_id()
                ))
            })
        };
        Ok(match rdata {
            Rdata::Ns { ttl, server } => Rdata::Ns {
                ttl: *ttl,
                server: name(server)?,
            },
            Rdata::Cname { ttl, target } => Rdata::Cname {
                ttl: *ttl,
                target: name(target)?,
            },
            Rdata::Mx {
                ttl,
                preference,
                exchange,
            } => Rdata::Mx {
                ttl: *ttl,
                preference: *preference,
                exchange: name(exchange)?,
            },
            Rdata::Soa(soa) => Rdata::Soa(Soa {
                mname: name(&soa.mname)?,
                rname: name(&soa.rname)?,
                ..soa.clone()
            }),
            other @ (Rdata::A { .. } | Rdata::Txt { .. }) => other.clone(),
        })
    }

    fn is_referenced(&self, zone: ZoneId) -> bool {
        self.records
            .iter()
            .filter(|(owner, _)| **owner != zone)
            .flat_map(|(_, records)| records)
            .any(|rdata| target_zones(rdata).contains(&zone))
    }

    fn count(&self, record_type: RecordType) -> u64 {
        self.records
            .values()
            .flatten()
            .filter(|rdata| rdata.record_type() == record_type)
            .count() as u64
    }
}

fn target_zones(rdata: &Rdata) -> Vec<ZoneId> {
    match rdata {
        Rdata::Soa(soa) => vec![soa.mname.zone_id(), soa.rname.zone_id()],
        other => other.names().iter().map(|name| name.zone_id()).collect(),
    }
}

/// Process-local zone store for tests and for serving a preloaded zone file.
pub struct InMemoryZoneStore {
    tree: RwLock<Tree>,
    started_at: DateTime<Utc>,
}

impl InMemoryZoneStore {
    pub fn new() -> Self {
        Self {
            tree: RwLock::new(Tree {
                nodes: FxHashMap::default(),
                children: FxHashMap::default(),
                records: FxHashMap::default(),
                next_zone: ROOT_ZONE + 1,
                next_record: 1,
            }),
            started_at: Utc::now(),
        }
    }
}

impl Default for InMemoryZoneStore {
    fn default() -> Self {
        Self::new()
    }
}

fn missing(zone: ZoneId) -> DomainError {
    DomainError::NotFound(format!("zone {} does not exist", zone))
}

#[async_trait]
impl ZoneStore for InMemoryZoneStore {
    async fn resolve_name(&self, name: &Name) -> Result<Name, DomainError> {
        let tree = self.tree.read().await;
        let mut zones = Vec::with_capacity(name.label_count());
        let mut parent = ROOT_ZONE;
        for label in name.labels().iter().rev() {
            let Some(&id) = tree.children.get(&(parent, label.clone())) else {
                break;
            };
            let wildcard = tree.nodes.get(&id).is_some_and(|node| node.wildcard);
            zones.push(ZoneNode::new(id, wildcard));
            parent = id;
        }
        Ok(name.resolved(zones)?)
    }

    async fn get_records(
        &self,
        zone: ZoneId,
        record_type: RecordType,
        limit: usize,
    ) -> Result<Vec<Rdata>, DomainError> {
        let tree = self.tree.read().await;
        let Some(records) = tree.records.get(&zone) else {
            return Ok(Vec::new());
        };
        records
            .iter()
            .filter(|rdata| rdata.record_type() == record_type)
            .take(limit)
            .map(|rdata| tree.materialize(rdata))
            .collect()
    }

    async fn is_wildcard_zone(&self, zone: ZoneId) -> Result<bool, DomainError> {
        let tree = self.tree.read().await;
        Ok(tree.nodes.get(&zone).is_some_and(|node| node.wildcard))
    }

    async fn name_for_zone_node(&self, zone: ZoneId) -> Result<Option<Name>, DomainError> {
        let tree = self.tree.read().await;
        Ok(tree.name_of(zone))
    }

    async fn add_zone_node(
        &self,
        parent: ZoneId,
        label: &Label,
        wildcard: bool,
    ) -> Result<ZoneId, DomainError> {
        let mut tree = self.tree.write().await;
        if parent != ROOT_ZONE && !tree.nodes.contains_key(&parent) {
            return Err(missing(parent));
        }
        let key = (parent, label.clone());
        if tree.children.contains_key(&key) {
            return Err(DomainError::InvalidRecord(format!(
                "zone {} already has a child labelled '{}'",
                parent, label
            )));
        }

        let id = tree.next_zone;
        tree.next_zone += 1;
        tree.children.insert(key, id);
        tree.nodes.insert(
            id,
            Node {
                label: label.clone(),
                parent,
                wildcard,
            },
        );
        Ok(id)
    }

    async fn add_record(&self, zone: ZoneId, rdata: &Rdata) -> Result<i64, DomainError> {
        let mut tree = self.tree.write().await;
        if zone != ROOT_ZONE && !tree.nodes.contains_key(&zone) {
            return Err(missing(zone));
        }
        let unresolved = match rdata {
            Rdata::Soa(soa) => !soa.mname.is_fully_resolved() || !soa.rname.is_fully_resolved(),
            other => other.names().iter().any(|name| !name.is_fully_resolved()),
        };
        if unresolved {
            return Err(DomainError::InvalidRecord(
                "target names must be resolved before they are stored".to_string(),
            ));
        }

        let id = tree.next_record;
        tree.next_record += 1;
        tree.records.entry(zone).or_default().push(rdata.clone());
        Ok(id)
    }

    async fn child_nodes(&self, zone: ZoneId) -> Result<Vec<ZoneNodeInfo>, DomainError> {
        let tree = self.tree.read().await;
        let mut children: Vec<ZoneNodeInfo> = tree
            .nodes
            .iter()
            .filter(|(_, node)| node.parent == zone)
            .map(|(&id, node)| ZoneNodeInfo {
                id,
                label: node.label.clone(),
                wildcard: node.wildcard,
            })
            .collect();
        children.sort_by_key(|child| child.id);
        Ok(children)
    }

    async fn set_wildcard_zone(&self, zone: ZoneId, wildcard: bool) -> Result<(), DomainError> {
        let mut tree = self.tree.write().await;
        let node = tree.nodes.get_mut(&zone).ok_or_else(|| missing(zone))?;
        node.wildcard = wildcard;
        Ok(())
    }

    async fn delete_records(
        &self,
        zone: ZoneId,
        record_type: RecordType,
    ) -> Result<u64, DomainError> {
        let mut tree = self.tree.write().await;
        let Some(records) = tree.records.get_mut(&zone) else {
            return Ok(0);
        };
        let before = records.len();
        records.retain(|rdata| rdata.record_type() != record_type);
        Ok((before - records.len()) as u64)
    }

    async fn delete_zone_node(&self, zone: ZoneId) -> Result<(), DomainError> {
        let mut tree = self.tree.write().await;
        if zone == ROOT_ZONE {
            return Err(DomainError::ZoneInUse(
                "the root zone cannot be deleted".to_string(),
            ));
        }
        if tree.nodes.values().any(|node| node.parent == zone) {
            return Err(DomainError::ZoneInUse(format!("zone {} has child zones", zone)));
        }
        if tree.is_referenced(zone) {
            return Err(DomainError::ZoneInUse(format!(
                "zone {} is referenced by other records",
                zone
            )));
        }

        let node = tree.nodes.remove(&zone).ok_or_else(|| missing(zone))?;
        tree.children.remove(&(node.parent, node.label));
        tree.records.remove(&zone);
        Ok(())
    }

    async fn statistics(&self) -> Result<ZoneStatistics, DomainError> {
        let tree = self.tree.read().await;
        Ok(ZoneStatistics {
            started_at: self.started_at,
            zones: tree.nodes.len() as u64,
            a_records: tree.count(RecordType::A),
            ns_records: tree.count(RecordType::NS),
            cname_records: tree.count(RecordType::CNAME),
            mx_records: tree.count(RecordType::MX),
            soa_records: tree.count(RecordType::SOA),
            txt_records: tree.count(RecordType::TXT),
        })
    }
}
