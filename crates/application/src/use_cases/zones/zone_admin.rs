use crate::ports::{ZoneNodeInfo, ZoneStore};
use chiral_dns_domain::wire::SUPPORTED_TYPES;
use chiral_dns_domain::{
    DomainError, Name, Rdata, RecordType, ResourceRecord, Soa, ZoneFileEntry, ZoneId,
    ZoneNode, ZoneStatistics, ROOT_ZONE,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Records fetched per type when listing a zone.
const LIST_LIMIT: usize = 1000;

/// Administrative writes and listings over a zone store.
pub struct ZoneAdminUseCase {
    store: Arc<dyn ZoneStore>,
}

impl ZoneAdminUseCase {
    pub fn new(store: Arc<dyn ZoneStore>) -> Self {
        Self { store }
    }

    /// Creates whatever nodes `name` is missing and returns it fully resolved.
    ///
    /// With `wildcard` the deepest node is flagged as a star zone, including
    /// when it already existed.
    #[instrument(skip(self), fields(name = %name))]
    pub async fn add_name(&self, name: &Name, wildcard: bool) -> Result<Name, DomainError> {
        if name.is_root() {
            if wildcard {
                return Err(DomainError::InvalidRecord(
                    "the root cannot be a wildcard zone".to_string(),
                ));
            }
            return Ok(name.resolved(Vec::new())?);
        }

        let resolved = self.store.resolve_name(name).await?;
        let mut zones = resolved.zones().to_vec();
        let missing = name.label_count() - resolved.resolved_count();

        if missing == 0 {
            if wildcard && !resolved.is_star() {
                self.store
                    .set_wildcard_zone(resolved.zone_id(), true)
                    .await?;
                if let Some(last) = zones.last_mut() {
                    last.wildcard = true;
                }
                info!(zone = resolved.zone_id(), "Zone marked as wildcard");
                return Ok(name.resolved(zones)?);
            }
            return Ok(resolved);
        }

        let mut parent = resolved.zone_id();
        for index in (0..missing).rev() {
            let Some(label) = name.label(index) else {
                break;
            };
            let star = wildcard && index == 0;
            let id = self.store.add_zone_node(parent, label, star).await?;
            zones.push(ZoneNode::new(id, star));
            parent = id;
        }
        info!(zone = parent, created = missing, "Zone nodes added");
        Ok(name.resolved(zones)?)
    }

    /// Stores `rdata` at `owner`, creating the owner and every name it references.
    #[instrument(skip(self, rdata), fields(owner = %owner, record_type = %rdata.record_type()))]
    pub async fn add_record(
        &self,
        owner: &Name,
        rdata: Rdata,
    ) -> Result<ResourceRecord, DomainError> {
        let owner = self.add_name(owner, false).await?;
        let rdata = self.resolve_targets(rdata).await?;
        self.store.add_record(owner.zone_id(), &rdata).await?;
        Ok(ResourceRecord::new(owner.to_plain(), rdata))
    }

    /// Applies one parsed zone-file line.
    pub async fn add_entry(&self, entry: ZoneFileEntry) -> Result<ResourceRecord, DomainError> {
        let owner = self.add_name(&entry.name, entry.wildcard).await?;
        let rdata = self.resolve_targets(entry.rdata).await?;
        self.store.add_record(owner.zone_id(), &rdata).await?;
        Ok(ResourceRecord::new(owner.to_plain(), rdata))
    }

    pub async fn find(&self, name: &Name) -> Result<Name, DomainError> {
        self.store.resolve_name(name).await
    }

    /// Resolves `name`, failing unless every label exists.
    pub async fn find_zone(&self, name: &Name) -> Result<Name, DomainError> {
        let resolved = self.store.resolve_name(name).await?;
        if !resolved.is_fully_resolved() {
            return Err(DomainError::NotFound(format!("zone {} does not exist", name)));
        }
        Ok(resolved)
    }

    pub async fn list_children(&self, zone: ZoneId) -> Result<Vec<ZoneNodeInfo>, DomainError> {
        self.store.child_nodes(zone).await
    }

    /// Records at `zone` of the given types, or of every supported type when `types` is empty.
    pub async fn list_records(
        &self,
        zone: ZoneId,
        types: &[RecordType],
    ) -> Result<Vec<(RecordType, Vec<Rdata>)>, DomainError> {
        let types = if types.is_empty() {
            &SUPPORTED_TYPES[..]
        } else {
            types
        };
        let mut listed = Vec::new();
        for &record_type in types {
            let records = self.store.get_records(zone, record_type, LIST_LIMIT).await?;
            if !records.is_empty() {
                listed.push((record_type, records));
            }
        }
        Ok(listed)
    }

    #[instrument(skip(self))]
    pub async fn delete_records(
        &self,
        zone: ZoneId,
        record_type: RecordType,
    ) -> Result<u64, DomainError> {
        let removed = self.store.delete_records(zone, record_type).await?;
        info!(zone, record_type = %record_type, removed, "Records deleted");
        Ok(removed)
    }

    #[instrument(skip(self))]
    pub async fn delete_zone(&self, zone: ZoneId) -> Result<(), DomainError> {
        if zone == ROOT_ZONE {
            return Err(DomainError::ZoneInUse("the root zone cannot be deleted".to_string()));
        }
        if !self.store.child_nodes(zone).await?.is_empty() {
            return Err(DomainError::ZoneInUse(format!("zone {} has child zones", zone)));
        }
        self.store.delete_zone_node(zone).await?;
        info!(zone, "Zone deleted");
        Ok(())
    }

    pub async fn statistics(&self) -> Result<ZoneStatistics, DomainError> {
        self.store.statistics().await
    }

    async fn resolve_targets(&self, rdata: Rdata) -> Result<Rdata, DomainError> {
        Ok(match rdata {
            Rdata::Ns { ttl, server } => Rdata::Ns {
                ttl,
                server: self.add_name(&server, false).await?,
            },
            Rdata::Cname { ttl, target } => Rdata::Cname {
                ttl,
                target: self.add_name(&target, false).await?,
            },
            Rdata::Mx {
                ttl,
                preference,
                exchange,
            } => Rdata::Mx {
                ttl,
                preference,
                exchange: self.add_name(&exchange, false).await?,
            },
            Rdata::Soa(soa) => Rdata::Soa(Soa {
                mname: self.add_name(&soa.mname, false).await?,
                rname: self.add_name(&soa.rname, false).await?,
                ..soa
            }),
            other @ (Rdata::A { .. } | Rdata::Txt { .. }) => other,
        })
    }
}
