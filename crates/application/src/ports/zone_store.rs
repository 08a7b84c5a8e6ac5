use async_trait::async_trait;
use chiral_dns_domain::{DomainError, Label, Name, Rdata, RecordType, ZoneId, ZoneStatistics};

/// One child of a zone node, as listed by the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneNodeInfo {
    pub id: ZoneId,
    pub label: Label,
    pub wildcard: bool,
}

/// Hierarchical store of zone nodes and the records attached to them.
///
/// Node 0 is the root. Names inside returned payloads are fully resolved.
#[async_trait]
pub trait ZoneStore: Send + Sync {
    /// Attaches zone nodes to as many root-ward labels of `name` as exist.
    async fn resolve_name(&self, name: &Name) -> Result<Name, DomainError>;

    /// At most `limit` payloads of `record_type` at `zone`. Unsupported types yield nothing.
    async fn get_records(
        &self,
        zone: ZoneId,
        record_type: RecordType,
        limit: usize,
    ) -> Result<Vec<Rdata>, DomainError>;

    async fn is_wildcard_zone(&self, zone: ZoneId) -> Result<bool, DomainError>;

    /// Inverse of `resolve_name`: the fully resolved name of a node.
    async fn name_for_zone_node(&self, zone: ZoneId) -> Result<Option<Name>, DomainError>;

    async fn add_zone_node(
        &self,
        parent: ZoneId,
        label: &Label,
        wildcard: bool,
    ) -> Result<ZoneId, DomainError>;

    /// Stores `rdata` at `zone`. Names it references must be fully resolved.
    async fn add_record(&self, zone: ZoneId, rdata: &Rdata) -> Result<i64, DomainError>;

    async fn child_nodes(&self, zone: ZoneId) -> Result<Vec<ZoneNodeInfo>, DomainError>;

    async fn set_wildcard_zone(&self, zone: ZoneId, wildcard: bool) -> Result<(), DomainError>;

    /// Returns how many records were removed.
    async fn delete_records(&self, zone: ZoneId, record_type: RecordType)
        -> Result<u64, DomainError>;

    /// Removes a childless node and its records. Fails with `ZoneInUse` when
    /// the node has children or other records point at it.
    async fn delete_zone_node(&self, zone: ZoneId) -> Result<(), DomainError>;

    async fn statistics(&self) -> Result<ZoneStatistics, DomainError>;
}
