use crate::ports::ZoneStore;
use chiral_dns_domain::wire::ANY_TYPES;
use chiral_dns_domain::{
    DomainError, Header, Message, Name, Question, RecordType, ResourceRecord, ResponseCode,
    ZoneId, ROOT_ZONE,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Default upper bound on records fetched per (zone, type).
pub const MAX_RECORDS: usize = 13;

/// Answers questions from a zone store.
pub struct ResolveQueryUseCase {
    store: Arc<dyn ZoneStore>,
    record_limit: usize,
}

impl ResolveQueryUseCase {
    pub fn new(store: Arc<dyn ZoneStore>) -> Self {
        Self {
            store,
            record_limit: MAX_RECORDS,
        }
    }

    pub fn with_record_limit(mut self, record_limit: usize) -> Self {
        self.record_limit = record_limit.max(1);
        self
    }

    /// Builds the response to `query`.
    ///
    /// Absent data yields an empty answer, never an error. Only store failures
    /// are returned as errors.
    #[instrument(
        skip(self, query),
        fields(qname = %query.question().name, qtype = %query.question().qtype)
    )]
    pub async fn answer(&self, query: &Message) -> Result<Message, DomainError> {
        let question = query.question();
        let name = self.store.resolve_name(&question.name).await?;

        let mut answer = self
            .record_set(&name, &question.name, question.qtype)
            .await?;

        if answer.is_empty() && !matches!(question.qtype, RecordType::CNAME | RecordType::ANY) {
            answer = self.follow_cname(&name, &question.name, question.qtype).await?;
        }

        let authority = self.get_authority(&name, answer.is_empty()).await?;
        let authoritative = self.is_authoritative(&name).await?;

        let rcode = if name.is_fully_resolved() || name.is_star() || !authoritative {
            ResponseCode::NoError
        } else {
            ResponseCode::NxDomain
        };

        let additional = self.glue(&answer, &authority).await?;

        debug!(
            answers = answer.len(),
            authority = authority.len(),
            additional = additional.len(),
            authoritative,
            rcode = %rcode,
            "Query resolved"
        );

        let mut header = Header::response_to(query.header());
        header.authoritative = authoritative;
        header.rcode = rcode;

        Ok(Message::new(
            header,
            Question::new(question.name.clone(), question.qtype),
            answer,
            authority,
            additional,
        ))
    }

    /// NS or SOA records for the authority section.
    ///
    /// Climbing always runs from the fully resolved prefix toward the root and
    /// the first non-empty level wins.
    pub async fn get_authority(
        &self,
        name: &Name,
        no_answer: bool,
    ) -> Result<Vec<ResourceRecord>, DomainError> {
        if name.is_star() && no_answer {
            return self.first_of(name, &[RecordType::SOA]).await;
        }

        if no_answer {
            let prefix = name.fully_resolved_prefix().to_plain();
            if name.resolved_count() > 0 {
                let zone = name.zone_id();
                let cut = self.records_at(zone, &prefix, RecordType::NS).await?;
                if !cut.is_empty() && !self.has_records(zone, RecordType::SOA).await? {
                    return Ok(cut);
                }
            }
            return self.first_of(name, &[RecordType::SOA]).await;
        }

        if name.resolved_count() == 0 {
            return self
                .records_at(ROOT_ZONE, &Name::root(), RecordType::NS)
                .await;
        }

        if name.is_fully_resolved() || name.is_star() {
            return self.first_of(name, &[RecordType::NS]).await;
        }

        self.first_of(name, &[RecordType::SOA, RecordType::NS]).await
    }

    /// True when the closest enclosing SOA sits below any delegating NS.
    pub async fn is_authoritative(&self, name: &Name) -> Result<bool, DomainError> {
        for (_, zone) in levels(name) {
            if self.has_records(zone, RecordType::SOA).await? {
                return Ok(true);
            }
            if self.has_records(zone, RecordType::NS).await? {
                return Ok(false);
            }
        }
        Ok(false)
    }

    async fn record_set(
        &self,
        name: &Name,
        owner: &Name,
        qtype: RecordType,
    ) -> Result<Vec<ResourceRecord>, DomainError> {
        if qtype == RecordType::ANY {
            if !name.is_fully_resolved() {
                return Ok(Vec::new());
            }
            let mut records = Vec::new();
            for record_type in ANY_TYPES {
                let found = self.records_at(name.zone_id(), owner, record_type).await?;
                push_unique(&mut records, found);
            }
            return Ok(records);
        }

        if !qtype.is_supported() {
            return Ok(Vec::new());
        }

        if !name.is_fully_resolved() {
            if name.resolved_count() == 0 {
                return Ok(Vec::new());
            }
            if !self.store.is_wildcard_zone(name.zone_id()).await? {
                return Ok(Vec::new());
            }
        }

        self.records_at(name.zone_id(), owner, qtype).await
    }

    /// One CNAME hop: the alias record followed by the target's records.
    async fn follow_cname(
        &self,
        name: &Name,
        owner: &Name,
        qtype: RecordType,
    ) -> Result<Vec<ResourceRecord>, DomainError> {
        let mut aliases = self.record_set(name, owner, RecordType::CNAME).await?;
        aliases.truncate(1);
        let Some(alias) = aliases.pop() else {
            return Ok(Vec::new());
        };

        let target = match alias.rdata().names().first().map(|target| (*target).clone()) {
            Some(target) if target.is_resolved() => target,
            Some(target) => self.store.resolve_name(&target).await?,
            None => return Ok(vec![alias]),
        };

        let mut records = vec![alias];
        let found = self.record_set(&target, &target.to_plain(), qtype).await?;
        push_unique(&mut records, found);
        Ok(records)
    }

    /// A records for names referenced by answer and authority records, CNAME targets excluded.
    async fn glue(
        &self,
        answer: &[ResourceRecord],
        authority: &[ResourceRecord],
    ) -> Result<Vec<ResourceRecord>, DomainError> {
        let mut targets: Vec<&Name> = Vec::new();
        for record in answer.iter().chain(authority) {
            if matches!(record.record_type(), RecordType::A | RecordType::CNAME) {
                continue;
            }
            for target in record.rdata().names() {
                if !targets.contains(&target) {
                    targets.push(target);
                }
            }
        }

        let mut additional = Vec::new();
        for target in targets {
            let resolved = if target.is_resolved() {
                target.clone()
            } else {
                self.store.resolve_name(target).await?
            };
            if !resolved.is_fully_resolved() || resolved.is_root() {
                continue;
            }
            let found = self
                .records_at(resolved.zone_id(), &resolved.to_plain(), RecordType::A)
                .await?;
            push_unique(&mut additional, found);
        }
        Ok(additional)
    }

    /// First level with records of any of `types`, checking types in order at each level.
    async fn first_of(
        &self,
        name: &Name,
        types: &[RecordType],
    ) -> Result<Vec<ResourceRecord>, DomainError> {
        for (owner, zone) in levels(name) {
            for &record_type in types {
                let found = self.records_at(zone, &owner, record_type).await?;
                if !found.is_empty() {
                    return Ok(found);
                }
            }
        }
        Ok(Vec::new())
    }

    async fn records_at(
        &self,
        zone: ZoneId,
        owner: &Name,
        record_type: RecordType,
    ) -> Result<Vec<ResourceRecord>, DomainError> {
        let rdata = self
            .store
            .get_records(zone, record_type, self.record_limit)
            .await?;
        Ok(rdata
            .into_iter()
            .map(|rdata| ResourceRecord::new(owner.clone(), rdata))
            .collect())
    }

    async fn has_records(
        &self,
        zone: ZoneId,
        record_type: RecordType,
    ) -> Result<bool, DomainError> {
        Ok(!self.store.get_records(zone, record_type, 1).await?.is_empty())
    }
}

/// Zone chain of the fully resolved prefix, ending with the root zone.
fn levels(name: &Name) -> impl Iterator<Item = (Name, ZoneId)> {
    name.zone_ancestors()
        .map(|(owner, zone)| (owner.to_plain(), zone))
        .chain(std::iter::once((Name::root(), ROOT_ZONE)))
}

fn push_unique(into: &mut Vec<ResourceRecord>, records: Vec<ResourceRecord>) {
    for record in records {
        if !into.contains(&record) {
            into.push(record);
        }
    }
}
