use async_trait::async_trait;
use chiral_dns_application::ports::{ZoneNodeInfo, ZoneStore};
use chiral_dns_domain::{
    DomainError, Label, Name, Rdata, RecordType, Soa, ZoneId, ZoneNode, ZoneStatistics, ROOT_ZONE,
};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::net::Ipv4Addr;
use tracing::{debug, error, instrument};

/// Longest parent chain followed before the tree is treated as corrupt.
const MAX_DEPTH: i64 = 127;

type ChainRow = (i64, String, i64, i64);
type SoaRow = (i64, i64, i64, i64, i64, i64, i64);
type StatsRow = (i64, i64, i64, i64, i64, i64, i64);

const ZONE_CHAIN: &str = "WITH RECURSIVE chain(number, name, previous, star, depth) AS (
         SELECT number, name, previous, star, 0 FROM zone WHERE number = ?
         UNION ALL
         SELECT z.number, z.name, z.previous, z.star, c.depth + 1
         FROM zone z JOIN chain c ON z.number = c.previous
         WHERE c.depth < ?
     )
     SELECT number, name, previous, star FROM chain ORDER BY depth";

const REFERENCES: &str = "SELECT
         (SELECT COUNT(*) FROM nsrecord WHERE server = ?1 AND zone != ?1)
       + (SELECT COUNT(*) FROM cnamerecord WHERE target = ?1 AND zone != ?1)
       + (SELECT COUNT(*) FROM mxrecord WHERE exchange = ?1 AND zone != ?1)
       + (SELECT COUNT(*) FROM soarecord WHERE (mname = ?1 OR rname = ?1) AND zone != ?1)";

const RECORD_TABLES: [(RecordType, &str); 6] = [
    (RecordType::A, "arecord"),
    (RecordType::NS, "nsrecord"),
    (RecordType::CNAME, "cnamerecord"),
    (RecordType::MX, "mxrecord"),
    (RecordType::SOA, "soarecord"),
    (RecordType::TXT, "txtrecord"),
];

pub struct SqliteZoneStore {
    pool: SqlitePool,
    started_at: DateTime<Utc>,
}

impl SqliteZoneStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            started_at: Utc::now(),
        }
    }

    fn table(record_type: RecordType) -> Option<&'static str> {
        RECORD_TABLES
            .iter()
            .find(|(t, _)| *t == record_type)
            .map(|(_, table)| *table)
    }

    async fn zone_exists(&self, zone: ZoneId) -> Result<bool, DomainError> {
        if zone == ROOT_ZONE {
            return Ok(true);
        }
        let row = sqlx::query_as::<_, (i64,)>("SELECT number FROM zone WHERE number = ?")
            .bind(zone)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_failed(e, "Failed to look up zone"))?;
        Ok(row.is_some())
    }

    /// Fully resolved name of a zone an rdata column points at.
    async fn referenced_name(&self, zone: ZoneId) -> Result<Name, DomainError> {
        self.name_for_zone_node(zone).await?.ok_or_else(|| {
            error!(zone, "Record references a missing zone");
            DomainError::StoreFailure(format!("record references missing zone {}", zone))
        })
    }
}

fn query_failed(e: sqlx::Error, message: &'static str) -> DomainError {
    error!(error = %e, "{}", message);
    DomainError::StoreFailure(e.to_string())
}

fn corrupt(zone: ZoneId, reason: impl std::fmt::Display) -> DomainError {
    error!(zone, reason = %reason, "Corrupt zone data");
    DomainError::StoreFailure(format!("corrupt data at zone {}: {}", zone, reason))
}

/// Zone id of a target name, which must already be stored.
fn reference(name: &Name) -> Result<ZoneId, DomainError> {
    if !name.is_fully_resolved() {
        return Err(DomainError::InvalidRecord(format!(
            "{} must be resolved before it is stored",
            name
        )));
    }
    Ok(name.zone_id())
}

#[async_trait]
impl ZoneStore for SqliteZoneStore {
    #[instrument(skip(self), fields(name = %name))]
    async fn resolve_name(&self, name: &Name) -> Result<Name, DomainError> {
        let mut zones = Vec::with_capacity(name.label_count());
        let mut parent = ROOT_ZONE;

        for label in name.labels().iter().rev() {
            let row = sqlx::query_as::<_, (i64, i64)>(
                "SELECT number, star FROM zone WHERE previous = ? AND name = ? COLLATE NOCASE",
            )
            .bind(parent)
            .bind(label.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_failed(e, "Failed to resolve name"))?;

            match row {
                Some((number, star)) => {
                    zones.push(ZoneNode::new(number, star != 0));
                    parent = number;
                }
                None => break,
            }
        }

        Ok(name.resolved(zones)?)
    }

    #[instrument(skip(self))]
    async fn get_records(
        &self,
        zone: ZoneId,
        record_type: RecordType,
        limit: usize,
    ) -> Result<Vec<Rdata>, DomainError> {
        let limit = limit as i64;

        match record_type {
            RecordType::A => {
                let rows = sqlx::query_as::<_, (i64, String)>(
                    "SELECT ttl, address FROM arecord WHERE zone = ? ORDER BY id LIMIT ?",
                )
                .bind(zone)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| query_failed(e, "Failed to fetch A records"))?;

                rows.into_iter()
                    .map(|(ttl, address)| -> Result<Rdata, DomainError> {
                        let address: Ipv4Addr = address
                            .parse()
                            .map_err(|_| corrupt(zone, format!("bad address '{}'", address)))?;
                        Ok(Rdata::A {
                            ttl: ttl as u32,
                            address,
                        })
                    })
                    .collect()
            }
            RecordType::NS => {
                let rows = sqlx::query_as::<_, (i64, i64)>(
                    "SELECT ttl, server FROM nsrecord WHERE zone = ? ORDER BY id LIMIT ?",
                )
                .bind(zone)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| query_failed(e, "Failed to fetch NS records"))?;

                let mut records = Vec::with_capacity(rows.len());
                for (ttl, server) in rows {
                    records.push(Rdata::Ns {
                        ttl: ttl as u32,
                        server: self.referenced_name(server).await?,
                    });
                }
                Ok(records)
            }
            RecordType::CNAME => {
                let rows = sqlx::query_as::<_, (i64, i64)>(
                    "SELECT ttl, target FROM cnamerecord WHERE zone = ? ORDER BY id LIMIT ?",
                )
                .bind(zone)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| query_failed(e, "Failed to fetch CNAME records"))?;

                let mut records = Vec::with_capacity(rows.len());
                for (ttl, target) in rows {
                    records.push(Rdata::Cname {
                        ttl: ttl as u32,
                        target: self.referenced_name(target).await?,
                    });
                }
                Ok(records)
            }
            RecordType::MX => {
                let rows = sqlx::query_as::<_, (i64, i64, i64)>(
                    "SELECT ttl, preference, exchange FROM mxrecord
                     WHERE zone = ? ORDER BY id LIMIT ?",
                )
                .bind(zone)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| query_failed(e, "Failed to fetch MX records"))?;

                let mut records = Vec::with_capacity(rows.len());
                for (ttl, preference, exchange) in rows {
                    records.push(Rdata::Mx {
                        ttl: ttl as u32,
                        preference: preference as u16,
                        exchange: self.referenced_name(exchange).await?,
                    });
                }
                Ok(records)
            }
            RecordType::SOA => {
                let rows = sqlx::query_as::<_, SoaRow>(
                    "SELECT mname, rname, serial, refresh, retry, expire, minimum
                     FROM soarecord WHERE zone = ? ORDER BY id LIMIT ?",
                )
                .bind(zone)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| query_failed(e, "Failed to fetch SOA records"))?;

                let mut records = Vec::with_capacity(rows.len());
                for (mname, rname, serial, refresh, retry, expire, minimum) in rows {
                    records.push(Rdata::Soa(Soa {
                        mname: self.referenced_name(mname).await?,
                        rname: self.referenced_name(rname).await?,
                        serial: serial as u32,
                        refresh: refresh as u32,
                        retry: retry as u32,
                        expire: expire as u32,
                        minimum: minimum as u32,
                    }));
                }
                Ok(records)
            }
            RecordType::TXT => {
                let rows = sqlx::query_as::<_, (i64, String)>(
                    "SELECT ttl, text FROM txtrecord WHERE zone = ? ORDER BY id LIMIT ?",
                )
                .bind(zone)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| query_failed(e, "Failed to fetch TXT records"))?;

                Ok(rows
                    .into_iter()
                    .map(|(ttl, text)| Rdata::Txt {
                        ttl: ttl as u32,
                        text,
                    })
                    .collect())
            }
            other => {
                debug!(record_type = %other, "No table for record type");
                Ok(Vec::new())
            }
        }
    }

    #[instrument(skip(self))]
    async fn is_wildcard_zone(&self, zone: ZoneId) -> Result<bool, DomainError> {
        let row = sqlx::query_as::<_, (i64,)>("SELECT star FROM zone WHERE number = ?")
            .bind(zone)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_failed(e, "Failed to read wildcard flag"))?;
        Ok(row.is_some_and(|(star,)| star != 0))
    }

    #[instrument(skip(self))]
    async fn name_for_zone_node(&self, zone: ZoneId) -> Result<Option<Name>, DomainError> {
        if zone == ROOT_ZONE {
            return Ok(Some(Name::root().resolved(Vec::new())?));
        }

        let rows = sqlx::query_as::<_, ChainRow>(ZONE_CHAIN)
            .bind(zone)
            .bind(MAX_DEPTH)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_failed(e, "Failed to read zone chain"))?;

        match rows.last() {
            None => return Ok(None),
            Some((_, _, previous, _)) if *previous != ROOT_ZONE => {
                return Err(corrupt(zone, "parent chain does not reach the root"));
            }
            Some(_) => {}
        }

        let mut labels = Vec::with_capacity(rows.len());
        let mut nodes = Vec::with_capacity(rows.len());
        for (number, label, _, star) in rows {
            labels.push(Label::new(&label).map_err(|e| corrupt(number, e))?);
            nodes.push(ZoneNode::new(number, star != 0));
        }
        nodes.reverse();

        let name = Name::from_labels(labels)
            .and_then(|name| name.resolved(nodes))
            .map_err(|e| corrupt(zone, e))?;
        Ok(Some(name))
    }

    #[instrument(skip(self), fields(label = %label))]
    async fn add_zone_node(
        &self,
        parent: ZoneId,
        label: &Label,
        wildcard: bool,
    ) -> Result<ZoneId, DomainError> {
        if !self.zone_exists(parent).await? {
            return Err(DomainError::NotFound(format!("zone {} does not exist", parent)));
        }

        let (number,) = sqlx::query_as::<_, (i64,)>(
            "INSERT INTO zone (name, previous, star) VALUES (?, ?, ?) RETURNING number",
        )
        .bind(label.as_str())
        .bind(parent)
        .bind(wildcard as i64)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                DomainError::InvalidRecord(format!(
                    "zone {} already has a child labelled '{}'",
                    parent, label
                ))
            } else {
                query_failed(e, "Failed to insert zone")
            }
        })?;

        Ok(number)
    }

    #[instrument(skip(self, rdata), fields(record_type = %rdata.record_type()))]
    async fn add_record(&self, zone: ZoneId, rdata: &Rdata) -> Result<i64, DomainError> {
        if !self.zone_exists(zone).await? {
            return Err(DomainError::NotFound(format!("zone {} does not exist", zone)));
        }

        let result = match rdata {
            Rdata::A { ttl, address } => {
                sqlx::query("INSERT INTO arecord (zone, ttl, address) VALUES (?, ?, ?)")
                    .bind(zone)
                    .bind(*ttl as i64)
                    .bind(address.to_string())
                    .execute(&self.pool)
                    .await
            }
            Rdata::Ns { ttl, server } => {
                sqlx::query("INSERT INTO nsrecord (zone, ttl, server) VALUES (?, ?, ?)")
                    .bind(zone)
                    .bind(*ttl as i64)
                    .bind(reference(server)?)
                    .execute(&self.pool)
                    .await
            }
            Rdata::Cname { ttl, target } => {
                sqlx::query("INSERT INTO cnamerecord (zone, ttl, target) VALUES (?, ?, ?)")
                    .bind(zone)
                    .bind(*ttl as i64)
                    .bind(reference(target)?)
                    .execute(&self.pool)
                    .await
            }
            Rdata::Mx {
                ttl,
                preference,
                exchange,
            } => {
                sqlx::query(
                    "INSERT INTO mxrecord (zone, ttl, preference, exchange) VALUES (?, ?, ?, ?)",
                )
                .bind(zone)
                .bind(*ttl as i64)
                .bind(*preference as i64)
                .bind(reference(exchange)?)
                .execute(&self.pool)
                .await
            }
            Rdata::Soa(soa) => {
                sqlx::query(
                    "INSERT INTO soarecord
                         (zone, mname, rname, serial, refresh, retry, expire, minimum)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(zone)
                .bind(reference(&soa.mname)?)
                .bind(reference(&soa.rname)?)
                .bind(soa.serial as i64)
                .bind(soa.refresh as i64)
                .bind(soa.retry as i64)
                .bind(soa.expire as i64)
                .bind(soa.minimum as i64)
                .execute(&self.pool)
                .await
            }
            Rdata::Txt { ttl, text } => {
                sqlx::query("INSERT INTO txtrecord (zone, ttl, text) VALUES (?, ?, ?)")
                    .bind(zone)
                    .bind(*ttl as i64)
                    .bind(text)
                    .execute(&self.pool)
                    .await
            }
        }
        .map_err(|e| query_failed(e, "Failed to insert record"))?;

        Ok(result.last_insert_rowid())
    }

    #[instrument(skip(self))]
    async fn child_nodes(&self, zone: ZoneId) -> Result<Vec<ZoneNodeInfo>, DomainError> {
        let rows = sqlx::query_as::<_, (i64, String, i64)>(
            "SELECT number, name, star FROM zone WHERE previous = ? ORDER BY number",
        )
        .bind(zone)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_failed(e, "Failed to list child zones"))?;

        rows.into_iter()
            .map(|(id, label, star)| -> Result<ZoneNodeInfo, DomainError> {
                Ok(ZoneNodeInfo {
                    id,
                    label: Label::new(&label).map_err(|e| corrupt(id, e))?,
                    wildcard: star != 0,
                })
            })
            .collect()
    }

    #[instrument(skip(self))]
    async fn set_wildcard_zone(&self, zone: ZoneId, wildcard: bool) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE zone SET star = ? WHERE number = ?")
            .bind(wildcard as i64)
            .bind(zone)
            .execute(&self.pool)
            .await
            .map_err(|e| query_failed(e, "Failed to update wildcard flag"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("zone {} does not exist", zone)));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_records(
        &self,
        zone: ZoneId,
        record_type: RecordType,
    ) -> Result<u64, DomainError> {
        let Some(table) = Self::table(record_type) else {
            return Ok(0);
        };

        let result = sqlx::query(&format!("DELETE FROM {} WHERE zone = ?", table))
            .bind(zone)
            .execute(&self.pool)
            .await
            .map_err(|e| query_failed(e, "Failed to delete records"))?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete_zone_node(&self, zone: ZoneId) -> Result<(), DomainError> {
        if zone == ROOT_ZONE {
            return Err(DomainError::ZoneInUse(
                "the root zone cannot be deleted".to_string(),
            ));
        }

        let (children,) =
            sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM zone WHERE previous = ?")
                .bind(zone)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| query_failed(e, "Failed to count child zones"))?;
        if children > 0 {
            return Err(DomainError::ZoneInUse(format!(
                "zone {} has {} child zone(s)",
                zone, children
            )));
        }

        let (references,) = sqlx::query_as::<_, (i64,)>(REFERENCES)
            .bind(zone)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| query_failed(e, "Failed to count zone references"))?;
        if references > 0 {
            return Err(DomainError::ZoneInUse(format!(
                "zone {} is referenced by {} record(s)",
                zone, references
            )));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| query_failed(e, "Failed to begin zone delete"))?;

        for (_, table) in RECORD_TABLES {
            sqlx::query(&format!("DELETE FROM {} WHERE zone = ?", table))
                .bind(zone)
                .execute(&mut *tx)
                .await
                .map_err(|e| query_failed(e, "Failed to delete zone records"))?;
        }

        let result = sqlx::query("DELETE FROM zone WHERE number = ?")
            .bind(zone)
            .execute(&mut *tx)
            .await
            .map_err(|e| query_failed(e, "Failed to delete zone"))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("zone {} does not exist", zone)));
        }

        tx.commit()
            .await
            .map_err(|e| query_failed(e, "Failed to commit zone delete"))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn statistics(&self) -> Result<ZoneStatistics, DomainError> {
        let (zones, a, ns, cname, mx, soa, txt) = sqlx::query_as::<_, StatsRow>(
            "SELECT
                 (SELECT COUNT(*) FROM zone),
                 (SELECT COUNT(*) FROM arecord),
                 (SELECT COUNT(*) FROM nsrecord),
                 (SELECT COUNT(*) FROM cnamerecord),
                 (SELECT COUNT(*) FROM mxrecord),
                 (SELECT COUNT(*) FROM soarecord),
                 (SELECT COUNT(*) FROM txtrecord)",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query_failed(e, "Failed to count zone rows"))?;

        Ok(ZoneStatistics {
            started_at: self.started_at,
            zones: zones as u64,
            a_records: a as u64,
            ns_records: ns as u64,
            cname_records: cname as u64,
            mx_records: mx as u64,
            soa_records: soa as u64,
            txt_records: txt as u64,
        })
    }
}
