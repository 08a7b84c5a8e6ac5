use super::ZoneAdminUseCase;
use chiral_dns_domain::{DomainError, ZoneFileEntry};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub rejected: Vec<RejectedLine>,
}

pub struct LoadZoneFileUseCase {
    admin: Arc<ZoneAdminUseCase>,
}

impl LoadZoneFileUseCase {
    pub fn new(admin: Arc<ZoneAdminUseCase>) -> Self {
        Self { admin }
    }

    /// Loads every record line from `reader`.
    ///
    /// Bad lines are logged and reported; a store or read failure stops the load.
    pub async fn execute<R>(&self, reader: R) -> Result<LoadReport, DomainError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut report = LoadReport::default();
        let mut lines = reader.lines();
        let mut number = 0;

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| DomainError::IoError(e.to_string()))?
        {
            number += 1;
            let outcome = match ZoneFileEntry::parse(&line) {
                Ok(None) => continue,
                Ok(Some(entry)) => self.admin.add_entry(entry).await,
                Err(e) => Err(e),
            };
            match outcome {
                Ok(record) => {
                    report.loaded += 1;
                    debug!(line = number, record = %record, "Record loaded");
                }
                Err(e @ (DomainError::StoreFailure(_) | DomainError::IoError(_))) => {
                    warn!(line = number, error = %e, "Zone file load aborted");
                    return Err(e);
                }
                Err(e) => {
                    let rejected = DomainError::InvalidZoneFile {
                        line: number,
                        reason: e.to_string(),
                    };
                    warn!(error = %rejected, "Skipping zone file line");
                    report.rejected.push(RejectedLine {
                        line: number,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            loaded = report.loaded,
            rejected = report.rejected.len(),
            "Zone file loaded"
        );
        Ok(report)
    }
}
