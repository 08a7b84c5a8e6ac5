use chiral_dns_application::ports::ZoneStore;
use chiral_dns_domain::config::{DatabaseConfig, StoreBackend};
use chiral_dns_infrastructure::database::{create_pool, sqlite_url};
use chiral_dns_infrastructure::repositories::{InMemoryZoneStore, SqliteZoneStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub async fn init_store(cfg: &DatabaseConfig) -> anyhow::Result<Arc<dyn ZoneStore>> {
    match cfg.backend {
        StoreBackend::Memory => {
            info!("Using in-memory zone store");
            Ok(Arc::new(InMemoryZoneStore::new()))
        }
        StoreBackend::Sqlite => {
            let database_url = sqlite_url(&cfg.path);
            info!(database_url = %database_url, "Initializing database");

            let pool = create_pool(
                &database_url,
                cfg.max_connections,
                Duration::from_secs(cfg.busy_timeout_secs),
            )
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to initialize database");
                anyhow::anyhow!(e)
            })?;

            Ok(Arc::new(SqliteZoneStore::new(pool)))
        }
    }
}
