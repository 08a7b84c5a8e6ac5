use chiral_dns_application::ports::ZoneStore;
use chiral_dns_application::use_cases::{
    ConsoleSession, LoadZoneFileUseCase, ResolveQueryUseCase, ZoneAdminUseCase,
};
use chiral_dns_domain::Config;
use std::sync::Arc;

pub struct UseCases {
    pub admin: Arc<ZoneAdminUseCase>,
    pub resolver: Arc<ResolveQueryUseCase>,
    pub load_zone_file: Arc<LoadZoneFileUseCase>,
}

impl UseCases {
    pub fn new(config: &Config, store: Arc<dyn ZoneStore>) -> Self {
        let admin = Arc::new(ZoneAdminUseCase::new(store.clone()));
        let resolver = Arc::new(
            ResolveQueryUseCase::new(store).with_record_limit(config.dns.record_limit),
        );

        Self {
            load_zone_file: Arc::new(LoadZoneFileUseCase::new(admin.clone())),
            admin,
            resolver,
        }
    }

    pub fn console_session(&self) -> ConsoleSession {
        ConsoleSession::new(self.admin.clone())
    }
}
