mod load_zone_file;
mod zone_admin;

pub use load_zone_file::{LoadReport, LoadZoneFileUseCase, RejectedLine};
pub use zone_admin::ZoneAdminUseCase;
