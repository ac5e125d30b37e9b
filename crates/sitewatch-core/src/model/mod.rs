// ── Domain model ──

pub mod report;
pub mod site;

pub use report::{EXPIRING_SOON_DAYS, ReportSummary, SiteReport};
pub use site::{CertificateStatus, RawSiteEntry, Site, SiteOrigin, days_remaining};
