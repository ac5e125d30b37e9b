// sitewatch-core: Vhost discovery and per-site TLS/reachability checks.

pub mod config;
pub mod dedup;
pub mod discovery;
pub mod error;
pub mod inspector;
pub mod model;
pub mod monitor;
pub mod parser;
pub mod reader;
pub mod scheduler;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::MonitorConfig;
pub use dedup::dedupe;
pub use discovery::{ConfigDiscovery, Layout};
pub use error::{CoreError, ParseFailure};
pub use inspector::{CertStrategy, CertificateInspector};
pub use monitor::{Monitor, ReportSink};
pub use reader::{FileReader, LocalReader, RoutedReader, SudoReader};
pub use scheduler::{BatchScheduler, LiveSiteCheck, SiteCheck};

pub use model::{
    CertificateStatus, EXPIRING_SOON_DAYS, RawSiteEntry, ReportSummary, Site, SiteOrigin,
    SiteReport, days_remaining,
};
