//! Discovery without network checks.

use tabled::Tabled;

use sitewatch_config::Config;
use sitewatch_core::{Monitor, RawSiteEntry};

use crate::cli::{DiscoverArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "TLS")]
    tls: &'static str,
    #[tabled(rename = "Enabled")]
    enabled: &'static str,
    #[tabled(rename = "Origin")]
    origin: String,
    #[tabled(rename = "Certificate")]
    cert: String,
    #[tabled(rename = "Config")]
    config: String,
}

impl From<&RawSiteEntry> for EntryRow {
    fn from(e: &RawSiteEntry) -> Self {
        Self {
            domain: e.domain.clone(),
            port: e.port,
            tls: output::yes_no(e.is_tls),
            enabled: output::yes_no(e.is_enabled),
            origin: e.origin.to_string(),
            cert: e.cert_path.clone().unwrap_or_default(),
            config: e.config_path.clone(),
        }
    }
}

pub async fn handle(config: &Config, args: &DiscoverArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let monitor = Monitor::new(config.to_monitor_config()?)?;

    let mut entries: Vec<RawSiteEntry> = if args.all {
        monitor.discover().await
    } else {
        monitor.unique_sites().await.into_values().collect()
    };
    entries.sort_by(|a, b| a.domain.cmp(&b.domain));

    let out = output::render_list(
        output::resolve_format(global, config),
        &entries,
        |e| EntryRow::from(e),
        |e| e.domain.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
