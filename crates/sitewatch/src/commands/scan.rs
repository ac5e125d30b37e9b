//! Full collection cycle.

use std::time::Duration;

use owo_colors::OwoColorize;
use tabled::Tabled;

use sitewatch_config::Config;
use sitewatch_core::{CoreError, EXPIRING_SOON_DAYS, Monitor, ReportSink, Site, SiteReport};

use crate::cli::{GlobalOpts, OutputFormat, ScanArgs};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "TLS")]
    tls: &'static str,
    #[tabled(rename = "Up")]
    reachable: &'static str,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Latency")]
    latency: String,
    #[tabled(rename = "Expires")]
    expires: String,
    #[tabled(rename = "Days")]
    days: String,
    #[tabled(rename = "Config")]
    config: String,
}

impl From<&Site> for SiteRow {
    fn from(s: &Site) -> Self {
        Self {
            domain: s.entry.domain.clone(),
            port: s.entry.port,
            tls: output::yes_no(s.entry.is_tls),
            reachable: output::yes_no(s.is_reachable),
            status: s.http_status_code.map(|c| c.to_string()).unwrap_or_default(),
            latency: output::format_latency(s.response_time_ms),
            expires: s
                .cert_expiry
                .map(|e| e.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            days: output::paint_days(s.cert_days_remaining, EXPIRING_SOON_DAYS, false),
            config: s.entry.config_path.clone(),
        }
    }
}

// ── Stdout sink ─────────────────────────────────────────────────────

/// Prints each report in the selected output format.
struct StdoutSink {
    format: OutputFormat,
    color: bool,
    quiet: bool,
}

impl StdoutSink {
    fn render(&self, report: &SiteReport) -> Result<String, CliError> {
        match self.format {
            OutputFormat::Table => {
                let table = output::render_list(
                    OutputFormat::Table,
                    &report.sites,
                    |s| SiteRow::from(s),
                    |s| s.entry.domain.clone(),
                )?;
                Ok(format!("{table}\n{}", summary_line(report, self.color)))
            }
            OutputFormat::Plain => output::render_list(
                OutputFormat::Plain,
                &report.sites,
                |s| SiteRow::from(s),
                |s| s.entry.domain.clone(),
            ),
            OutputFormat::Json => output::render_json(report, false),
            OutputFormat::JsonCompact => output::render_json(report, true),
            OutputFormat::Yaml => output::render_yaml(report),
        }
    }
}

impl ReportSink for StdoutSink {
    async fn submit(&self, report: &SiteReport) -> Result<(), CoreError> {
        let rendered = self
            .render(report)
            .map_err(|e| CoreError::Internal(e.to_string()))?;
        output::print_output(&rendered, self.quiet);
        Ok(())
    }
}

fn summary_line(report: &SiteReport, color: bool) -> String {
    let s = &report.summary;
    let expiring = format!("{} expiring within {EXPIRING_SOON_DAYS} days", s.expiring_soon);
    let expired = format!("{} expired", s.expired);
    let (expiring, expired) = if color {
        (
            if s.expiring_soon > 0 { expiring.yellow().to_string() } else { expiring },
            if s.expired > 0 { expired.red().bold().to_string() } else { expired },
        )
    } else {
        (expiring, expired)
    };
    format!(
        "{} sites, {} reachable, {} TLS; {expiring}; {expired}",
        s.total, s.reachable, s.tls
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(config: &Config, args: &ScanArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut monitor_config = config.to_monitor_config()?;
    if let Some(batch_size) = args.batch_size {
        if batch_size == 0 {
            return Err(CliError::Validation {
                field: "--batch-size".into(),
                reason: "must be at least 1".into(),
            });
        }
        monitor_config.batch_size = batch_size;
    }
    if let Some(ms) = args.pause_ms {
        monitor_config.batch_pause = Duration::from_millis(ms);
    }

    let monitor = Monitor::new(monitor_config)?;
    let sink = StdoutSink {
        format: output::resolve_format(global, config),
        color: output::should_color(global.color),
        quiet: global.quiet,
    };
    let report = monitor.collect_into(&sink).await?;

    if args.fail_on_expired && report.summary.expired > 0 {
        return Err(CliError::ExpiredCertificates {
            count: report.summary.expired,
        });
    }
    Ok(())
}
