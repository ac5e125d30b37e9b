//! Single-site reachability probe.

use std::fmt::Write;
use std::time::Duration;

use serde::Serialize;

use sitewatch_api::{ProbeOutcome, ReachabilityProbe, TransportConfig, probe_url};
use sitewatch_config::Config;

use crate::cli::{GlobalOpts, ProbeArgs};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProbeReport {
    url: String,
    #[serde(flatten)]
    outcome: ProbeOutcome,
}

fn detail(r: &ProbeReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "URL:       {}", r.url);
    let _ = writeln!(out, "Reachable: {}", output::yes_no(r.outcome.is_reachable));
    if let Some(code) = r.outcome.status_code {
        let _ = writeln!(out, "Status:    {code}");
    }
    let _ = write!(out, "Latency:   {}", output::format_latency(r.outcome.response_time_ms));
    out
}

/// Probe one site. Unlike a scan, failures surface as errors so the exit
/// code tells connection problems from timeouts.
pub async fn handle(config: &Config, args: &ProbeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let monitor_config = config.to_monitor_config()?;
    let timeout = args
        .timeout
        .map_or(monitor_config.probe_timeout, Duration::from_secs);
    if timeout.is_zero() {
        return Err(CliError::Validation {
            field: "--timeout".into(),
            reason: "must be greater than zero".into(),
        });
    }

    let port = args.port.unwrap_or(if args.tls { 443 } else { 80 });
    let url = probe_url(&args.domain, port, args.tls)?;

    let transport = TransportConfig::default()
        .with_timeout(timeout)
        .with_user_agent(monitor_config.user_agent);
    let probe = ReachabilityProbe::new(&transport)?;
    let outcome = probe.try_probe(&args.domain, port, args.tls).await?;

    let report = ProbeReport {
        url: url.to_string(),
        outcome,
    };
    let out = output::render_single(
        output::resolve_format(global, config),
        &report,
        detail,
        |r| r.outcome.status_code.map(|c| c.to_string()).unwrap_or_default(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
