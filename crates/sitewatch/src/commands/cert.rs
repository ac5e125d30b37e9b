//! Single certificate inspection, from a file or a live handshake.

use std::fmt::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use sitewatch_config::Config;
use sitewatch_core::{CertificateStatus, EXPIRING_SOON_DAYS, Monitor};

use crate::cli::{CertArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CertReport {
    target: String,
    strategy: &'static str,
    expiry: DateTime<Utc>,
    days_remaining: i64,
}

impl CertReport {
    fn new(target: &str, strategy: &'static str, status: CertificateStatus) -> Self {
        Self {
            target: target.to_owned(),
            strategy,
            expiry: status.expiry,
            days_remaining: status.days_remaining,
        }
    }
}

/// Anything with a path separator or a certificate extension is a file.
fn is_file_target(target: &str) -> bool {
    target.contains('/')
        || Path::new(target)
            .extension()
            .is_some_and(|ext| ["pem", "crt", "cer"].iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

pub async fn handle(config: &Config, args: &CertArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let monitor = Monitor::new(config.to_monitor_config()?)?;
    let inspector = monitor.inspector();
    let now = Utc::now();

    let report = if is_file_target(&args.target) {
        let path = Path::new(&args.target);
        if !path.exists() {
            return Err(CliError::NotFound {
                what: "Certificate file".into(),
                identifier: args.target.clone(),
            });
        }
        let status = inspector.inspect_file(path, now).await?;
        CertReport::new(&args.target, "file", status)
    } else {
        let status = inspector.inspect_handshake(&args.target, args.port, now).await?;
        CertReport::new(&format!("{}:{}", args.target, args.port), "handshake", status)
    };

    let color = output::should_color(global.color);
    let out = output::render_single(
        output::resolve_format(global, config),
        &report,
        |r| {
            let mut out = String::new();
            let _ = writeln!(out, "Target:   {}", r.target);
            let _ = writeln!(out, "Source:   {}", r.strategy);
            let _ = writeln!(out, "Expires:  {}", r.expiry.to_rfc3339());
            let _ = write!(
                out,
                "Days:     {}",
                output::paint_days(Some(r.days_remaining), EXPIRING_SOON_DAYS, color)
            );
            out
        },
        |r| r.expiry.to_rfc3339(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_targets() {
        assert!(is_file_target("/etc/ssl/shop.pem"));
        assert!(is_file_target("./shop.crt"));
        assert!(is_file_target("shop.PEM"));
        assert!(!is_file_target("shop.example.com"));
        assert!(!is_file_target("127.0.0.1"));
    }
}
