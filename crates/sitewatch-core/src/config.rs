// ── Runtime monitoring configuration ──
//
// These types describe *where* to look for site configs and *how* hard to
// probe them. They never touch disk: sitewatch-config or the binary builds
// a `MonitorConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;

/// Configuration for one monitoring agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    // ── Standard layout ──────────────────────────────────────────────
    /// Web server config root; the standard layout is skipped if absent.
    pub nginx_root: PathBuf,
    /// Directory of enabled vhost files.
    pub sites_enabled_dir: PathBuf,
    /// Directory of available (possibly disabled) vhost files.
    pub sites_available_dir: PathBuf,
    /// Placeholder file name excluded from both directories.
    pub default_site_name: String,

    // ── Panel layouts ────────────────────────────────────────────────
    /// Root searched for per-vhost panel config files.
    pub panel_vhosts_root: PathBuf,
    /// Fixed config file name generated for each panel vhost.
    pub panel_vhost_filename: String,
    /// Maximum directory depth below `panel_vhosts_root`.
    pub panel_search_depth: usize,
    /// Glob of panel auxiliary config fragments.
    pub panel_aux_glob: String,
    /// Roots of panel-managed certificate stores; certificates below them
    /// are read from disk instead of via a handshake.
    pub panel_cert_roots: Vec<PathBuf>,

    // ── Privileged reads ─────────────────────────────────────────────
    /// Root-owned trees that require a privileged read.
    pub privileged_prefixes: Vec<PathBuf>,
    pub privileged_read_timeout: Duration,

    // ── Scheduling & probes ──────────────────────────────────────────
    /// Sites checked concurrently per batch.
    pub batch_size: usize,
    /// Pause between consecutive batches.
    pub batch_pause: Duration,
    /// Reachability request timeout.
    pub probe_timeout: Duration,
    /// TLS handshake timeout.
    pub handshake_timeout: Duration,
    pub user_agent: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            nginx_root: PathBuf::from("/etc/nginx"),
            sites_enabled_dir: PathBuf::from("/etc/nginx/sites-enabled"),
            sites_available_dir: PathBuf::from("/etc/nginx/sites-available"),
            default_site_name: "default".into(),
            panel_vhosts_root: PathBuf::from("/home"),
            panel_vhost_filename: "nginx.conf".into(),
            panel_search_depth: 5,
            panel_aux_glob: "/etc/nginx/conf.d/domains/*.conf".into(),
            panel_cert_roots: vec![
                PathBuf::from("/home"),
                PathBuf::from("/usr/local/hestia/data/users"),
            ],
            privileged_prefixes: vec![
                PathBuf::from("/home"),
                PathBuf::from("/usr/local/hestia"),
                PathBuf::from("/root"),
            ],
            privileged_read_timeout: Duration::from_secs(5),
            batch_size: 3,
            batch_pause: Duration::from_millis(2000),
            probe_timeout: Duration::from_secs(10),
            handshake_timeout: Duration::from_secs(20),
            user_agent: sitewatch_api::DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl MonitorConfig {
    /// Reject values that would stall or disable the scheduler.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.batch_size == 0 {
            return Err(CoreError::Config {
                message: "batch_size must be at least 1".into(),
            });
        }
        for (name, value) in [
            ("probe_timeout", self.probe_timeout),
            ("handshake_timeout", self.handshake_timeout),
            ("privileged_read_timeout", self.privileged_read_timeout),
        ] {
            if value.is_zero() {
                return Err(CoreError::Config {
                    message: format!("{name} must be greater than zero"),
                });
            }
        }
        if self.panel_vhost_filename.contains('/') {
            return Err(CoreError::Config {
                message: format!(
                    "panel_vhost_filename must be a bare file name, got '{}'",
                    self.panel_vhost_filename
                ),
            });
        }
        Ok(())
    }
}
