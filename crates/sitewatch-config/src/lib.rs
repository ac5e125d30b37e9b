//! Configuration loading for sitewatch.
//!
//! One flat TOML file plus `SITEWATCH_*` environment overrides, layered
//! over built-in defaults and translated into
//! `sitewatch_core::MonitorConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sitewatch_core::MonitorConfig;

/// Prefix for environment overrides, e.g. `SITEWATCH_BATCH_SIZE=5`.
pub const ENV_PREFIX: &str = "SITEWATCH_";

/// Values accepted for `output`, matching the CLI's `--output` choices.
pub const OUTPUT_FORMATS: &[&str] = &["table", "json", "json-compact", "yaml", "plain"];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// On-disk configuration. Durations are whole seconds or milliseconds,
/// as the field suffix says.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Default output format for the CLI, one of [`OUTPUT_FORMATS`].
    pub output: String,

    pub nginx_root: PathBuf,
    pub sites_enabled_dir: PathBuf,
    pub sites_available_dir: PathBuf,
    pub default_site_name: String,

    pub panel_vhosts_root: PathBuf,
    pub panel_vhost_filename: String,
    pub panel_search_depth: usize,
    pub panel_aux_glob: String,
    pub panel_cert_roots: Vec<PathBuf>,

    pub privileged_prefixes: Vec<PathBuf>,
    pub privileged_read_timeout_secs: u64,

    pub batch_size: usize,
    pub batch_pause_ms: u64,
    pub probe_timeout_secs: u64,
    pub handshake_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from(&MonitorConfig::default())
    }
}

impl From<&MonitorConfig> for Config {
    fn from(m: &MonitorConfig) -> Self {
        Self {
            output: "table".into(),
            nginx_root: m.nginx_root.clone(),
            sites_enabled_dir: m.sites_enabled_dir.clone(),
            sites_available_dir: m.sites_available_dir.clone(),
            default_site_name: m.default_site_name.clone(),
            panel_vhosts_root: m.panel_vhosts_root.clone(),
            panel_vhost_filename: m.panel_vhost_filename.clone(),
            panel_search_depth: m.panel_search_depth,
            panel_aux_glob: m.panel_aux_glob.clone(),
            panel_cert_roots: m.panel_cert_roots.clone(),
            privileged_prefixes: m.privileged_prefixes.clone(),
            privileged_read_timeout_secs: m.privileged_read_timeout.as_secs(),
            batch_size: m.batch_size,
            batch_pause_ms: u64::try_from(m.batch_pause.as_millis()).unwrap_or(u64::MAX),
            probe_timeout_secs: m.probe_timeout.as_secs(),
            handshake_timeout_secs: m.handshake_timeout.as_secs(),
            user_agent: m.user_agent.clone(),
        }
    }
}

impl Config {
    /// Validate and translate into the runtime config.
    pub fn to_monitor_config(&self) -> Result<MonitorConfig, ConfigError> {
        self.validate()?;

        let monitor = MonitorConfig {
            nginx_root: self.nginx_root.clone(),
            sites_enabled_dir: self.sites_enabled_dir.clone(),
            sites_available_dir: self.sites_available_dir.clone(),
            default_site_name: self.default_site_name.clone(),
            panel_vhosts_root: self.panel_vhosts_root.clone(),
            panel_vhost_filename: self.panel_vhost_filename.clone(),
            panel_search_depth: self.panel_search_depth,
            panel_aux_glob: self.panel_aux_glob.clone(),
            panel_cert_roots: self.panel_cert_roots.clone(),
            privileged_prefixes: self.privileged_prefixes.clone(),
            privileged_read_timeout: Duration::from_secs(self.privileged_read_timeout_secs),
            batch_size: self.batch_size,
            batch_pause: Duration::from_millis(self.batch_pause_ms),
            probe_timeout: Duration::from_secs(self.probe_timeout_secs),
            handshake_timeout: Duration::from_secs(self.handshake_timeout_secs),
            user_agent: self.user_agent.clone(),
        };
        monitor.validate().map_err(|e| ConfigError::Validation {
            field: "config".into(),
            reason: e.to_string(),
        })?;
        Ok(monitor)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: &str| ConfigError::Validation {
            field: field.into(),
            reason: reason.into(),
        };

        if self.batch_size == 0 {
            return Err(invalid("batch_size", "must be at least 1"));
        }
        for (field, value) in [
            ("probe_timeout_secs", self.probe_timeout_secs),
            ("handshake_timeout_secs", self.handshake_timeout_secs),
            ("privileged_read_timeout_secs", self.privileged_read_timeout_secs),
        ] {
            if value == 0 {
                return Err(invalid(field, "must be greater than zero"));
            }
        }
        if !OUTPUT_FORMATS
            .iter()
            .any(|f| f.eq_ignore_ascii_case(&self.output))
        {
            return Err(ConfigError::Validation {
                field: "output".into(),
                reason: format!(
                    "expected one of {}, got '{}'",
                    OUTPUT_FORMATS.join(", "),
                    self.output
                ),
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }
        Ok(())
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "sitewatch", "sitewatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("sitewatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults, then the TOML file at `path`, then the environment.
///
/// A missing file contributes nothing.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
}

/// Load the config from `path`, or from [`config_path`] if `None`.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    let config: Config = figment(&path).extract()?;
    Ok(config)
}

/// Load and translate straight into the runtime config.
pub fn load_monitor_config(path: Option<&Path>) -> Result<MonitorConfig, ConfigError> {
    load_config(path)?.to_monitor_config()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path` (or the canonical
/// config path). Returns the path written.
pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(path)
}
