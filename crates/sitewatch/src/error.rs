//! CLI error types with miette diagnostics.
//!
//! Maps core, config and transport errors into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use sitewatch_config::ConfigError;
use sitewatch_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to {target}")]
    #[diagnostic(
        code(sitewatch::connection_failed),
        help("Check that the site is up and resolves to an IPv4 address.")
    )]
    ConnectionFailed {
        target: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Timed out after {seconds}s")]
    #[diagnostic(
        code(sitewatch::timeout),
        help("Increase the timeout with --timeout or probe_timeout_secs / handshake_timeout_secs.")
    )]
    Timeout { seconds: u64 },

    // ── Certificates ─────────────────────────────────────────────────

    #[error("Could not read certificate for {target}: {reason}")]
    #[diagnostic(code(sitewatch::certificate))]
    Certificate { target: String, reason: String },

    #[error("{count} certificate(s) have expired")]
    #[diagnostic(
        code(sitewatch::expired),
        help("Renew the certificates listed above, or drop --fail-on-expired.")
    )]
    ExpiredCertificates { count: usize },

    // ── Files ────────────────────────────────────────────────────────

    #[error("{what} '{identifier}' not found")]
    #[diagnostic(code(sitewatch::not_found))]
    NotFound { what: String, identifier: String },

    #[error("Privileged read of {path} failed")]
    #[diagnostic(
        code(sitewatch::privileged_read),
        help(
            "Run sitewatch as root, or allow passwordless sudo for `cat` and `find`.\n\
             Reason: {reason}"
        )
    )]
    PrivilegedRead { path: String, reason: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(sitewatch::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(sitewatch::config),
        help(
            "Check the config file or SITEWATCH_* environment variables.\n\
             Run: sitewatch config path"
        )
    )]
    Config { message: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render {format} output: {reason}")]
    #[diagnostic(code(sitewatch::render))]
    Render { format: &'static str, reason: String },

    #[error("{0}")]
    #[diagnostic(code(sitewatch::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::PrivilegedRead { .. } => exit_code::PERMISSION,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Config { .. } => exit_code::CONFIG,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { target, reason } => Self::ConnectionFailed {
                target,
                source: reason.into(),
            },
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::Certificate { domain, reason } => Self::Certificate {
                target: domain,
                reason,
            },
            CoreError::PrivilegedRead { path, reason } => Self::PrivilegedRead { path, reason },
            CoreError::Read { path, reason } => Self::Certificate {
                target: path,
                reason,
            },
            CoreError::Config { message } => Self::Config { message },
            other @ (CoreError::Parse { .. } | CoreError::Discovery { .. }) => {
                Self::Internal(other.to_string())
            }
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<sitewatch_api::Error> for CliError {
    fn from(err: sitewatch_api::Error) -> Self {
        match err {
            sitewatch_api::Error::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            sitewatch_api::Error::Transport(e) if e.is_timeout() => Self::Timeout { seconds: 0 },
            sitewatch_api::Error::Transport(e) => Self::ConnectionFailed {
                target: e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string),
                source: Box::new(e),
            },
            sitewatch_api::Error::Resolve { host, reason } => Self::ConnectionFailed {
                target: host,
                source: reason.into(),
            },
            sitewatch_api::Error::InvalidUrl(e) => Self::Validation {
                field: "domain".into(),
                reason: e.to_string(),
            },
            other => Self::from(CoreError::from(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_category() {
        assert_eq!(CliError::Timeout { seconds: 10 }.exit_code(), exit_code::TIMEOUT);
        assert_eq!(
            CliError::Config {
                message: "bad".into()
            }
            .exit_code(),
            exit_code::CONFIG
        );
        assert_eq!(
            CliError::NotFound {
                what: "file".into(),
                identifier: "/x".into()
            }
            .exit_code(),
            exit_code::NOT_FOUND
        );
        assert_eq!(CliError::Internal("x".into()).exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn validation_config_errors_map_to_config_exit() {
        let err = CliError::from(ConfigError::Validation {
            field: "batch_size".into(),
            reason: "must be at least 1".into(),
        });
        assert_eq!(err.exit_code(), exit_code::CONFIG);
        assert!(err.to_string().contains("batch_size"));
    }
}
