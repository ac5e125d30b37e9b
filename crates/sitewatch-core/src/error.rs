// ── Core error types ──
//
// Domain-level errors from sitewatch-core. Almost all of them are
// recovered locally: a failed file, layout or site is logged and skipped,
// and the collection cycle carries on. The `From<sitewatch_api::Error>`
// impl translates transport-layer errors into domain variants.

use thiserror::Error;

/// Why a config file did not yield a site entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseFailure {
    /// No `server_name` directive: an include or snippet, not a vhost.
    #[error("no server_name directive")]
    MissingServerName,

    /// A `server_name` directive with no names.
    #[error("server_name directive lists no names")]
    EmptyServerName,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Discovery errors ─────────────────────────────────────────────
    #[error("Cannot parse {path}: {failure}")]
    Parse { path: String, failure: ParseFailure },

    #[error("Cannot read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Privileged read of {path} failed: {reason}")]
    PrivilegedRead { path: String, reason: String },

    #[error("Discovery of {layout} layout failed: {reason}")]
    Discovery { layout: String, reason: String },

    // ── Probe errors ─────────────────────────────────────────────────
    #[error("Certificate inspection failed for {domain}: {reason}")]
    Certificate { domain: String, reason: String },

    #[error("Cannot connect to {target}: {reason}")]
    ConnectionFailed { target: String, reason: String },

    #[error("Timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` for errors that mean "could not verify this cycle"
    /// rather than a persistent misconfiguration.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::ConnectionFailed { .. } | Self::PrivilegedRead { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<sitewatch_api::Error> for CoreError {
    fn from(err: sitewatch_api::Error) -> Self {
        match err {
            sitewatch_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else {
                    CoreError::ConnectionFailed {
                        target: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                }
            }
            sitewatch_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            sitewatch_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            sitewatch_api::Error::Io(e) => CoreError::ConnectionFailed {
                target: String::new(),
                reason: e.to_string(),
            },
            sitewatch_api::Error::Resolve { host, reason } => CoreError::ConnectionFailed {
                target: host,
                reason: format!("resolution failed: {reason}"),
            },
            sitewatch_api::Error::Tls(reason) => CoreError::ConnectionFailed {
                target: String::new(),
                reason: format!("TLS error: {reason}"),
            },
            sitewatch_api::Error::NoPeerCertificate { host } => CoreError::Certificate {
                domain: host,
                reason: "peer presented no certificate".into(),
            },
            sitewatch_api::Error::Certificate(reason) => CoreError::Certificate {
                domain: String::new(),
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_timeout_maps_to_core_timeout() {
        let err = CoreError::from(sitewatch_api::Error::Timeout { timeout_secs: 20 });
        assert!(matches!(err, CoreError::Timeout { timeout_secs: 20 }));
        assert!(err.is_transient());
    }

    #[test]
    fn missing_peer_certificate_keeps_host() {
        let err = CoreError::from(sitewatch_api::Error::NoPeerCertificate {
            host: "shop.example.com".into(),
        });
        match err {
            CoreError::Certificate { domain, .. } => assert_eq!(domain, "shop.example.com"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn parse_failure_display() {
        let err = CoreError::Parse {
            path: "/etc/nginx/sites-enabled/snippet".into(),
            failure: ParseFailure::MissingServerName,
        };
        assert_eq!(
            err.to_string(),
            "Cannot parse /etc/nginx/sites-enabled/snippet: no server_name directive"
        );
    }
}
