use thiserror::Error;

/// Top-level error type for the `sitewatch-api` crate.
///
/// Covers every outbound failure mode: HTTP transport, DNS resolution,
/// TLS handshakes, and certificate decoding. `sitewatch-core` maps these
/// into per-site diagnostics; none of them ever abort a collection cycle.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Operation timed out.
    #[error("Timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Socket-level I/O failure outside of reqwest (raw TCP connects).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Host name did not resolve to a usable IPv4 address.
    #[error("Cannot resolve {host}: {reason}")]
    Resolve { host: String, reason: String },

    // ── TLS ─────────────────────────────────────────────────────────
    /// TLS configuration or handshake error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Handshake completed but the peer sent no certificate.
    #[error("No certificate presented by {host}")]
    NoPeerCertificate { host: String },

    // ── Data ────────────────────────────────────────────────────────
    /// The certificate could not be decoded or carries no usable validity.
    #[error("Certificate error: {0}")]
    Certificate(String),
}

impl Error {
    /// Returns `true` if this error is a timeout of any layer.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error that might resolve
    /// on the next collection cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::Resolve { .. } | Self::Io(_) => true,
            _ => false,
        }
    }
}
