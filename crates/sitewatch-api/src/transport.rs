// Shared transport configuration for building reqwest::Client instances.
//
// The reachability probe and any future HTTP consumer share TLS, timeout,
// user-agent and address-family settings through this module.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use reqwest::redirect::Policy;

use crate::error::Error;

/// User agent sent by every outbound request unless overridden.
pub const DEFAULT_USER_AGENT: &str = concat!("sitewatch-agent/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode for outbound HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// Use the bundled web PKI roots.
    System,
    /// Accept any certificate. Monitored sites are probed for liveness,
    /// not trusted, so this is the default.
    #[default]
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub user_agent: String,
    /// Bind outbound sockets to an IPv4 local address, which restricts
    /// resolution results to A records.
    pub force_ipv4: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::default(),
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            force_ipv4: true,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// Redirects are not followed: the probe reports the status the
    /// monitored host actually returned.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .redirect(Policy::none());

        if self.tls == TlsMode::DangerAcceptInvalid {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if self.force_ipv4 {
            builder = builder.local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_transport_matches_probe_contract() {
        let config = TransportConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.tls, TlsMode::DangerAcceptInvalid);
        assert!(config.force_ipv4);
        assert!(config.user_agent.starts_with("sitewatch-agent/"));
    }

    #[test]
    fn builders_override_fields() {
        let config = TransportConfig::default()
            .with_timeout(Duration::from_millis(250))
            .with_user_agent("probe/1");
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.user_agent, "probe/1");
        assert!(config.build_client().is_ok());
    }
}
