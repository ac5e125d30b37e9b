// Single-request HTTP(S) reachability probe.
//
// One GET per site per cycle. No retries, no redirects; any HTTP response
// means the site is reachable, and every failure collapses into an
// unreachable outcome rather than an error.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Result of probing one site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeOutcome {
    pub is_reachable: bool,
    pub status_code: Option<u16>,
    pub response_time_ms: Option<u64>,
}

impl ProbeOutcome {
    /// The outcome reported whenever the request did not produce a response.
    pub const UNREACHABLE: Self = Self {
        is_reachable: false,
        status_code: None,
        response_time_ms: None,
    };
}

/// Build the probe URL for a site.
///
/// The port is omitted when it is the scheme's standard port (80 for
/// `http`, 443 for `https`), matching how a browser would address it.
pub fn probe_url(domain: &str, port: u16, is_tls: bool) -> Result<Url, Error> {
    let (scheme, standard_port) = if is_tls { ("https", 443) } else { ("http", 80) };
    let raw = if port == standard_port {
        format!("{scheme}://{domain}")
    } else {
        format!("{scheme}://{domain}:{port}")
    };
    Ok(Url::parse(&raw)?)
}

/// Reachability probe backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReachabilityProbe {
    http: reqwest::Client,
    timeout: Duration,
}

impl ReachabilityProbe {
    /// Create a probe from a `TransportConfig`.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            timeout: transport.timeout,
        })
    }

    /// Create a probe around a pre-built client.
    pub fn with_client(http: reqwest::Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe a site. Never fails: transport errors, timeouts and TLS
    /// failures are logged and reported as [`ProbeOutcome::UNREACHABLE`].
    pub async fn probe(&self, domain: &str, port: u16, is_tls: bool) -> ProbeOutcome {
        match self.try_probe(domain, port, is_tls).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(domain, port, error = %e, "site unreachable");
                ProbeOutcome::UNREACHABLE
            }
        }
    }

    /// Probe a site, surfacing the underlying error.
    ///
    /// Latency is measured from request start until the response head
    /// arrives; the body is never read.
    pub async fn try_probe(&self, domain: &str, port: u16, is_tls: bool) -> Result<ProbeOutcome, Error> {
        let url = probe_url(domain, port, is_tls)?;
        debug!("GET {}", url);

        let started = Instant::now();
        let request = self.http.get(url).timeout(self.timeout).send();
        let resp = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            })??;
        let elapsed = started.elapsed();

        let status = resp.status().as_u16();
        let response_time_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        debug!(domain, status, response_time_ms, "probe complete");

        Ok(ProbeOutcome {
            is_reachable: true,
            status_code: Some(status),
            response_time_ms: Some(response_time_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_tls_port_is_omitted() {
        let url = probe_url("example.com", 443, true).unwrap();
        assert_eq!(url.as_str().trim_end_matches('/'), "https://example.com");
    }

    #[test]
    fn non_standard_tls_port_is_kept() {
        let url = probe_url("example.com", 8443, true).unwrap();
        assert_eq!(url.as_str().trim_end_matches('/'), "https://example.com:8443");
    }

    #[test]
    fn plain_http_port_rules() {
        let std_port = probe_url("example.com", 80, false).unwrap();
        assert_eq!(std_port.as_str().trim_end_matches('/'), "http://example.com");

        let custom = probe_url("example.com", 8080, false).unwrap();
        assert_eq!(custom.port(), Some(8080));

        // 443 without TLS is not the http standard port.
        let odd = probe_url("example.com", 443, false).unwrap();
        assert_eq!(odd.as_str().trim_end_matches('/'), "http://example.com:443");
    }

    #[test]
    fn invalid_domain_is_an_error() {
        assert!(matches!(
            probe_url("bad host", 80, false),
            Err(Error::InvalidUrl(_))
        ));
    }
}
