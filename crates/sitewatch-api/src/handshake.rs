// Live TLS handshake certificate fetch.
//
// Connects to `domain:port` over IPv4, sends the domain as SNI, and reads
// the leaf certificate the server presents. The chain is deliberately not
// validated: expired, self-signed and mismatched certificates must still
// be readable.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

use crate::certificate::not_after_from_der;
use crate::error::Error;

/// Fetches peer certificates via a TLS handshake.
#[derive(Clone)]
pub struct HandshakeInspector {
    connector: TlsConnector,
    timeout: Duration,
}

impl std::fmt::Debug for HandshakeInspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandshakeInspector")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HandshakeInspector {
    /// Build an inspector whose whole connect + handshake is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let config = ClientConfig::builder_with_provider(Arc::clone(&provider))
            .with_safe_default_protocol_versions()
            .map_err(|e| Error::Tls(format!("unsupported protocol versions: {e}")))?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert(provider)))
            .with_no_client_auth();

        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            timeout,
        })
    }

    /// The handshake timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Handshake with `domain:port` and return the leaf certificate's expiry.
    pub async fn not_after(&self, domain: &str, port: u16) -> Result<DateTime<Utc>, Error> {
        let leaf = self.leaf_certificate(domain, port).await?;
        not_after_from_der(leaf.as_ref())
    }

    /// Handshake with `domain:port` and return the DER-encoded leaf certificate.
    pub async fn leaf_certificate(
        &self,
        domain: &str,
        port: u16,
    ) -> Result<CertificateDer<'static>, Error> {
        tokio::time::timeout(self.timeout, self.handshake(domain, port))
            .await
            .map_err(|_| Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            })?
    }

    async fn handshake(&self, domain: &str, port: u16) -> Result<CertificateDer<'static>, Error> {
        let addr = resolve_ipv4(domain, port).await?;
        let server_name = ServerName::try_from(domain.to_owned())
            .map_err(|e| Error::Tls(format!("invalid server name {domain:?}: {e}")))?;

        debug!(domain, %addr, "TLS handshake");
        let stream = TcpStream::connect(addr).await?;
        let tls = self
            .connector
            .connect(server_name, stream)
            .await
            .map_err(|e| Error::Tls(format!("handshake with {domain}:{port} failed: {e}")))?;

        let (_, connection) = tls.get_ref();
        connection
            .peer_certificates()
            .and_then(|chain| chain.first())
            .map(|leaf| leaf.clone().into_owned())
            .ok_or_else(|| Error::NoPeerCertificate {
                host: domain.to_owned(),
            })
    }
}

/// Resolve `host:port` and keep the first IPv4 address.
async fn resolve_ipv4(host: &str, port: u16) -> Result<SocketAddr, Error> {
    let mut addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| Error::Resolve {
            host: host.to_owned(),
            reason: e.to_string(),
        })?;
    addrs.find(SocketAddr::is_ipv4).ok_or_else(|| Error::Resolve {
        host: host.to_owned(),
        reason: "no IPv4 address".into(),
    })
}

/// Certificate verifier that accepts any server certificate.
///
/// Handshake signatures are still checked against the provider's
/// algorithms; only chain and name validation are skipped.
#[derive(Debug)]
struct AcceptAnyServerCert(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_loopback_to_ipv4() {
        let addr = resolve_ipv4("127.0.0.1", 443).await.unwrap();
        assert!(addr.is_ipv4());
        assert_eq!(addr.port(), 443);
    }

    #[tokio::test]
    async fn ipv6_literal_has_no_ipv4_address() {
        let err = resolve_ipv4("::1", 443).await.unwrap_err();
        assert!(matches!(err, Error::Resolve { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn refused_connection_is_an_error_not_a_panic() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let inspector = HandshakeInspector::new(Duration::from_secs(2)).unwrap();
        assert!(inspector.not_after("127.0.0.1", port).await.is_err());
    }
}
