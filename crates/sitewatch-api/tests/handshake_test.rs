#![allow(clippy::unwrap_used)]
// Integration tests for `HandshakeInspector` against a local rustls server.

use std::sync::Arc;
use std::time::Duration;

use rustls::ServerConfig;
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

use sitewatch_api::{Error, HandshakeInspector};

const CERT_PEM: &[u8] = include_bytes!("fixtures/localhost.pem");
const KEY_PEM: &[u8] = include_bytes!("fixtures/localhost.key");

/// Fixture certificate notAfter: 2040-12-31T23:59:59Z.
const FIXTURE_NOT_AFTER: i64 = 2_240_611_199;

// ── Helpers ─────────────────────────────────────────────────────────

/// Spawn a TLS server presenting the fixture certificate; returns its port.
async fn spawn_tls_server() -> u16 {
    let certs: Vec<CertificateDer<'static>> = CertificateDer::pem_slice_iter(CERT_PEM)
        .collect::<Result<_, _>>()
        .unwrap();
    let key = PrivateKeyDer::from_pem_slice(KEY_PEM).unwrap();

    let config = ServerConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .unwrap()
    .with_no_client_auth()
    .with_single_cert(certs, key)
    .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                let _ = acceptor.accept(stream).await;
            });
        }
    });

    port
}

/// Spawn a TCP server that accepts and never speaks.
async fn spawn_silent_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    port
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_reads_leaf_expiry_with_sni() {
    let port = spawn_tls_server().await;
    let inspector = HandshakeInspector::new(Duration::from_secs(5)).unwrap();

    let expiry = inspector.not_after("localhost", port).await.unwrap();
    assert_eq!(expiry.timestamp(), FIXTURE_NOT_AFTER);
}

#[tokio::test]
async fn test_self_signed_certificate_is_not_rejected() {
    let port = spawn_tls_server().await;
    let inspector = HandshakeInspector::new(Duration::from_secs(5)).unwrap();

    // The fixture is self-signed; chain validation would fail here.
    let leaf = inspector.leaf_certificate("127.0.0.1", port).await.unwrap();
    assert!(!leaf.as_ref().is_empty());
}

#[tokio::test]
async fn test_silent_server_times_out() {
    let port = spawn_silent_server().await;
    let inspector = HandshakeInspector::new(Duration::from_millis(300)).unwrap();

    let err = inspector.not_after("127.0.0.1", port).await.unwrap_err();
    assert!(
        matches!(err, Error::Timeout { .. }),
        "expected timeout, got: {err:?}"
    );
}
