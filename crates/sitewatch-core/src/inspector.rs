// ── Certificate expiry inspection ──
//
// Two strategies chosen by where the certificate lives: panel-managed
// certificates are read straight from disk, everything else is fetched
// over a live handshake.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use sitewatch_api::{HandshakeInspector, not_after_from_pem};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{CertificateStatus, RawSiteEntry};
use crate::reader::FileReader;

/// How a site's certificate expiry is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertStrategy {
    /// Read and parse the certificate file.
    File(PathBuf),
    /// Handshake with `domain:port` and read the leaf certificate.
    Handshake,
}

impl CertStrategy {
    /// Pick a strategy for `entry`; `None` for plain-HTTP sites.
    pub fn select(entry: &RawSiteEntry, cert_roots: &[PathBuf]) -> Option<Self> {
        if !entry.is_tls {
            return None;
        }
        let strategy = entry
            .cert_path
            .as_deref()
            .map(Path::new)
            .filter(|path| cert_roots.iter().any(|root| path.starts_with(root)))
            .map_or(Self::Handshake, |path| Self::File(path.to_path_buf()));
        Some(strategy)
    }
}

/// Reads certificate expiry for TLS sites.
#[derive(Debug, Clone)]
pub struct CertificateInspector<R> {
    reader: R,
    handshake: HandshakeInspector,
    cert_roots: Vec<PathBuf>,
}

impl<R: FileReader> CertificateInspector<R> {
    pub fn new(reader: R, handshake: HandshakeInspector, cert_roots: Vec<PathBuf>) -> Self {
        Self {
            reader,
            handshake,
            cert_roots,
        }
    }

    pub fn strategy(&self, entry: &RawSiteEntry) -> Option<CertStrategy> {
        CertStrategy::select(entry, &self.cert_roots)
    }

    /// Inspect a site's certificate. Failures are logged against the
    /// domain and reported as `None`, same as a plain-HTTP site.
    pub async fn inspect(&self, entry: &RawSiteEntry, now: DateTime<Utc>) -> Option<CertificateStatus> {
        match self.try_inspect(entry, now).await {
            Ok(status) => status,
            Err(e) => {
                warn!(domain = %entry.domain, error = %e, "certificate inspection failed");
                None
            }
        }
    }

    /// Inspect a site's certificate, surfacing the failure.
    pub async fn try_inspect(
        &self,
        entry: &RawSiteEntry,
        now: DateTime<Utc>,
    ) -> Result<Option<CertificateStatus>, CoreError> {
        let Some(strategy) = self.strategy(entry) else {
            return Ok(None);
        };
        debug!(domain = %entry.domain, ?strategy, "inspecting certificate");

        let status = match strategy {
            CertStrategy::File(path) => self.inspect_file(&path, now).await,
            CertStrategy::Handshake => self.inspect_handshake(&entry.domain, entry.port, now).await,
        }
        .map_err(|e| match e {
            CoreError::Certificate { domain, reason } if domain.is_empty() => CoreError::Certificate {
                domain: entry.domain.clone(),
                reason,
            },
            other => other,
        })?;
        Ok(Some(status))
    }

    /// Read a PEM certificate file and compute its remaining validity.
    pub async fn inspect_file(&self, path: &Path, now: DateTime<Utc>) -> Result<CertificateStatus, CoreError> {
        let pem = self.reader.read_to_string(path).await?;
        let expiry = not_after_from_pem(pem.as_bytes())?;
        Ok(CertificateStatus::new(expiry, now))
    }

    /// Handshake with `domain:port` and compute the leaf's remaining validity.
    pub async fn inspect_handshake(
        &self,
        domain: &str,
        port: u16,
        now: DateTime<Utc>,
    ) -> Result<CertificateStatus, CoreError> {
        let expiry = self.handshake.not_after(domain, port).await?;
        Ok(CertificateStatus::new(expiry, now))
    }
}
