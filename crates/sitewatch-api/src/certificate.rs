// X.509 "not after" extraction.
//
// Both certificate strategies funnel through here: the file strategy hands
// in PEM text read from disk, the handshake strategy hands in the peer's
// DER-encoded leaf.

use chrono::{DateTime, Utc};
use x509_parser::certificate::X509Certificate;
use x509_parser::parse_x509_certificate;
use x509_parser::pem::Pem;

use crate::error::Error;

const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// Read the expiry of a DER-encoded certificate.
pub fn not_after_from_der(der: &[u8]) -> Result<DateTime<Utc>, Error> {
    let (_, cert) = parse_x509_certificate(der)
        .map_err(|e| Error::Certificate(format!("invalid DER certificate: {e}")))?;
    not_after(&cert)
}

/// Read the expiry of the first certificate in a PEM bundle.
///
/// Bundles often carry a private key or a chain alongside the leaf; the
/// first `CERTIFICATE` block is taken as the leaf and everything else is
/// skipped.
pub fn not_after_from_pem(pem: &[u8]) -> Result<DateTime<Utc>, Error> {
    for block in Pem::iter_from_buffer(pem) {
        let block = block.map_err(|e| Error::Certificate(format!("invalid PEM: {e}")))?;
        if block.label != CERTIFICATE_LABEL {
            continue;
        }
        let cert = block
            .parse_x509()
            .map_err(|e| Error::Certificate(format!("invalid certificate in PEM: {e}")))?;
        return not_after(&cert);
    }
    Err(Error::Certificate("no CERTIFICATE block found".into()))
}

fn not_after(cert: &X509Certificate<'_>) -> Result<DateTime<Utc>, Error> {
    let ts = cert.validity().not_after.timestamp();
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| Error::Certificate(format!("notAfter out of range: {ts}")))
}
