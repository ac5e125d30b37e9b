// sitewatch-api: outbound probes (HTTP reachability, TLS handshake, X.509 expiry)

pub mod certificate;
pub mod error;
pub mod handshake;
pub mod probe;
pub mod transport;

pub use certificate::{not_after_from_der, not_after_from_pem};
pub use error::Error;
pub use handshake::HandshakeInspector;
pub use probe::{ProbeOutcome, ReachabilityProbe, probe_url};
pub use transport::{DEFAULT_USER_AGENT, TlsMode, TransportConfig};
