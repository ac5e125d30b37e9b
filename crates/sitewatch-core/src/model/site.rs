// ── Site domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use sitewatch_api::ProbeOutcome;

/// Which discovery layout produced an entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SiteOrigin {
    /// Standard `sites-enabled` / `sites-available` layout.
    #[default]
    Standard,
    /// Hosting-panel generated vhost or auxiliary fragment.
    Panel,
}

impl SiteOrigin {
    /// The `config_path` as reported for this origin. Panel paths carry a
    /// `panel:` tag so the report shows where a definition came from.
    pub fn tag_path(self, path: &str) -> String {
        match self {
            Self::Standard => path.to_owned(),
            Self::Panel => format!("panel:{path}"),
        }
    }
}

/// One parsed vhost definition, before deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSiteEntry {
    /// First non-wildcard `server_name`, or the first name if all are `_`.
    pub domain: String,
    /// Source file, tagged with its origin.
    pub config_path: String,
    pub is_enabled: bool,
    pub port: u16,
    pub is_tls: bool,
    pub cert_path: Option<String>,
    #[serde(default)]
    pub origin: SiteOrigin,
}

/// A monitored site: the merged definition plus this cycle's findings.
///
/// Unset findings mean "could not verify this cycle", not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    #[serde(flatten)]
    pub entry: RawSiteEntry,
    pub is_reachable: bool,
    pub http_status_code: Option<u16>,
    pub response_time_ms: Option<u64>,
    pub cert_expiry: Option<DateTime<Utc>>,
    /// Whole days until `cert_expiry`, floored; negative once expired.
    pub cert_days_remaining: Option<i64>,
}

impl From<RawSiteEntry> for Site {
    fn from(entry: RawSiteEntry) -> Self {
        Self {
            entry,
            is_reachable: false,
            http_status_code: None,
            response_time_ms: None,
            cert_expiry: None,
            cert_days_remaining: None,
        }
    }
}

impl Site {
    pub fn domain(&self) -> &str {
        &self.entry.domain
    }

    /// Record a reachability probe outcome.
    pub fn apply_probe(&mut self, outcome: ProbeOutcome) {
        self.is_reachable = outcome.is_reachable;
        self.http_status_code = outcome.status_code;
        self.response_time_ms = outcome.response_time_ms;
    }

    /// Record a certificate inspection result.
    pub fn apply_certificate(&mut self, status: CertificateStatus) {
        self.cert_expiry = Some(status.expiry);
        self.cert_days_remaining = Some(status.days_remaining);
    }

    /// `true` once the certificate's notAfter has passed.
    pub fn is_expired(&self) -> bool {
        self.cert_days_remaining.is_some_and(|d| d < 0)
    }

    /// `true` if the certificate is still valid but expires within `days`.
    pub fn expires_within(&self, days: i64) -> bool {
        self.cert_days_remaining
            .is_some_and(|d| (0..=days).contains(&d))
    }
}

/// Expiry of a site's certificate relative to the inspection time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateStatus {
    pub expiry: DateTime<Utc>,
    pub days_remaining: i64,
}

impl CertificateStatus {
    pub fn new(expiry: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            expiry,
            days_remaining: days_remaining(expiry, now),
        }
    }
}

/// `floor((expiry - now) / 1 day)`.
pub fn days_remaining(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (expiry - now).num_seconds().div_euclid(86_400)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn entry() -> RawSiteEntry {
        RawSiteEntry {
            domain: "shop.example.com".into(),
            config_path: "/etc/nginx/sites-enabled/shop".into(),
            is_enabled: true,
            port: 443,
            is_tls: true,
            cert_path: Some("/etc/ssl/shop.pem".into()),
            origin: SiteOrigin::Standard,
        }
    }

    #[test]
    fn exactly_ten_days() {
        assert_eq!(days_remaining(now() + Duration::days(10), now()), 10);
    }

    #[test]
    fn partial_days_floor() {
        let expiry = now() + Duration::days(10) - Duration::seconds(1);
        assert_eq!(days_remaining(expiry, now()), 9);
    }

    #[test]
    fn expired_certificates_go_negative() {
        assert_eq!(days_remaining(now() - Duration::days(3), now()), -3);
        // Expired by one second still counts as a full day in the past.
        assert_eq!(days_remaining(now() - Duration::seconds(1), now()), -1);
    }

    #[test]
    fn new_site_has_unset_findings() {
        let site = Site::from(entry());
        assert!(!site.is_reachable);
        assert_eq!(site.http_status_code, None);
        assert_eq!(site.cert_expiry, None);
        assert_eq!(site.cert_days_remaining, None);
    }

    #[test]
    fn apply_findings() {
        let mut site = Site::from(entry());
        site.apply_probe(ProbeOutcome {
            is_reachable: true,
            status_code: Some(200),
            response_time_ms: Some(42),
        });
        site.apply_certificate(CertificateStatus::new(now() + Duration::days(5), now()));

        assert!(site.is_reachable);
        assert_eq!(site.http_status_code, Some(200));
        assert_eq!(site.cert_days_remaining, Some(5));
        assert!(site.expires_within(14));
        assert!(!site.is_expired());
    }

    #[test]
    fn panel_paths_are_tagged() {
        assert_eq!(SiteOrigin::Panel.tag_path("/home/a/conf/web/x/nginx.conf"), "panel:/home/a/conf/web/x/nginx.conf");
        assert_eq!(SiteOrigin::Standard.tag_path("/etc/nginx/sites-enabled/x"), "/etc/nginx/sites-enabled/x");
        assert_eq!(SiteOrigin::Panel.to_string(), "panel");
    }

    #[test]
    fn site_serializes_flat_camel_case() {
        let json = serde_json::to_value(Site::from(entry())).unwrap();
        assert_eq!(json["domain"], "shop.example.com");
        assert_eq!(json["isTls"], true);
        assert_eq!(json["certPath"], "/etc/ssl/shop.pem");
        assert_eq!(json["isReachable"], false);
        assert!(json["certDaysRemaining"].is_null());
    }
}
