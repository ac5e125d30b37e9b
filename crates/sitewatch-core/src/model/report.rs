// ── Per-cycle report ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::site::Site;

/// Certificates expiring within this many days count as "expiring soon".
pub const EXPIRING_SOON_DAYS: i64 = 14;

/// Everything one collection cycle produced, handed to the submission client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteReport {
    pub collected_at: DateTime<Utc>,
    pub summary: ReportSummary,
    pub sites: Vec<Site>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total: usize,
    pub reachable: usize,
    pub tls: usize,
    pub expiring_soon: usize,
    pub expired: usize,
}

impl ReportSummary {
    pub fn from_sites(sites: &[Site]) -> Self {
        sites.iter().fold(Self::default(), |mut acc, site| {
            acc.total += 1;
            acc.reachable += usize::from(site.is_reachable);
            acc.tls += usize::from(site.entry.is_tls);
            acc.expiring_soon += usize::from(site.expires_within(EXPIRING_SOON_DAYS));
            acc.expired += usize::from(site.is_expired());
            acc
        })
    }
}

impl SiteReport {
    pub fn new(collected_at: DateTime<Utc>, mut sites: Vec<Site>) -> Self {
        sites.sort_by(|a, b| a.entry.domain.cmp(&b.entry.domain));
        let summary = ReportSummary::from_sites(&sites);
        Self {
            collected_at,
            summary,
            sites,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::model::{RawSiteEntry, SiteOrigin};

    fn site(domain: &str, is_tls: bool, reachable: bool, days: Option<i64>) -> Site {
        let mut site = Site::from(RawSiteEntry {
            domain: domain.into(),
            config_path: format!("/etc/nginx/sites-enabled/{domain}"),
            is_enabled: true,
            port: if is_tls { 443 } else { 80 },
            is_tls,
            cert_path: None,
            origin: SiteOrigin::Standard,
        });
        site.is_reachable = reachable;
        site.cert_days_remaining = days;
        site
    }

    #[test]
    fn summary_counts() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let report = SiteReport::new(
            at,
            vec![
                site("c.example", true, true, Some(90)),
                site("a.example", true, false, Some(3)),
                site("b.example", false, true, None),
                site("d.example", true, true, Some(-2)),
            ],
        );

        assert_eq!(
            report.summary,
            ReportSummary {
                total: 4,
                reachable: 3,
                tls: 3,
                expiring_soon: 1,
                expired: 1,
            }
        );
        let domains: Vec<_> = report.sites.iter().map(Site::domain).collect();
        assert_eq!(domains, ["a.example", "b.example", "c.example", "d.example"]);
    }
}
