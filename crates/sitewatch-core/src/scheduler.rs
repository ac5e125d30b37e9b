// ── Batched site checks ──
//
// Sites are checked in fixed-size batches: every check in a batch runs
// concurrently, the next batch starts only after the whole batch is done
// and the pause has elapsed. A failing or panicking check yields a site
// with unset findings and never disturbs its siblings.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sitewatch_api::ReachabilityProbe;
use tracing::{debug, info, warn};

use crate::inspector::CertificateInspector;
use crate::model::{RawSiteEntry, Site};
use crate::reader::FileReader;

/// One site's full check. Infallible by contract: anything that could not
/// be verified is left unset on the returned [`Site`].
pub trait SiteCheck: Send + Sync + 'static {
    fn check(&self, entry: RawSiteEntry) -> impl Future<Output = Site> + Send;
}

// ── Live check ──────────────────────────────────────────────────────

/// Certificate inspection and reachability probe, run side by side.
#[derive(Debug, Clone)]
pub struct LiveSiteCheck<R> {
    inspector: CertificateInspector<R>,
    probe: ReachabilityProbe,
}

impl<R> LiveSiteCheck<R> {
    pub fn new(inspector: CertificateInspector<R>, probe: ReachabilityProbe) -> Self {
        Self { inspector, probe }
    }

    pub fn inspector(&self) -> &CertificateInspector<R> {
        &self.inspector
    }

    pub fn probe(&self) -> &ReachabilityProbe {
        &self.probe
    }
}

impl<R: FileReader + 'static> SiteCheck for LiveSiteCheck<R> {
    async fn check(&self, entry: RawSiteEntry) -> Site {
        let now = Utc::now();
        let (certificate, outcome) = tokio::join!(
            self.inspector.inspect(&entry, now),
            self.probe.probe(&entry.domain, entry.port, entry.is_tls),
        );

        let mut site = Site::from(entry);
        site.apply_probe(outcome);
        if let Some(status) = certificate {
            site.apply_certificate(status);
        }
        site
    }
}

// ── Scheduler ───────────────────────────────────────────────────────

/// Runs site checks in throttled batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchScheduler {
    batch_size: usize,
    pause: Duration,
}

impl BatchScheduler {
    /// A `batch_size` of zero is treated as one.
    pub fn new(batch_size: usize, pause: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            pause,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn pause(&self) -> Duration {
        self.pause
    }

    /// Check every entry and return one [`Site`] per entry.
    ///
    /// Output order follows input order, but callers should not rely on it.
    pub async fn run<C: SiteCheck>(&self, check: Arc<C>, entries: Vec<RawSiteEntry>) -> Vec<Site> {
        let batches = entries.len().div_ceil(self.batch_size);
        let mut sites = Vec::with_capacity(entries.len());

        for (index, batch) in entries.chunks(self.batch_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(self.pause).await;
            }
            debug!(batch = index + 1, of = batches, size = batch.len(), "checking batch");

            let handles: Vec<_> = batch
                .iter()
                .cloned()
                .map(|entry| {
                    let check = Arc::clone(&check);
                    tokio::spawn(async move { check.check(entry).await })
                })
                .collect();

            let results = futures_util::future::join_all(handles).await;
            for (entry, result) in batch.iter().zip(results) {
                match result {
                    Ok(site) => sites.push(site),
                    Err(e) => {
                        warn!(domain = %entry.domain, error = %e, "site check aborted");
                        sites.push(Site::from(entry.clone()));
                    }
                }
            }
        }

        info!(sites = sites.len(), batches, "site checks complete");
        sites
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_batch_size_is_clamped() {
        let scheduler = BatchScheduler::new(0, Duration::from_millis(2000));
        assert_eq!(scheduler.batch_size(), 1);
    }
}
