// ── Collection cycle facade ──
//
// `Monitor` wires discovery, deduplication and the batch scheduler into a
// single `collect()` call. The caller owns the schedule: one call is one
// cycle, and a cycle always produces a report.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexMap;
use sitewatch_api::{HandshakeInspector, ReachabilityProbe, TransportConfig};
use tracing::info;

use crate::config::MonitorConfig;
use crate::dedup::dedupe;
use crate::discovery::ConfigDiscovery;
use crate::error::CoreError;
use crate::inspector::CertificateInspector;
use crate::model::{RawSiteEntry, SiteReport};
use crate::reader::{FileReader, RoutedReader};
use crate::scheduler::{BatchScheduler, LiveSiteCheck};

/// Receives each cycle's report, typically for submission upstream.
pub trait ReportSink: Send + Sync {
    fn submit(&self, report: &SiteReport) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// One agent's monitoring pipeline.
#[derive(Debug, Clone)]
pub struct Monitor<R> {
    config: MonitorConfig,
    discovery: ConfigDiscovery<R>,
    check: Arc<LiveSiteCheck<R>>,
    scheduler: BatchScheduler,
}

impl Monitor<RoutedReader> {
    /// Build a monitor that reads root-owned trees through `sudo`.
    pub fn new(config: MonitorConfig) -> Result<Self, CoreError> {
        let reader = RoutedReader::new(
            config.privileged_prefixes.clone(),
            config.privileged_read_timeout,
        );
        Self::with_reader(config, reader)
    }
}

impl<R: FileReader + Clone + 'static> Monitor<R> {
    /// Build a monitor around a custom file reader.
    pub fn with_reader(config: MonitorConfig, reader: R) -> Result<Self, CoreError> {
        config.validate()?;

        let transport = TransportConfig::default()
            .with_timeout(config.probe_timeout)
            .with_user_agent(config.user_agent.clone());
        let probe = ReachabilityProbe::new(&transport)?;
        let handshake = HandshakeInspector::new(config.handshake_timeout)?;
        let inspector =
            CertificateInspector::new(reader.clone(), handshake, config.panel_cert_roots.clone());

        Ok(Self {
            discovery: ConfigDiscovery::new(config.clone(), reader),
            check: Arc::new(LiveSiteCheck::new(inspector, probe)),
            scheduler: BatchScheduler::new(config.batch_size, config.batch_pause),
            config,
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn inspector(&self) -> &CertificateInspector<R> {
        self.check.inspector()
    }

    pub fn probe(&self) -> &ReachabilityProbe {
        self.check.probe()
    }

    /// Raw entries from every layout, duplicates included.
    pub async fn discover(&self) -> Vec<RawSiteEntry> {
        self.discovery.discover().await
    }

    /// Discovered entries collapsed to one per domain.
    pub async fn unique_sites(&self) -> IndexMap<String, RawSiteEntry> {
        dedupe(self.discover().await)
    }

    /// Run one full cycle: discover, dedupe, check every site.
    pub async fn collect(&self) -> SiteReport {
        let unique = self.unique_sites().await;
        info!(sites = unique.len(), "starting collection cycle");

        let sites = self
            .scheduler
            .run(Arc::clone(&self.check), unique.into_values().collect())
            .await;
        let report = SiteReport::new(Utc::now(), sites);

        info!(
            total = report.summary.total,
            reachable = report.summary.reachable,
            expiring_soon = report.summary.expiring_soon,
            expired = report.summary.expired,
            "collection cycle complete"
        );
        report
    }

    /// Run one cycle and hand the report to `sink`.
    pub async fn collect_into<S: ReportSink>(&self, sink: &S) -> Result<SiteReport, CoreError> {
        let report = self.collect().await;
        sink.submit(&report).await?;
        Ok(report)
    }
}
