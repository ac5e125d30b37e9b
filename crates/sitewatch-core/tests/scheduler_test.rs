#![allow(clippy::unwrap_used)]

// Integration tests for the batch scheduler: batching, the inter-batch
// pause, and failure isolation between sites.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::time::Instant;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use sitewatch_api::{HandshakeInspector, ReachabilityProbe, TransportConfig};
use sitewatch_core::{
    BatchScheduler, CertificateInspector, LiveSiteCheck, LocalReader, RawSiteEntry, Site,
    SiteCheck, SiteOrigin,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn entry(domain: &str, port: u16) -> RawSiteEntry {
    RawSiteEntry {
        domain: domain.into(),
        config_path: format!("/etc/nginx/sites-enabled/{domain}"),
        is_enabled: true,
        port,
        is_tls: false,
        cert_path: None,
        origin: SiteOrigin::Standard,
    }
}

fn entries(n: usize) -> Vec<RawSiteEntry> {
    (0..n).map(|i| entry(&format!("site{i}.example.com"), 80)).collect()
}

/// Sleeps a fixed time per site and records when each check started.
struct RecordingCheck {
    started: Instant,
    work: Duration,
    starts: Mutex<Vec<(String, Duration)>>,
}

impl RecordingCheck {
    fn new(work: Duration) -> Self {
        Self {
            started: Instant::now(),
            work,
            starts: Mutex::new(Vec::new()),
        }
    }

    fn start_offsets(&self) -> Vec<Duration> {
        let mut starts = self.starts.lock().unwrap().clone();
        starts.sort_by(|a, b| a.0.cmp(&b.0));
        starts.into_iter().map(|(_, at)| at).collect()
    }
}

impl SiteCheck for RecordingCheck {
    async fn check(&self, entry: RawSiteEntry) -> Site {
        let at = self.started.elapsed();
        self.starts.lock().unwrap().push((entry.domain.clone(), at));
        tokio::time::sleep(self.work).await;
        let mut site = Site::from(entry);
        site.is_reachable = true;
        site
    }
}

/// Panics for one domain, succeeds for the rest.
struct PanickyCheck {
    bad: &'static str,
}

impl SiteCheck for PanickyCheck {
    async fn check(&self, entry: RawSiteEntry) -> Site {
        assert_ne!(entry.domain, self.bad, "check blew up");
        let mut site = Site::from(entry);
        site.is_reachable = true;
        site.http_status_code = Some(200);
        site
    }
}

fn batch_of(offset: Duration) -> u128 {
    offset.as_millis() / 1000
}

// ── Batching ────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn batches_run_in_sequence_with_pause() {
    let check = Arc::new(RecordingCheck::new(Duration::from_millis(100)));
    let scheduler = BatchScheduler::new(3, Duration::from_millis(2000));

    let started = Instant::now();
    let sites = scheduler.run(Arc::clone(&check), entries(7)).await;
    let elapsed = started.elapsed();

    assert_eq!(sites.len(), 7);
    assert!(sites.iter().all(|s| s.is_reachable));

    // 3 + 3 + 1: three rounds of 100ms work, two 2000ms pauses.
    assert!(elapsed >= Duration::from_millis(4300), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(4400), "{elapsed:?}");

    // site0..2 start at ~0ms, site3..5 at ~2100ms, site6 at ~4200ms.
    let batches: Vec<u128> = check.start_offsets().into_iter().map(batch_of).collect();
    assert_eq!(batches, [0, 0, 0, 2, 2, 2, 4]);
}

#[tokio::test(start_paused = true)]
async fn no_pause_after_final_batch() {
    let check = Arc::new(RecordingCheck::new(Duration::from_millis(100)));
    let scheduler = BatchScheduler::new(3, Duration::from_millis(2000));

    let started = Instant::now();
    let sites = scheduler.run(check, entries(3)).await;

    assert_eq!(sites.len(), 3);
    assert!(started.elapsed() < Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn empty_input_is_empty_output() {
    let check = Arc::new(RecordingCheck::new(Duration::from_millis(100)));
    let scheduler = BatchScheduler::new(3, Duration::from_millis(2000));

    let started = Instant::now();
    assert!(scheduler.run(check, Vec::new()).await.is_empty());
    assert_eq!(started.elapsed(), Duration::ZERO);
}

// ── Isolation ───────────────────────────────────────────────────────

#[tokio::test]
async fn panicking_check_leaves_unset_site() {
    let check = Arc::new(PanickyCheck {
        bad: "site1.example.com",
    });
    let scheduler = BatchScheduler::new(3, Duration::from_millis(10));

    let sites = scheduler.run(check, entries(5)).await;
    assert_eq!(sites.len(), 5);

    let bad = sites.iter().find(|s| s.domain() == "site1.example.com").unwrap();
    assert!(!bad.is_reachable);
    assert_eq!(bad.http_status_code, None);
    assert_eq!(bad.cert_expiry, None);

    let good = sites.iter().filter(|s| s.is_reachable).count();
    assert_eq!(good, 4);
}

#[tokio::test]
async fn slow_site_does_not_hold_up_its_batch() {
    let fast = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&fast)
        .await;
    let slow = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&slow)
        .await;

    let timeout = Duration::from_millis(500);
    let transport = TransportConfig::default().with_timeout(timeout);
    let probe = ReachabilityProbe::new(&transport).unwrap();
    let inspector = CertificateInspector::new(
        LocalReader,
        HandshakeInspector::new(Duration::from_secs(1)).unwrap(),
        Vec::new(),
    );
    let check = Arc::new(LiveSiteCheck::new(inspector, probe));

    let batch = vec![
        entry("127.0.0.1", fast.address().port()),
        entry("127.0.0.1", slow.address().port()),
        entry("127.0.0.1", fast.address().port()),
    ];
    let started = std::time::Instant::now();
    let sites = BatchScheduler::new(3, Duration::from_secs(2))
        .run(check, batch)
        .await;

    // Bounded by the slow probe's own timeout, not its 10s delay.
    assert!(started.elapsed() < Duration::from_secs(5), "{:?}", started.elapsed());
    assert_eq!(sites.len(), 3);

    let reachable: Vec<(u16, bool, Option<u16>)> = sites
        .iter()
        .map(|s| (s.entry.port, s.is_reachable, s.http_status_code))
        .collect();
    assert_eq!(
        reachable,
        [
            (fast.address().port(), true, Some(200)),
            (slow.address().port(), false, None),
            (fast.address().port(), true, Some(200)),
        ]
    );
    assert!(sites.iter().all(|s| s.cert_expiry.is_none()));
}
