use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wgwatch::pipeline;
use wgwatch::WatchError;
use wgwatch_core::{Listing, ListingId};
use wgwatch_notify::{Notifier, NotifyError};
use wgwatch_scanner::{Acquirer, ListingSource, ScanError};
use wgwatch_store::{SentSet, SentStore};

/// Source returning a fixed set of anchors, or failing.
struct Anchors {
    listings: Option<Vec<Listing>>,
    calls: AtomicUsize,
}

impl Anchors {
    fn of(ids: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            listings: Some(ids.iter().map(|id| listing(id)).collect()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            listings: None,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ListingSource for Anchors {
    fn name(&self) -> &'static str {
        "anchors"
    }

    async fn fetch(&self, _query: &str) -> wgwatch_scanner::Result<Vec<Listing>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.listings
            .clone()
            .ok_or_else(|| ScanError::Scrape("no listings found after search".to_string()))
    }
}

/// Records delivered listings; fails on the listing with `fail_on` id.
#[derive(Default)]
struct RecordingNotifier {
    delivered: Mutex<Vec<String>>,
    fail_on: Option<&'static str>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, listing: &Listing) -> wgwatch_notify::Result<()> {
        if self.fail_on == Some(listing.id.as_str()) {
            return Err(NotifyError::Rejected {
                status: 429,
                body: "Too Many Requests".to_string(),
            });
        }
        self.delivered
            .lock()
            .unwrap()
            .push(listing.id.as_str().to_string());
        Ok(())
    }
}

fn listing(id: &str) -> Listing {
    Listing::from_anchor(
        &format!("https://www.wgzimmer.ch/wglink/de/{id}/zimmer-frei.html"),
        &format!("<b>Zimmer</b> {id}"),
    )
    .expect("valid listing")
}

fn id(raw: &str) -> ListingId {
    listing(raw).id
}

fn acquirer(source: &Arc<Anchors>) -> Acquirer {
    Acquirer::new(source.clone(), Anchors::failing()).with_max_attempts(1)
}

fn ids(sent: &SentSet) -> Vec<&str> {
    sent.iter().map(ListingId::as_str).collect()
}

#[tokio::test]
async fn test_end_to_end_single_new_listing() {
    let dir = TempDir::new().expect("temp dir");
    let store = SentStore::new(dir.path().join("data").join("sent.json"));
    store
        .save(&[id("123456")].into_iter().collect())
        .expect("seed store");

    let source = Anchors::of(&["123456", "654321"]);
    let notifier = RecordingNotifier::default();

    let notified = pipeline::run(&acquirer(&source), &notifier, &store, "zurich")
        .await
        .expect("run");

    assert_eq!(notified, 1);
    assert_eq!(*notifier.delivered.lock().unwrap(), vec!["654321"]);
    assert_eq!(ids(&store.load().expect("load")), vec!["123456", "654321"]);
}

#[tokio::test]
async fn test_second_run_sends_nothing() {
    let dir = TempDir::new().expect("temp dir");
    let store = SentStore::new(dir.path().join("sent.json"));
    let source = Anchors::of(&["1", "2", "3"]);

    let first = RecordingNotifier::default();
    let sent_first = pipeline::run(&acquirer(&source), &first, &store, "zurich")
        .await
        .expect("first run");
    assert_eq!(sent_first, 3);

    let second = RecordingNotifier::default();
    let sent_second = pipeline::run(&acquirer(&source), &second, &store, "zurich")
        .await
        .expect("second run");
    assert_eq!(sent_second, 0);
    assert!(second.delivered.lock().unwrap().is_empty());
    assert_eq!(store.load().expect("load").len(), 3);
}

#[tokio::test]
async fn test_notify_failure_persists_delivered_ids() {
    let dir = TempDir::new().expect("temp dir");
    let store = SentStore::new(dir.path().join("sent.json"));
    let source = Anchors::of(&["111", "222", "333"]);
    let notifier = RecordingNotifier {
        fail_on: Some("222"),
        ..RecordingNotifier::default()
    };

    let err = pipeline::run(&acquirer(&source), &notifier, &store, "zurich")
        .await
        .expect_err("second notification fails");

    assert!(matches!(
        err,
        WatchError::Notify(NotifyError::Rejected { status: 429, .. })
    ));
    assert_eq!(*notifier.delivered.lock().unwrap(), vec!["111"]);
    assert_eq!(ids(&store.load().expect("load")), vec!["111"]);
}

#[tokio::test]
async fn test_duplicate_anchors_notified_once() {
    let dir = TempDir::new().expect("temp dir");
    let store = SentStore::new(dir.path().join("sent.json"));
    let source = Anchors::of(&["42", "42"]);
    let notifier = RecordingNotifier::default();

    let notified = pipeline::run(&acquirer(&source), &notifier, &store, "zurich")
        .await
        .expect("run");
    assert_eq!(notified, 1);
}

#[tokio::test]
async fn test_acquisition_failure_leaves_store_untouched() {
    let dir = TempDir::new().expect("temp dir");
    let store = SentStore::new(dir.path().join("sent.json"));
    store
        .save(&[id("7")].into_iter().collect())
        .expect("seed store");
    let failing = Anchors::failing();
    let notifier = RecordingNotifier::default();

    let err = pipeline::run(&acquirer(&failing), &notifier, &store, "zurich")
        .await
        .expect_err("acquisition fails");

    assert!(matches!(err, WatchError::Scan(ScanError::Scrape(_))));
    assert!(notifier.delivered.lock().unwrap().is_empty());
    assert_eq!(ids(&store.load().expect("load")), vec!["7"]);
}
