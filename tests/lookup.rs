//! End-to-end lookup tests against a canned feed transport.

use ip_whitelist::{
    Error, FeedFetcher, FeedRequest, FeedResponse, Processor, Transport, TransportError,
};
use parking_lot::Mutex;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Transport returning a fixed status and body, counting calls.
struct CannedTransport {
    status: Mutex<u16>,
    body: &'static str,
    calls: AtomicUsize,
    last_url: Mutex<Option<String>>,
}

impl CannedTransport {
    fn new(status: u16, body: &'static str) -> Self {
        Self {
            status: Mutex::new(status),
            body,
            calls: AtomicUsize::new(0),
            last_url: Mutex::new(None),
        }
    }
}

impl Transport for CannedTransport {
    fn execute(&self, request: &FeedRequest) -> Result<FeedResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_url.lock() = Some(request.url.to_string());
        Ok(FeedResponse {
            status: *self.status.lock(),
            body: Box::new(Cursor::new(self.body.as_bytes())),
        })
    }
}

fn calls(processor: &Processor<CannedTransport>) -> usize {
    processor.fetcher().transport().calls.load(Ordering::SeqCst)
}

#[test]
fn test_single_record_lookup() {
    let transport =
        CannedTransport::new(200, "ripencc|US|ipv4|192.168.0.0|256|20220101|allocated");
    let processor = Processor::new(transport, Duration::from_secs(3600));

    assert_eq!(processor.lookup("us").unwrap(), vec!["192.168.0.0/24"]);
    assert_eq!(calls(&processor), 1);
}

#[test]
fn test_malformed_count_line_dropped() {
    let feed = "# comment

invalid|line
ripencc|US|ipv4|192.168.0.0|256|20220101|allocated
ripencc|FR|ipv6|2001:db8::|1|20220101|allocated
apnic|CN|ipv4|172.16.0.0|4096|20220101|allocated
ripencc|DE|ipv4|10.0.0.0|notanint|20220101|allocated
ripencc|DE|ipv4|10.0.0.0|65536|20220101|allocated";

    let processor = Processor::new(CannedTransport::new(200, feed), Duration::from_secs(3600));

    assert_eq!(processor.lookup("DE").unwrap(), vec!["10.0.0.0/16"]);
    assert!(processor.lookup("FR").unwrap().is_empty());
    assert!(processor.lookup("CN").unwrap().is_empty());
    assert_eq!(processor.country_count(), 2);
    assert_eq!(calls(&processor), 1);
}

#[test]
fn test_server_error_leaves_cache_stale() {
    let processor = Processor::new(CannedTransport::new(500, ""), Duration::from_secs(3600));

    let err = processor.lookup("US").unwrap_err();
    assert!(matches!(err, Error::RefreshFailed(_)));
    assert!(err.to_string().contains("non-200"));
    assert_eq!(calls(&processor), 1);
    assert!(processor.last_refreshed().is_none());
    assert_eq!(processor.country_count(), 0);

    // Still stale, so the next lookup retries
    *processor.fetcher().transport().status.lock() = 200;
    assert!(processor.lookup("US").unwrap().is_empty());
    assert_eq!(calls(&processor), 2);
    assert!(processor.last_refreshed().is_some());
}

#[test]
fn test_custom_feed_url() {
    let fetcher = FeedFetcher::with_url(
        CannedTransport::new(200, "ripencc|NL|ipv4|145.0.0.0|65536|19930901|allocated"),
        "http://mirror.example.com/delegated-ripencc-extended-latest",
    );
    let processor = Processor::with_fetcher(fetcher, Duration::from_secs(60));

    assert_eq!(processor.lookup("nl").unwrap(), vec!["145.0.0.0/16"]);
    assert_eq!(
        processor
            .fetcher()
            .transport()
            .last_url
            .lock()
            .as_deref(),
        Some("http://mirror.example.com/delegated-ripencc-extended-latest")
    );
}

#[test]
fn test_zero_ttl_always_refreshes() {
    let transport = CannedTransport::new(200, "ripencc|SE|ipv4|5.0.0.0|1024|20220101|allocated");
    let processor = Processor::new(transport, Duration::ZERO);

    for _ in 0..3 {
        assert_eq!(processor.lookup("se").unwrap(), vec!["5.0.0.0/22"]);
    }
    assert_eq!(calls(&processor), 3);
}
