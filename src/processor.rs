//! Country lookups served from a refresh-on-demand snapshot cache.
//!
//! Reads load the current [`CacheSnapshot`] lock-free through an `ArcSwap`.
//! When the snapshot is stale the caller takes the refresh gate, re-checks
//! freshness, and only then downloads and parses the feed. Callers that
//! queued behind a successful refresh find a fresh snapshot and return
//! without touching the network. A failed refresh leaves the old snapshot in
//! place, so the next caller through the gate retries.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::feed;
use crate::fetch::{FeedFetcher, HttpTransport, Transport};
use crate::snapshot::CacheSnapshot;

/// Default cache TTL (1 hour).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Resolve a country code to its IPv4 CIDR blocks.
pub trait CountryLookup: Send + Sync {
    /// Return the CIDR blocks allocated to `country_code` (case-insensitive).
    ///
    /// An unknown country yields an empty list, not an error.
    fn lookup(&self, country_code: &str) -> Result<Vec<String>>;
}

/// Owns the snapshot cache and the feed fetcher.
///
/// # Example
///
/// ```ignore
/// use ip_whitelist::{HttpTransport, Processor};
/// use std::time::Duration;
///
/// let processor = Processor::new(HttpTransport::new()?, Duration::from_secs(3600));
///
/// // First call downloads the feed, later calls within the TTL are cached
/// for cidr in processor.lookup("de")? {
///     println!("{}", cidr);
/// }
/// ```
pub struct Processor<T = HttpTransport> {
    fetcher: FeedFetcher<T>,
    snapshot: ArcSwap<CacheSnapshot>,
    refresh_gate: Mutex<()>,
    ttl: Duration,
}

impl<T: Transport> Processor<T> {
    /// Create a processor for the default feed URL.
    pub fn new(transport: T, ttl: Duration) -> Self {
        Self::with_fetcher(FeedFetcher::new(transport), ttl)
    }

    /// Create a processor around a configured fetcher.
    pub fn with_fetcher(fetcher: FeedFetcher<T>, ttl: Duration) -> Self {
        Self {
            fetcher,
            snapshot: ArcSwap::from_pointee(CacheSnapshot::empty()),
            refresh_gate: Mutex::new(()),
            ttl,
        }
    }

    /// Get the cache TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get the feed fetcher.
    pub fn fetcher(&self) -> &FeedFetcher<T> {
        &self.fetcher
    }

    /// Get the current snapshot.
    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        self.snapshot.load_full()
    }

    /// Instant of the last successful refresh.
    pub fn last_refreshed(&self) -> Option<Instant> {
        self.snapshot.load().as_of()
    }

    /// Number of countries in the current snapshot.
    pub fn country_count(&self) -> usize {
        self.snapshot.load().country_count()
    }

    /// Return the CIDR blocks for a country, refreshing a stale cache first.
    pub fn lookup(&self, country_code: &str) -> Result<Vec<String>> {
        let country = country_code.to_uppercase();

        {
            let snapshot = self.snapshot.load();
            if snapshot.is_fresh(self.ttl) {
                return Ok(snapshot.cidrs(&country));
            }
        }

        let snapshot = self
            .refresh()
            .map_err(|e| Error::RefreshFailed(Box::new(e)))?;
        Ok(snapshot.cidrs(&country))
    }

    /// Download and parse the feed unless the snapshot is already fresh.
    ///
    /// At most one refresh runs at a time. Returns the snapshot that is
    /// current once the gate is released.
    pub fn refresh(&self) -> Result<Arc<CacheSnapshot>> {
        let _gate = self.refresh_gate.lock();

        let current = self.snapshot.load_full();
        if current.is_fresh(self.ttl) {
            log::debug!("Snapshot refreshed while waiting, skipping download");
            return Ok(current);
        }

        log::info!("Downloading IP data from {}", self.fetcher.url());

        let body = self.fetcher.fetch()?;
        let index = feed::parse(body)?;

        let mut as_of = Instant::now();
        if let Some(previous) = current.as_of() {
            as_of = as_of.max(previous + Duration::from_nanos(1));
        }

        let next = Arc::new(CacheSnapshot::from_index(index, as_of));
        self.snapshot.store(Arc::clone(&next));

        log::info!(
            "IP data processed. Found data for {} countries",
            next.country_count()
        );

        Ok(next)
    }
}

impl<T: Transport> CountryLookup for Processor<T> {
    fn lookup(&self, country_code: &str) -> Result<Vec<String>> {
        Processor::lookup(self, country_code)
    }
}
