//! Immutable country → CIDR snapshots.

use std::time::{Duration, Instant};

use ahash::AHashMap;

use crate::feed::{AllocationRecord, FeedIndex};

/// One fully built country → CIDR mapping plus the instant it was built.
///
/// Snapshots are never mutated. A refresh builds a new one and swaps it in.
#[derive(Debug, Clone, Default)]
pub struct CacheSnapshot {
    by_country: AHashMap<String, Vec<String>>,
    as_of: Option<Instant>,
}

impl CacheSnapshot {
    /// Create the initial snapshot: no data, never fresh.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from parsed feed records, stamped `as_of`.
    pub fn from_index(index: FeedIndex, as_of: Instant) -> Self {
        let by_country = index
            .into_iter()
            .map(|(country, records)| {
                let cidrs = records.iter().map(AllocationRecord::cidr).collect();
                (country, cidrs)
            })
            .collect();

        Self {
            by_country,
            as_of: Some(as_of),
        }
    }

    /// Instant the snapshot was built, `None` for the initial snapshot.
    pub fn as_of(&self) -> Option<Instant> {
        self.as_of
    }

    /// Check whether the snapshot is younger than `ttl`.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        match self.as_of {
            None => false,
            Some(as_of) => as_of.elapsed() < ttl,
        }
    }

    /// CIDR blocks for an upper-case country code, in feed order.
    pub fn get(&self, country_code: &str) -> Option<&[String]> {
        self.by_country.get(country_code).map(Vec::as_slice)
    }

    /// CIDR blocks for an upper-case country code, empty when unknown.
    pub fn cidrs(&self, country_code: &str) -> Vec<String> {
        self.get(country_code).map(<[String]>::to_vec).unwrap_or_default()
    }

    /// Number of countries with at least one block.
    pub fn country_count(&self) -> usize {
        self.by_country.len()
    }
}
