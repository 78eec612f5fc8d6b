//! IP Whitelist - country-based IPv4 CIDR lists from the RIPE NCC feed.
//!
//! This crate resolves a 2-letter country code to the IPv4 blocks the RIPE
//! NCC has delegated to that country. The delegated statistics feed is
//! downloaded on demand, parsed into per-country CIDR lists and served from
//! an in-memory snapshot until the configured TTL elapses.
//!
//! # Features
//!
//! - **Refresh on demand**: no background task, the first stale lookup
//!   downloads the feed
//! - **One refresh at a time**: concurrent stale lookups wait for a single
//!   in-flight download instead of issuing their own
//! - **Atomic snapshots**: readers never see a half-built mapping
//! - **Failure tolerant**: a failed refresh keeps the previous data and the
//!   next lookup retries
//! - **Injectable transport**: swap the HTTP client for canned responses
//! - **Compressed mirrors**: gzip feed bodies are detected and decompressed
//!
//! # Quick Start
//!
//! ```ignore
//! use ip_whitelist::{HttpTransport, Processor};
//! use std::time::Duration;
//!
//! let processor = Processor::new(HttpTransport::new()?, Duration::from_secs(3600));
//!
//! let cidrs = processor.lookup("nl")?;
//! for cidr in &cidrs {
//!     println!("{}", cidr);
//! }
//! ```
//!
//! # Prefix Lengths
//!
//! The feed lists blocks as a start address and an address count. The
//! prefix length is derived as `32 - log2(count)`, truncated. Counts that
//! are not a power of two produce a prefix covering fewer addresses than
//! the allocation; see [`feed::prefix_length`].

mod cidr;
mod config;
mod error;
mod snapshot;

pub mod feed;
pub mod fetch;
pub mod processor;
pub mod server;

// Re-export core types
pub use error::{CidrError, Error, Result, TransportError};
pub use snapshot::CacheSnapshot;

// Re-export configuration
pub use config::Config;

// Re-export the lookup API
pub use processor::{CountryLookup, Processor, DEFAULT_CACHE_TTL};

// Re-export feed download types
pub use fetch::{FeedFetcher, FeedRequest, FeedResponse, HttpTransport, Transport};

// Re-export parser types
pub use feed::AllocationRecord;

// Re-export validation
pub use cidr::validate_cidr;
