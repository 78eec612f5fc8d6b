//! RIPE NCC delegated statistics feed parser.
//!
//! The feed is pipe-delimited text, one record per line:
//!
//! ```text
//! registry|cc|type|start|value|date|status[|extensions...]
//! ```
//!
//! Only `ripencc` IPv4 allocations are kept. Everything else (comments, the
//! version header, summary lines, IPv6 and ASN records, other registries)
//! is dropped silently.

use std::io::{self, BufRead, BufReader, Read};

use ahash::AHashMap;
use flate2::read::GzDecoder;

use crate::error::{Error, Result};

/// Registry tag accepted by the parser.
pub const REGISTRY: &str = "ripencc";

/// Address family tag accepted by the parser.
pub const FAMILY_IPV4: &str = "ipv4";

/// Minimum number of `|`-separated fields in a usable record.
const MIN_FIELDS: usize = 6;

/// Allocation records grouped by upper-case country code, in feed order.
pub type FeedIndex = AHashMap<String, Vec<AllocationRecord>>;

/// A single IPv4 allocation taken from the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationRecord {
    /// Upper-case 2-letter country code
    pub country_code: String,
    /// First address of the block, verbatim from the feed
    pub start_address: String,
    /// Number of addresses in the block
    pub allocation_count: u64,
    /// Derived prefix length, see [`prefix_length`]
    pub prefix_length: u8,
}

impl AllocationRecord {
    /// Render the record as `"<start>/<prefix>"`.
    pub fn cidr(&self) -> String {
        format!("{}/{}", self.start_address, self.prefix_length)
    }
}

/// Derive a prefix length from an allocation count.
///
/// Computed as `32 - log2(count)` with the logarithm truncated toward zero.
/// Exact for powers of two. Any other count yields a block smaller than the
/// allocation (`3` gives `/31`, covering two addresses).
///
/// Returns `None` for `0` and for counts larger than the IPv4 space.
pub fn prefix_length(count: u64) -> Option<u8> {
    if count == 0 {
        return None;
    }
    let bits = (count as f64).log2() as u32;
    if bits > 32 {
        return None;
    }
    Some((32 - bits) as u8)
}

/// Parse a single feed line.
///
/// Returns `None` for comments, blank lines, malformed lines and records
/// that are not RIPE NCC IPv4 allocations.
pub fn parse_line(line: &str) -> Option<AllocationRecord> {
    if line.starts_with('#') || line.trim().is_empty() {
        return None;
    }

    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }

    if fields[0] != REGISTRY || fields[2] != FAMILY_IPV4 {
        return None;
    }

    let count = match fields[4].parse::<u64>() {
        Ok(count) => count,
        Err(_) => {
            log::debug!("Dropping line with malformed count: {}", line);
            return None;
        }
    };

    let prefix = match prefix_length(count) {
        Some(prefix) => prefix,
        None => {
            log::debug!("Dropping line with out-of-range count: {}", line);
            return None;
        }
    };

    Some(AllocationRecord {
        country_code: fields[1].to_uppercase(),
        start_address: fields[3].to_string(),
        allocation_count: count,
        prefix_length: prefix,
    })
}

/// Parse a feed body into per-country allocation records.
///
/// Gzip-compressed bodies are detected by their magic bytes and decompressed
/// on the fly. A read failure anywhere in the stream aborts the parse with
/// [`Error::ReadError`]; no partial index is returned.
pub fn parse<R: Read>(mut reader: R) -> Result<FeedIndex> {
    let mut magic = [0u8; 2];
    let len = read_prefix(&mut reader, &mut magic).map_err(Error::ReadError)?;
    let stream = (&magic[..len]).chain(reader);

    if is_gzip(&magic[..len]) {
        parse_lines(BufReader::new(GzDecoder::new(stream)))
    } else {
        parse_lines(BufReader::new(stream))
    }
}

/// Fill `buf` from `reader`, stopping early only at EOF.
fn read_prefix<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn parse_lines<R: BufRead>(reader: R) -> Result<FeedIndex> {
    let mut index = FeedIndex::new();

    for line in reader.split(b'\n') {
        let bytes = line.map_err(Error::ReadError)?;
        let text = String::from_utf8_lossy(&bytes);
        let line = text.strip_suffix('\r').unwrap_or(&*text);

        if let Some(record) = parse_line(line) {
            index
                .entry(record.country_code.clone())
                .or_default()
                .push(record);
        }
    }

    Ok(index)
}

/// Check if data starts with the gzip magic bytes.
fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}
