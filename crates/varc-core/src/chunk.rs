//! Byte-range partitioning for chunked archive retrieval.
//!
//! Splits a known archive size into fixed-size ranges matching the byte
//! boundaries the vault service uses when computing per-range tree hashes.

use std::fmt;

/// A single chunk: byte range [start, end], inclusive on both ends.
///
/// This mirrors the HTTP `Range` header convention and, more importantly, the
/// boundaries the service hashes: a chunk's tree hash only matches when the
/// local range is byte-identical to the one the server served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte offset (inclusive).
    pub start: u64,
    /// Last byte offset (inclusive).
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by this range.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start) + 1
    }

    /// Ranges are never empty; kept for clippy's `len` convention.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// HTTP `Range` header value: `bytes=start-end`.
    pub fn header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Builds the chunk plan for an archive of `archive_size` bytes.
///
/// Produces `ceil(archive_size / chunk_size)` contiguous, non-overlapping
/// ranges covering `[0, archive_size)` exactly once, in ascending order.
/// Every range is exactly `chunk_size` bytes except the last, whose end is
/// clamped to `archive_size - 1`. Returns an empty plan if `archive_size`
/// or `chunk_size` is 0.
pub fn plan_chunks(archive_size: u64, chunk_size: u64) -> Vec<ByteRange> {
    if archive_size == 0 || chunk_size == 0 {
        return Vec::new();
    }

    let num_chunks = archive_size.div_ceil(chunk_size);
    let mut out = Vec::with_capacity(num_chunks as usize);
    for i in 0..num_chunks {
        let start = i * chunk_size;
        let end = ((i + 1) * chunk_size).min(archive_size) - 1;
        out.push(ByteRange { start, end });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_chunks_exact_multiple() {
        let chunks = plan_chunks(1000, 250);
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0], ByteRange { start: 0, end: 249 });
        assert_eq!(chunks[1], ByteRange { start: 250, end: 499 });
        assert_eq!(chunks[2], ByteRange { start: 500, end: 749 });
        assert_eq!(chunks[3], ByteRange { start: 750, end: 999 });
        assert!(chunks.iter().all(|c| c.len() == 250));
    }

    #[test]
    fn plan_chunks_short_tail() {
        // 10 MiB at 4 MiB chunks: 4 MiB, 4 MiB, 2 MiB.
        const MIB: u64 = 1024 * 1024;
        let chunks = plan_chunks(10 * MIB, 4 * MIB);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 4 * MIB);
        assert_eq!(chunks[1].len(), 4 * MIB);
        assert_eq!(chunks[2].len(), 2 * MIB);
        assert_eq!(chunks[2].end, 10 * MIB - 1);
    }

    #[test]
    fn plan_chunks_contiguous_cover() {
        let chunks = plan_chunks(12345, 512);
        assert_eq!(chunks.len(), 12345u64.div_ceil(512) as usize);
        assert_eq!(chunks[0].start, 0);
        for pair in chunks.windows(2) {
            assert_eq!(pair[1].start, pair[0].end + 1);
        }
        assert_eq!(chunks.last().unwrap().end, 12344);
        let total: u64 = chunks.iter().map(|c| c.len()).sum();
        assert_eq!(total, 12345);
    }

    #[test]
    fn plan_chunks_single() {
        let chunks = plan_chunks(100, 4096);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], ByteRange { start: 0, end: 99 });
    }

    #[test]
    fn plan_chunks_empty() {
        assert!(plan_chunks(0, 4096).is_empty());
        assert!(plan_chunks(100, 0).is_empty());
    }

    #[test]
    fn byte_range_header_value() {
        let r = ByteRange { start: 0, end: 4194303 };
        assert_eq!(r.header_value(), "bytes=0-4194303");
        assert_eq!(r.len(), 4 * 1024 * 1024);
        let single = ByteRange { start: 42, end: 42 };
        assert_eq!(single.header_value(), "bytes=42-42");
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn byte_range_display() {
        let r = ByteRange { start: 10, end: 19 };
        assert_eq!(format!("{}", r), "10-19");
    }
}
