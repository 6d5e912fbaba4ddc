//! Byte-range fetch seam between the downloader and the transport.

use crate::chunk::ByteRange;
use crate::retry::FetchError;

/// Outcome of fetching one byte range of a job's output.
#[derive(Debug, Clone)]
pub struct ChunkResult {
    /// Raw bytes for the range. Length must equal the range length.
    pub bytes: Vec<u8>,
    /// Tree hash the service computed over this exact range, lowercase hex.
    /// Absent when the service did not supply one (e.g. a range that is not
    /// aligned to whole sub-chunks).
    pub tree_hash: Option<String>,
}

/// Fetches byte ranges of a retrieval job's output.
///
/// `None` for the range requests the entire output. Implementations must be
/// idempotent and side-effect free per call: the downloader retries a failed
/// range by calling again with identical arguments.
pub trait RangeFetch {
    fn fetch_range(
        &self,
        job_id: &str,
        range: Option<ByteRange>,
    ) -> Result<ChunkResult, FetchError>;
}
