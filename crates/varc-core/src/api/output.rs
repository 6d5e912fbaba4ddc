//! Ranged GET of a job's output: body bytes plus the range's tree hash header.

use std::str;
use std::time::Duration;

use crate::chunk::ByteRange;
use crate::fetch::ChunkResult;
use crate::retry::FetchError;

use super::TREE_HASH_HEADER;

/// GETs `url`, optionally with a `Range` header, and returns the body along
/// with the tree hash the service computed for that range.
/// Returns `FetchError` so callers can classify and retry with backoff.
pub(super) fn get_job_output(
    url: &str,
    range: Option<ByteRange>,
) -> Result<ChunkResult, FetchError> {
    let mut body: Vec<u8> = Vec::new();
    let mut tree_hash: Option<String> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(FetchError::Curl)?;
    easy.follow_location(true).map_err(FetchError::Curl)?;
    easy.connect_timeout(Duration::from_secs(30))
        .map_err(FetchError::Curl)?;
    // Prefer low-speed timeout: abort if throughput drops below 1 KiB/s for 60s.
    // Keeps large chunks on slow links from being killed by a hard wall-clock timeout.
    easy.low_speed_limit(1024).map_err(FetchError::Curl)?;
    easy.low_speed_time(Duration::from_secs(60))
        .map_err(FetchError::Curl)?;
    // Safety net: hard timeout after 1 hour so a completely stuck transfer eventually fails.
    easy.timeout(Duration::from_secs(3600))
        .map_err(FetchError::Curl)?;

    if let Some(r) = range {
        let range_str = format!("{}-{}", r.start, r.end);
        easy.range(&range_str).map_err(FetchError::Curl)?;
    }

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|line| {
                if let Some(value) = parse_header(line, TREE_HASH_HEADER) {
                    tree_hash = Some(value);
                }
                true
            })
            .map_err(FetchError::Curl)?;
        transfer
            .write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(FetchError::Curl)?;
        transfer.perform().map_err(FetchError::Curl)?;
    }

    let code = easy.response_code().map_err(FetchError::Curl)? as u32;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }

    if let Some(r) = range {
        let received = body.len() as u64;
        if received != r.len() {
            return Err(FetchError::LengthMismatch {
                expected: r.len(),
                received,
            });
        }
    }

    Ok(ChunkResult { bytes: body, tree_hash })
}

/// Extracts the value of `name` from a raw response header line, if it matches.
fn parse_header(line: &[u8], name: &str) -> Option<String> {
    let line = str::from_utf8(line).ok()?;
    let (header, value) = line.split_once(':')?;
    if header.trim().eq_ignore_ascii_case(name) {
        Some(value.trim().to_string())
    } else {
        None
    }
}
