//! Chunked, integrity-verified archive download engine.
//!
//! Partitions a completed retrieval job's output into fixed-size byte ranges,
//! fetches each range through a [`RangeFetch`] collaborator with bounded
//! per-chunk retry, verifies the range's tree hash against the digest the
//! service returned for it, and appends verified bytes to the sink strictly
//! in range order. A chunk that fails verification never reaches the sink,
//! and nothing is written after the first failure.

use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use thiserror::Error;

use crate::chunk::{plan_chunks, ByteRange};
use crate::fetch::RangeFetch;
use crate::job::Job;
use crate::retry::{run_with_retry, FetchError, RetryFailure, RetryPolicy};
use crate::storage::{self, ArchiveWriterBuilder};
use crate::treehash;


/// Default chunk size: 4 MiB. Whole multiples of the 1 MiB hash sub-chunk,
/// so the service returns a tree hash for every ranged response.
pub const DEFAULT_CHUNK_SIZE: u64 = 4 * 1024 * 1024;

/// Knobs for one download call.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Byte-range size per fetch. Should stay a multiple of 1 MiB.
    pub chunk_size: u64,
    /// Verify each chunk's tree hash before committing it to the sink.
    pub verify_hashes: bool,
    /// Per-chunk retry policy for transient fetch failures.
    pub retry: RetryPolicy,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            verify_hashes: true,
            retry: RetryPolicy::default(),
        }
    }
}

/// Terminal failure of a download. Every variant aborts the download; the
/// sink is left holding exactly the verified chunks that preceded the failure.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("job has no id")]
    MissingJobId,
    #[error("job {id} has not finished preparing its output")]
    NotReady { id: String },
    #[error("tree hash mismatch for byte range {range}: expected {expected}, computed {actual}")]
    TreeHashMismatch {
        range: ByteRange,
        expected: String,
        actual: String,
    },
    #[error("no tree hash returned for byte range {range} but verification is enabled")]
    MissingTreeHash { range: ByteRange },
    #[error("byte range {range} still failing after {attempts} attempts")]
    RetryExhausted {
        range: ByteRange,
        attempts: u32,
        #[source]
        source: FetchError,
    },
    #[error("fetch of byte range {range} failed")]
    Fetch {
        range: ByteRange,
        #[source]
        source: FetchError,
    },
    #[error("download aborted before byte range {range}")]
    Aborted { range: ByteRange },
    #[error("sink write failed")]
    Sink(#[from] std::io::Error),
}

/// Downloads the job's entire output into `sink`, chunk by chunk.
///
/// Chunks are fetched and committed strictly in ascending range order; the
/// sink never sees out-of-order or unverified bytes. A zero-byte archive
/// performs no fetches and succeeds with an empty sink. `abort` is checked
/// before each fetch; once set, no further fetches are issued and the sink
/// keeps the chunks committed so far.
pub fn download_job<W, F>(
    job: &Job,
    fetcher: &F,
    sink: &mut W,
    opts: &DownloadOptions,
    abort: Option<&AtomicBool>,
) -> Result<(), DownloadError>
where
    W: Write + ?Sized,
    F: RangeFetch + ?Sized,
{
    let job_id = job.id.as_deref().ok_or(DownloadError::MissingJobId)?;
    if !job.completed {
        return Err(DownloadError::NotReady {
            id: job_id.to_string(),
        });
    }

    let archive_size = job.archive_size();
    let chunks = plan_chunks(archive_size, opts.chunk_size);
    tracing::debug!(
        job = job_id,
        archive_size,
        chunk_size = opts.chunk_size,
        chunks = chunks.len(),
        "starting chunked download"
    );

    for range in chunks {
        if let Some(flag) = abort {
            if flag.load(Ordering::Relaxed) {
                return Err(DownloadError::Aborted { range });
            }
        }

        let chunk = run_with_retry(&opts.retry, || fetcher.fetch_range(job_id, Some(range)))
            .map_err(|failure| match failure {
                RetryFailure::Exhausted { attempts, last } => DownloadError::RetryExhausted {
                    range,
                    attempts,
                    source: last,
                },
                RetryFailure::Fatal(e) => DownloadError::Fetch { range, source: e },
            })?;

        let received = chunk.bytes.len() as u64;
        if received != range.len() {
            return Err(DownloadError::Fetch {
                range,
                source: FetchError::LengthMismatch {
                    expected: range.len(),
                    received,
                },
            });
        }

        if opts.verify_hashes {
            let expected = chunk
                .tree_hash
                .as_deref()
                .ok_or(DownloadError::MissingTreeHash { range })?;
            let actual = treehash::tree_hash_hex(&chunk.bytes);
            if expected != actual {
                return Err(DownloadError::TreeHashMismatch {
                    range,
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        sink.write_all(&chunk.bytes)?;
        tracing::trace!(%range, len = chunk.bytes.len(), "chunk verified and committed");
    }

    Ok(())
}

/// Downloads the job's output into `final_path` via a `.part` temp file:
/// create, preallocate to the archive size, stream verified chunks, sync,
/// atomic rename. On failure the `.part` file is trimmed to the verified
/// prefix and left in place for the caller to discard.
pub fn download_to_file<F>(
    job: &Job,
    fetcher: &F,
    final_path: &Path,
    opts: &DownloadOptions,
) -> anyhow::Result<()>
where
    F: RangeFetch + ?Sized,
{
    let tp = storage::temp_path(final_path);
    let mut builder = ArchiveWriterBuilder::create(&tp)?;
    builder.preallocate(job.archive_size())?;
    let mut writer = builder.build();

    match download_job(job, fetcher, &mut writer, opts, None) {
        Ok(()) => {
            writer.sync()?;
            writer.finalize(final_path)?;
            tracing::info!(
                path = %final_path.display(),
                bytes = job.archive_size(),
                "archive download complete"
            );
            Ok(())
        }
        Err(e) => {
            if writer.truncate_to_written().is_err() {
                tracing::warn!(
                    path = %writer.temp_path().display(),
                    "could not trim partial download"
                );
            }
            Err(e).with_context(|| format!("download to {}", final_path.display()))
        }
    }
}
