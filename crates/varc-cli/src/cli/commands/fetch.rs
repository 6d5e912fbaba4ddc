//! `varc fetch` – download a completed job's output with verification.

use anyhow::{Context, Result};
use std::path::Path;
use varc_core::api::VaultClient;
use varc_core::config::VarcConfig;
use varc_core::downloader::{self, DownloadOptions};
use varc_core::treehash;

/// Describe the job, download its output to `output`, and (when verifying)
/// check the finished file against the job's whole-archive tree hash.
pub fn run_fetch(
    client: &VaultClient,
    cfg: &VarcConfig,
    job_id: &str,
    output: &Path,
    chunk_size_mib: Option<u64>,
    no_verify: bool,
) -> Result<()> {
    let job = client.describe_job(job_id)?;
    if !job.completed {
        anyhow::bail!(
            "job {} is still {}; retry once the service reports it completed",
            job_id,
            job.status_code.as_deref().unwrap_or("in progress")
        );
    }

    let opts = DownloadOptions {
        chunk_size: chunk_size_mib
            .map(|mib| mib * 1024 * 1024)
            .unwrap_or(cfg.chunk_size_bytes),
        verify_hashes: cfg.verify_hashes && !no_verify,
        retry: cfg.retry_policy(),
    };

    downloader::download_to_file(&job, client, output, &opts)?;

    if opts.verify_hashes {
        if let Some(expected) = job.sha256_tree_hash.as_deref() {
            let actual = treehash::tree_hash_path(output)
                .with_context(|| format!("hashing {}", output.display()))?;
            if actual != expected {
                anyhow::bail!(
                    "whole-archive tree hash mismatch for {}: expected {}, computed {}",
                    output.display(),
                    expected,
                    actual
                );
            }
        }
    }

    println!(
        "{}  {} bytes  {}",
        job_id,
        job.archive_size(),
        output.display()
    );
    Ok(())
}
