//! Integration tests: local vault server, chunked verified download over HTTP.
//!
//! Starts a minimal vault-service stand-in, describes the job through the
//! real client, downloads its output chunk by chunk, and asserts the
//! assembled file matches the served archive bit for bit.

mod common;

use std::time::Duration;

use common::vault_server::{self, VaultServerOptions};
use tempfile::tempdir;
use varc_core::api::VaultClient;
use varc_core::downloader::{self, DownloadError, DownloadOptions};
use varc_core::retry::RetryPolicy;
use varc_core::storage;
use varc_core::treehash;

const MIB: usize = 1024 * 1024;

fn test_archive(len: usize) -> Vec<u8> {
    (0u8..100).cycle().take(len).collect()
}

fn fast_opts(chunk_size: u64) -> DownloadOptions {
    DownloadOptions {
        chunk_size,
        retry: RetryPolicy {
            base_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            ..RetryPolicy::default()
        },
        ..DownloadOptions::default()
    }
}

#[test]
fn describe_then_download_reconstructs_archive() {
    let archive = test_archive(3 * MIB + 789);
    let url = vault_server::start(archive.clone(), VaultServerOptions::default());
    let client = VaultClient::new(&url, "-", "testvault");

    let job = client.describe_job("job-1").expect("describe");
    assert!(job.completed);
    assert_eq!(job.archive_size(), archive.len() as u64);
    assert_eq!(
        job.sha256_tree_hash.as_deref(),
        Some(treehash::tree_hash_hex(&archive).as_str())
    );

    let dir = tempdir().unwrap();
    let out = dir.path().join("restored.bin");
    downloader::download_to_file(&job, &client, &out, &fast_opts(MIB as u64)).expect("download");

    let content = std::fs::read(&out).unwrap();
    assert_eq!(content.len(), archive.len(), "file size must match");
    assert_eq!(content, archive, "file content must match");
    assert!(!storage::temp_path(&out).exists(), "temp file must be renamed away");
}

#[test]
fn transient_connection_drops_are_retried_per_chunk() {
    let archive = test_archive(2 * MIB);
    let url = vault_server::start(
        archive.clone(),
        VaultServerOptions {
            drop_first_outputs: 2,
            ..VaultServerOptions::default()
        },
    );
    let client = VaultClient::new(&url, "-", "testvault");
    let job = client.describe_job("job-1").expect("describe");

    let dir = tempdir().unwrap();
    let out = dir.path().join("restored.bin");
    downloader::download_to_file(&job, &client, &out, &fast_opts(MIB as u64))
        .expect("download should survive two dropped connections");

    assert_eq!(std::fs::read(&out).unwrap(), archive);
}

#[test]
fn corrupted_chunk_hash_aborts_and_keeps_prefix() {
    let archive = test_archive(3 * MIB);
    let url = vault_server::start(
        archive.clone(),
        VaultServerOptions {
            corrupt_chunk_start: Some(MIB as u64),
            ..VaultServerOptions::default()
        },
    );
    let client = VaultClient::new(&url, "-", "testvault");
    let job = client.describe_job("job-1").expect("describe");

    let dir = tempdir().unwrap();
    let out = dir.path().join("restored.bin");
    let err = downloader::download_to_file(&job, &client, &out, &fast_opts(MIB as u64))
        .expect_err("corrupted chunk must abort");
    let download_err = err.downcast_ref::<DownloadError>().expect("typed error");
    match download_err {
        DownloadError::TreeHashMismatch { range, .. } => {
            assert_eq!(range.start, MIB as u64);
        }
        other => panic!("expected TreeHashMismatch, got {:?}", other),
    }

    assert!(!out.exists());
    let part = storage::temp_path(&out);
    assert!(part.exists(), "partial file must remain for inspection");
    assert_eq!(
        std::fs::read(&part).unwrap(),
        &archive[..MIB],
        "only the verified first chunk may be on disk"
    );
}

#[test]
fn incomplete_job_is_refused() {
    let archive = test_archive(MIB);
    let url = vault_server::start(
        archive,
        VaultServerOptions {
            job_incomplete: true,
            ..VaultServerOptions::default()
        },
    );
    let client = VaultClient::new(&url, "-", "testvault");

    let job = client.describe_job("job-1").expect("describe");
    assert!(!job.completed);
    assert_eq!(job.status_code.as_deref(), Some("InProgress"));

    let dir = tempdir().unwrap();
    let out = dir.path().join("restored.bin");
    let err = downloader::download_to_file(&job, &client, &out, &fast_opts(MIB as u64))
        .expect_err("incomplete job must not download");
    assert!(matches!(
        err.downcast_ref::<DownloadError>(),
        Some(DownloadError::NotReady { .. })
    ));
}

#[test]
fn whole_output_fetch_returns_full_archive_and_hash() {
    use varc_core::fetch::RangeFetch;

    let archive = test_archive(MIB + 4096);
    let url = vault_server::start(archive.clone(), VaultServerOptions::default());
    let client = VaultClient::new(&url, "-", "testvault");

    let chunk = client.fetch_range("job-1", None).expect("whole fetch");
    assert_eq!(chunk.bytes, archive);
    assert_eq!(
        chunk.tree_hash.as_deref(),
        Some(treehash::tree_hash_hex(&archive).as_str())
    );
}
