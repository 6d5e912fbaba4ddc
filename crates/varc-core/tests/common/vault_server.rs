//! Minimal HTTP/1.1 vault-service stand-in for integration tests.
//!
//! Serves one retrieval job: a describe document at
//! `/{account}/vaults/{vault}/jobs/{id}` and ranged output (with
//! `x-amz-sha256-tree-hash` headers) at `.../output`. Can drop the first N
//! output connections to simulate transient network failure, and can serve a
//! corrupted tree hash for one chunk.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;

use varc_core::treehash;

#[derive(Debug, Clone, Copy, Default)]
pub struct VaultServerOptions {
    /// Close the first N `/output` connections without responding.
    pub drop_first_outputs: u32,
    /// Serve a wrong tree hash for the range starting at this offset.
    pub corrupt_chunk_start: Option<u64>,
    /// Report the job as still being staged.
    pub job_incomplete: bool,
}

/// Starts a server in a background thread serving `archive` as the output of
/// job `job-1`. Returns the base URL (e.g. `http://127.0.0.1:12345`). The
/// server runs until the process exits.
pub fn start(archive: Vec<u8>, opts: VaultServerOptions) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let archive = Arc::new(archive);
    let drops_left = Arc::new(AtomicU32::new(opts.drop_first_outputs));
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let archive = Arc::clone(&archive);
            let drops_left = Arc::clone(&drops_left);
            thread::spawn(move || handle(stream, &archive, opts, &drops_left));
        }
    });
    format!("http://127.0.0.1:{}", port)
}

fn handle(
    mut stream: std::net::TcpStream,
    archive: &[u8],
    opts: VaultServerOptions,
    drops_left: &AtomicU32,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (path, range) = parse_request(request);

    if path.ends_with("/output") {
        // Simulated transient failure: close without a response.
        if drops_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_sub(1))
            .is_ok()
        {
            return;
        }
        serve_output(&mut stream, archive, range, opts.corrupt_chunk_start);
    } else {
        serve_describe(&mut stream, archive, opts.job_incomplete);
    }
}

fn serve_describe(stream: &mut std::net::TcpStream, archive: &[u8], incomplete: bool) {
    let body = format!(
        concat!(
            "{{\"Action\":\"ArchiveRetrieval\",",
            "\"ArchiveId\":\"archive-1\",",
            "\"ArchiveSizeInBytes\":{},",
            "\"Completed\":{},",
            "\"JobId\":\"job-1\",",
            "\"SHA256TreeHash\":\"{}\",",
            "\"StatusCode\":\"{}\",",
            "\"VaultARN\":\"arn:test:vaults/testvault\"}}"
        ),
        archive.len(),
        !incomplete,
        treehash::tree_hash_hex(archive),
        if incomplete { "InProgress" } else { "Succeeded" },
    );
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

fn serve_output(
    stream: &mut std::net::TcpStream,
    archive: &[u8],
    range: Option<(u64, u64)>,
    corrupt_chunk_start: Option<u64>,
) {
    let total = archive.len() as u64;
    let (start, end, status) = match range {
        Some((s, e)) => (s, e.min(total.saturating_sub(1)), "206 Partial Content"),
        None => (0, total.saturating_sub(1), "200 OK"),
    };
    if start >= total {
        let _ = stream.write_all(b"HTTP/1.1 416 Range Not Satisfiable\r\nConnection: close\r\n\r\n");
        return;
    }
    let slice = &archive[start as usize..=end as usize];
    let tree_hash = if corrupt_chunk_start == Some(start) {
        "0".repeat(64)
    } else {
        treehash::tree_hash_hex(slice)
    };
    let header = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nx-amz-sha256-tree-hash: {}\r\nContent-Range: bytes {}-{}/{}\r\nConnection: close\r\n\r\n",
        status,
        slice.len(),
        tree_hash,
        start,
        end,
        total
    );
    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(slice);
}

/// Returns (path, optional (start, end_inclusive) for `Range: bytes=X-Y`).
fn parse_request(request: &str) -> (&str, Option<(u64, u64)>) {
    let mut path = "";
    let mut range = None;
    for (i, line) in request.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if i == 0 {
            path = line.split_whitespace().nth(1).unwrap_or("");
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("range") {
                let value = value.trim();
                if let Some(spec) = value.strip_prefix("bytes=") {
                    if let Some((a, b)) = spec.split_once('-') {
                        let start = a.trim().parse::<u64>().unwrap_or(0);
                        let end = b.trim().parse::<u64>().unwrap_or(u64::MAX);
                        range = Some((start, end));
                    }
                }
            }
        }
    }
    (path, range)
}
