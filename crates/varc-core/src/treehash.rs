//! SHA-256 tree hash, matching the vault service's published algorithm.
//!
//! The service hashes each 1 MiB sub-chunk of a byte range, then combines the
//! leaf digests pairwise up a binary tree; an odd digest at any level is
//! carried up unchanged. Both sides must apply the same rule or verification
//! of downloaded ranges fails.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Sub-chunk size the service hashes at: 1 MiB.
pub const SUBCHUNK_SIZE: usize = 1024 * 1024;

/// SHA-256 digest of one sub-chunk.
pub type LeafHash = [u8; 32];

/// Hashes `data` into per-sub-chunk SHA-256 leaf digests, in order.
///
/// The last sub-chunk may be shorter than 1 MiB. Empty input yields a single
/// leaf: the digest of zero bytes.
pub fn chunk_hashes(data: &[u8]) -> Vec<LeafHash> {
    if data.is_empty() {
        return vec![Sha256::digest(b"").into()];
    }
    data.chunks(SUBCHUNK_SIZE)
        .map(|sub| Sha256::digest(sub).into())
        .collect()
}

/// Combines leaf digests pairwise, bottom-up, to the single root digest.
///
/// At each level adjacent digests are paired and hashed as
/// `sha256(left || right)`; an unpaired trailing digest moves up unchanged,
/// never re-hashed alone. An empty list hashes to the digest of zero bytes.
pub fn tree_hash(mut hashes: Vec<LeafHash>) -> LeafHash {
    if hashes.is_empty() {
        return Sha256::digest(b"").into();
    }
    while hashes.len() > 1 {
        let mut next: Vec<LeafHash> = Vec::with_capacity(hashes.len().div_ceil(2));
        for pair in hashes.chunks(2) {
            if let [left, right] = pair {
                let mut h = Sha256::new();
                h.update(left);
                h.update(right);
                next.push(h.finalize().into());
            } else {
                next.push(pair[0]);
            }
        }
        hashes = next;
    }
    hashes[0]
}

/// Tree hash of an in-memory buffer, as lowercase hex.
pub fn tree_hash_hex(data: &[u8]) -> String {
    hex::encode(tree_hash(chunk_hashes(data)))
}

/// Tree hash of a file, as lowercase hex.
/// Reads one 1 MiB sub-chunk at a time so memory stays bounded for large archives.
pub fn tree_hash_path(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut leaves: Vec<LeafHash> = Vec::new();
    let mut buf = vec![0u8; SUBCHUNK_SIZE];
    loop {
        let n = read_subchunk(&mut f, &mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        leaves.push(Sha256::digest(&buf[..n]).into());
    }
    if leaves.is_empty() {
        leaves.push(Sha256::digest(b"").into());
    }
    Ok(hex::encode(tree_hash(leaves)))
}

/// Fills `buf` as far as the reader allows. Plain `read` may return short
/// counts mid-file, which would shift sub-chunk boundaries and change the hash.
fn read_subchunk(f: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = f.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
