//! `varc treehash` – compute the tree hash of a local file.

use anyhow::Result;
use std::path::Path;
use varc_core::treehash;

/// Compute and print the SHA-256 tree hash of the given file.
pub fn run_treehash(path: &Path) -> Result<()> {
    let digest = treehash::tree_hash_path(path)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
