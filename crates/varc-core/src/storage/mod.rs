//! Disk I/O and file lifecycle for downloaded archives.
//!
//! Preallocates temp files (fallocate on Linux when available, else set_len),
//! appends verified chunks sequentially, and finalizes with an atomic rename
//! from `.part` to the final name. A failed download leaves the `.part` file
//! holding the verified prefix for the caller to inspect or discard.

mod builder;
mod writer;

pub use builder::ArchiveWriterBuilder;
pub use writer::ArchiveWriter;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `backup.tar` → `backup.tar.part`).
pub fn temp_path(final_path: &std::path::Path) -> std::path::PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    std::path::PathBuf::from(o)
}
