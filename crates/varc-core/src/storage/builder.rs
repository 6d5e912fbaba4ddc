//! Builder for creating and preallocating temp archive files.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;

use super::writer::ArchiveWriter;
#[cfg(unix)]
use std::os::unix::io::AsRawFd;

/// Builder for a new temp archive file. Call `preallocate` then `build` to get
/// an [`ArchiveWriter`] that appends verified chunks sequentially.
pub struct ArchiveWriterBuilder {
    file: File,
    temp_path: std::path::PathBuf,
}

impl ArchiveWriterBuilder {
    /// Create a new temp file at `temp_path` (e.g. `destination.part`).
    /// Overwrites if the path already exists.
    pub fn create(temp_path: &Path) -> Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)
            .with_context(|| format!("failed to create temp file: {}", temp_path.display()))?;
        Ok(ArchiveWriterBuilder {
            file,
            temp_path: temp_path.to_path_buf(),
        })
    }

    /// Preallocate `size` bytes. On Unix tries `posix_fallocate` for real block
    /// allocation; falls back to `set_len` on failure or non-Unix.
    pub fn preallocate(&mut self, size: u64) -> Result<()> {
        #[cfg(unix)]
        {
            let fd = self.file.as_raw_fd();
            let r = unsafe { libc::posix_fallocate(fd, 0, size as libc::off_t) };
            if r == 0 {
                return Ok(());
            }
            tracing::debug!(errno = r, "posix_fallocate failed, falling back to set_len");
        }
        self.file
            .set_len(size)
            .context("failed to preallocate file")?;
        Ok(())
    }

    /// Finish building and return the sequential writer.
    pub fn build(self) -> ArchiveWriter {
        ArchiveWriter::from_file_and_path(self.file, self.temp_path)
    }
}
