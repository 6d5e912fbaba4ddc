//! Sequential append writer for temp archive files.

use anyhow::{Context, Result};
use std::fs::File;
use std::io;
use std::path::Path;

/// Writer for a temp archive file. Chunks are appended strictly in order via
/// the [`io::Write`] impl; the writer tracks how many bytes have been
/// committed so a preallocated tail can be trimmed.
pub struct ArchiveWriter {
    file: File,
    temp_path: std::path::PathBuf,
    bytes_written: u64,
}

impl ArchiveWriter {
    /// Create from an open file and path (used by ArchiveWriterBuilder).
    pub(crate) fn from_file_and_path(file: File, temp_path: std::path::PathBuf) -> Self {
        Self {
            file,
            temp_path,
            bytes_written: 0,
        }
    }

    /// Bytes appended so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Path to the current temp file.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Trim the file to the bytes actually appended, dropping any
    /// preallocated zero tail. Used when a download aborts partway so the
    /// `.part` file holds exactly the verified prefix.
    pub fn truncate_to_written(&self) -> Result<()> {
        self.file
            .set_len(self.bytes_written)
            .context("failed to trim temp file")?;
        Ok(())
    }

    /// Sync file data to disk. Call before `finalize` for durability.
    pub fn sync(&self) -> Result<()> {
        self.file.sync_all().context("storage sync failed")?;
        Ok(())
    }

    /// Trim the preallocated tail and atomically rename the temp file to the
    /// final path. Consumes the writer and closes the file. Fails if
    /// `final_path` is on a different filesystem.
    pub fn finalize(self, final_path: &Path) -> Result<()> {
        self.truncate_to_written()?;
        let temp_path = self.temp_path.clone();
        drop(self.file);

        std::fs::rename(&temp_path, final_path).with_context(|| {
            format!(
                "failed to rename {} to {}",
                temp_path.display(),
                final_path.display()
            )
        })?;
        Ok(())
    }
}

impl io::Write for ArchiveWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.file.write(buf)?;
        self.bytes_written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
