use recap_common::{RecapError, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::file::FileKind;

/// An uploaded file held in a request-scoped temp file
///
/// The file on disk is removed when this value is dropped, whichever way the
/// request ends. The format is only checked when the document is loaded.
#[derive(Debug)]
pub struct UploadedFile {
    filename: String,
    temp: NamedTempFile,
}

impl UploadedFile {
    /// Create an empty temp file for an upload named `filename` inside `dir`
    pub fn create(dir: &Path, filename: &str) -> Result<Self> {
        let temp = tempfile::Builder::new()
            .prefix("recap-")
            .suffix(".upload")
            .tempfile_in(dir)
            .map_err(|e| {
                RecapError::internal(format!(
                    "Failed to create temp file in {}: {}",
                    dir.display(),
                    e
                ))
            })?;

        debug!("Created upload temp file: {}", temp.path().display());

        Ok(Self {
            filename: filename.to_string(),
            temp,
        })
    }

    /// Create a temp file and fill it with `bytes`
    pub fn from_bytes(dir: &Path, filename: &str, bytes: &[u8]) -> Result<Self> {
        let mut upload = Self::create(dir, filename)?;
        upload.write_chunk(bytes)?;
        Ok(upload)
    }

    /// Append bytes to the temp file
    pub fn write_chunk(&mut self, bytes: &[u8]) -> Result<()> {
        self.temp.as_file_mut().write_all(bytes)?;
        Ok(())
    }

    /// Flush buffered bytes to disk
    pub fn finish(&mut self) -> Result<()> {
        self.temp.as_file_mut().flush()?;
        Ok(())
    }

    /// Original filename supplied by the client
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Format implied by the original filename
    pub fn kind(&self) -> Result<FileKind> {
        FileKind::from_filename(&self.filename)
    }

    /// Current on-disk location
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Size on disk in bytes
    pub fn size(&self) -> Result<u64> {
        Ok(self.temp.as_file().metadata()?.len())
    }
}

impl Drop for UploadedFile {
    fn drop(&mut self) {
        debug!("Releasing upload temp file: {}", self.temp.path().display());
    }
}
