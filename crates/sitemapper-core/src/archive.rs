//! Packaging URL lists as zip archives.
//!
//! The archive holds a single text entry (by default `sitemap_urls.txt`) whose
//! content is the URLs joined with `\n`, in input order, with no trailing
//! newline. The input list is written as given; no deduplication happens here.

use crate::config::{ArchiveConfig, ArchiveStaging};
use crate::{Error, Result};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Builds single-entry zip archives from URL lists.
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    entry_name: String,
    staging: ArchiveStaging,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::from_config(&ArchiveConfig::default())
    }
}

impl ArchiveBuilder {
    /// Creates a builder from archive settings.
    #[must_use]
    pub fn from_config(config: &ArchiveConfig) -> Self {
        Self {
            entry_name: config.entry_name.clone(),
            staging: config.staging,
        }
    }

    /// Name of the text entry written into the archive.
    #[must_use]
    pub fn entry_name(&self) -> &str {
        &self.entry_name
    }

    /// Build a zip archive holding `urls`, one per line.
    ///
    /// Temporary staging (if any) is released before this returns, on success
    /// and on failure.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyInput`] if `urls` is empty
    /// - [`Error::ArchiveWriteFailed`] if the archive cannot be written
    pub fn build(&self, urls: &[String]) -> Result<Vec<u8>> {
        if urls.is_empty() {
            return Err(Error::EmptyInput);
        }

        let content = urls.join("\n");
        let bytes = match self.staging {
            ArchiveStaging::Memory => {
                let cursor = self.write_zip(Cursor::new(Vec::new()), &content)?;
                cursor.into_inner()
            },
            ArchiveStaging::TempFile => {
                // Anonymous file: the OS reclaims it when the handle drops.
                let file = tempfile::tempfile().map_err(archive_io)?;
                let mut file = self.write_zip(file, &content)?;
                file.seek(SeekFrom::Start(0)).map_err(archive_io)?;
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes).map_err(archive_io)?;
                bytes
            },
        };

        debug!(
            urls = urls.len(),
            archive_bytes = bytes.len(),
            staging = ?self.staging,
            "Built URL archive"
        );
        Ok(bytes)
    }

    fn write_zip<W: Write + Seek>(&self, sink: W, content: &str) -> Result<W> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        let mut zip = ZipWriter::new(sink);
        zip.start_file(self.entry_name.as_str(), options)?;
        zip.write_all(content.as_bytes()).map_err(archive_io)?;
        Ok(zip.finish()?)
    }
}

fn archive_io(err: std::io::Error) -> Error {
    Error::ArchiveWriteFailed(err.to_string())
}
