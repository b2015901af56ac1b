//! The staged file: bytes plus the metadata the multipart part needs.

use anyhow::{Context, Result};
use bytes::Bytes;
use std::path::Path;

const FALLBACK_MIME: &str = "application/octet-stream";

/// A file picked by the user.
///
/// The byte buffer is shared, so snapshotting the selection for an upload in
/// flight does not copy the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    filename: String,
    mime: String,
    data: Bytes,
}

impl SelectedFile {
    /// Build from in-memory bytes, guessing the MIME type from the filename.
    pub fn from_bytes(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let filename = filename.into();
        let data: Vec<u8> = data.into();
        let mime = mime_guess::from_path(&filename)
            .first_raw()
            .unwrap_or(FALLBACK_MIME)
            .to_string();

        Self {
            filename,
            mime,
            data: Bytes::from(data),
        }
    }

    /// Read a file from disk. Only the final path component is sent as the filename.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read file: {:?}", path))?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("Path has no file name: {:?}", path))?;

        Ok(Self::from_bytes(filename, data))
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Shared handle to the file contents, no copy.
    pub fn bytes(&self) -> Bytes {
        self.data.clone()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}
