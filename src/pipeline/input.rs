//! Input resolution: turn a user-supplied path or buffer into an [`UploadedFile`].
//!
//! Path-backed files are only stat'ed here. The bytes are read when the
//! document is encoded for extraction, so a file that disappears or loses
//! its permissions in between surfaces as [`BrieflyError::ReadFailed`] at
//! that point.

use crate::error::BrieflyError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Extensions offered by a file picker.
pub const ACCEPTED_EXTENSIONS: [&str; 6] = ["pdf", "jpg", "jpeg", "png", "bmp", "tiff"];

/// Where the document bytes live.
#[derive(Clone)]
pub enum FileSource {
    /// Already in memory.
    Bytes(Arc<Vec<u8>>),
    /// On disk; read at encode time.
    Path(PathBuf),
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSource::Bytes(b) => write!(f, "Bytes(<{} bytes>)", b.len()),
            FileSource::Path(p) => f.debug_tuple("Path").field(p).finish(),
        }
    }
}

/// A candidate document. Immutable once created.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Display name (final path component for path-backed files).
    pub name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    pub source: FileSource,
}

impl UploadedFile {
    /// Wrap an in-memory document.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: bytes.len() as u64,
            source: FileSource::Bytes(Arc::new(bytes)),
        }
    }

    /// Describe a file on disk.
    ///
    /// The MIME type is guessed from the extension unless `mime_override` is
    /// given; unknown extensions map to `application/octet-stream`, which the
    /// validator rejects.
    pub async fn from_path(
        path: impl AsRef<Path>,
        mime_override: Option<&str>,
    ) -> Result<Self, BrieflyError> {
        let path = path.as_ref();
        let name = display_name(path);

        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|source| BrieflyError::ReadFailed {
                name: name.clone(),
                source,
            })?;
        if !meta.is_file() {
            return Err(BrieflyError::ReadFailed {
                name,
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
            });
        }

        let mime_type = match mime_override {
            Some(m) => m.to_string(),
            None => guess_mime(path),
        };

        debug!("Resolved {} ({}, {} bytes)", path.display(), mime_type, meta.len());

        Ok(Self {
            name,
            mime_type,
            size: meta.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    /// Human-readable size, e.g. `"2.00 MB"`.
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.size as f64 / 1024.0 / 1024.0)
    }

    /// `"PDF Document"` or `"Image File"`.
    pub fn kind_label(&self) -> &'static str {
        if self.mime_type.contains("pdf") {
            "PDF Document"
        } else {
            "Image File"
        }
    }
}

/// Pick the document from a drop of one or more files.
///
/// Only the first file is used. The rest are ignored without any error.
pub fn first_dropped<I>(files: I) -> Option<UploadedFile>
where
    I: IntoIterator<Item = UploadedFile>,
{
    let mut iter = files.into_iter();
    let first = iter.next()?;
    let ignored = iter.count();
    if ignored > 0 {
        debug!("Drop contained {} extra file(s); using '{}'", ignored, first.name);
    }
    Some(first)
}

/// Whether `path` carries one of the [`ACCEPTED_EXTENSIONS`] (case-insensitive).
pub fn has_accepted_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| ACCEPTED_EXTENSIONS.contains(&e.as_str()))
}

fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
