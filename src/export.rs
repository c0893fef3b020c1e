//! Summary export: a plain-text file with a short header.
//!
//! ```text
//! Document Summary (MEDIUM)
//! Generated on: 2023-11-14 22:13:20
//!
//! <summary body>
//! ```
//!
//! The file is named `{length}_summary_{epoch-millis}.txt`. Rendering is pure
//! (same summary, length and timestamp give byte-identical output); writing
//! is a separate step so front ends can decide where the "download" goes.

use crate::config::SummaryLength;
use crate::error::BrieflyError;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::info;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A rendered export, ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryExport {
    pub filename: String,
    pub content: String,
}

/// Render `summary` for download. `None` when the summary is empty.
pub fn render_export(
    summary: &str,
    length: SummaryLength,
    generated_at: DateTime<Local>,
) -> Option<SummaryExport> {
    if summary.is_empty() {
        return None;
    }

    let content = format!(
        "Document Summary ({})\nGenerated on: {}\n\n{}",
        length.as_str().to_uppercase(),
        generated_at.format(TIMESTAMP_FORMAT),
        summary
    );
    let filename = format!("{}_summary_{}.txt", length, generated_at.timestamp_millis());

    Some(SummaryExport { filename, content })
}

impl SummaryExport {
    /// Write the export into `dir` and return the full path.
    ///
    /// Uses atomic write (temp file + rename) to prevent partial files.
    pub async fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf, BrieflyError> {
        let dir = dir.as_ref();
        let path = dir.join(&self.filename);
        let write_err = |source| BrieflyError::OutputWriteFailed {
            path: path.clone(),
            source,
        };

        tokio::fs::create_dir_all(dir).await.map_err(write_err)?;

        let tmp_path = path.with_extension("txt.tmp");
        tokio::fs::write(&tmp_path, &self.content)
            .await
            .map_err(write_err)?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(write_err)?;

        info!("Summary written to {}", path.display());
        Ok(path)
    }
}
