//! Error types for the edgequake-briefly library.
//!
//! Two types cover the two places a document can be turned away:
//!
//! * [`ValidationError`] — the file was refused locally (wrong type, too
//!   large). It never reaches the network.
//!
//! * [`BrieflyError`] — everything else: unreadable documents, failed
//!   extraction or summarisation calls, and misuse of the session (asking
//!   for a summary before any text exists).
//!
//! Every variant's `Display` output is the exact message a front end shows
//! to the user; the session stores it verbatim in its error slot.

use std::path::PathBuf;
use thiserror::Error;

/// A file refused by [`crate::pipeline::validate::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// MIME type outside the allowed set.
    #[error("Please upload a PDF or image file (JPEG, PNG, BMP, TIFF)")]
    UnsupportedType { mime_type: String },

    /// File is larger than the upload limit.
    #[error("File size must be less than 50MB")]
    TooLarge { size: u64, limit: u64 },
}

/// All errors returned by the edgequake-briefly library.
#[derive(Debug, Error)]
pub enum BrieflyError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The candidate file failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The document bytes could not be read.
    #[error("Document '{name}' is unreadable: {source}")]
    ReadFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// An operation needing a document was triggered with none selected.
    #[error("No document selected")]
    NoDocument,

    // ── Inference errors ──────────────────────────────────────────────────
    /// Extraction call failed (API error or transport failure).
    #[error("{message}")]
    ExtractionFailed { message: String },

    /// Extraction succeeded but produced only whitespace.
    #[error("No text found in the document")]
    EmptyDocument,

    /// Summarisation call failed (API error or transport failure).
    #[error("{message}")]
    SummarizationFailed { message: String },

    /// Summarisation was triggered before any text was extracted.
    #[error("Please extract text first")]
    MissingInput,

    // ── Session errors ────────────────────────────────────────────────────
    /// The same operation is already in flight.
    #[error("{operation} already in progress")]
    Busy { operation: &'static str },

    /// A result arrived for a document that is no longer selected.
    #[error("Result discarded: a different document was selected")]
    Superseded,

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not write the exported summary file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
