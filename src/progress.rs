//! Progress-callback trait for extraction and summarisation events.
//!
//! Inject an [`Arc<dyn SessionProgressCallback>`] via
//! [`crate::session::Session::with_progress`] to be told when each network
//! call starts and how it ended. Front ends use it to render busy state
//! (a spinner, a disabled button) without polling the session.
//!
//! # Example
//!
//! ```rust
//! use edgequake_briefly::{Session, SessionProgressCallback, SummaryLength};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     summaries: AtomicUsize,
//! }
//!
//! impl SessionProgressCallback for CountingCallback {
//!     fn on_summary_complete(&self, _length: SummaryLength, _chars: usize) {
//!         self.summaries.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let cb = Arc::new(CountingCallback { summaries: AtomicUsize::new(0) });
//! let session = Session::new().with_progress(cb as Arc<dyn SessionProgressCallback>);
//! ```

use crate::config::SummaryLength;
use crate::prompts::ExtractionTemplate;
use crate::session::TextStats;
use std::fmt;
use std::sync::Arc;

/// Which operation an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extraction,
    Summarization,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Extraction => f.write_str("extraction"),
            Stage::Summarization => f.write_str("summarization"),
        }
    }
}

/// Called by the session around each network call.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait SessionProgressCallback: Send + Sync {
    /// Called just before the extraction request is sent.
    fn on_extraction_start(&self, file_name: &str, template: ExtractionTemplate) {
        let _ = (file_name, template);
    }

    /// Called when extraction produced text.
    fn on_extraction_complete(&self, stats: TextStats) {
        let _ = stats;
    }

    /// Called just before the summary request is sent.
    fn on_summary_start(&self, length: SummaryLength) {
        let _ = length;
    }

    /// Called when a summary was produced.
    ///
    /// # Arguments
    /// * `chars` — character count of the summary (may be 0)
    fn on_summary_complete(&self, length: SummaryLength, chars: usize) {
        let _ = (length, chars);
    }

    /// Called when either operation failed; `message` is what the session
    /// stored in its error slot.
    fn on_error(&self, stage: Stage, message: &str) {
        let _ = (stage, message);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl SessionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::session::Session`].
pub type ProgressCallback = Arc<dyn SessionProgressCallback>;
