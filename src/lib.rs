//! # edgequake-briefly
//!
//! Extract the text of a PDF or image with Gemini, then summarise it.
//!
//! Both steps are delegated to the `generateContent` endpoint: the document
//! travels inline as base64 with an extraction prompt, and the extracted
//! text comes back for a second, length-controlled summarisation call. This
//! crate does the local work around it: validation, encoding, request
//! construction, response unwrapping and session state.
//!
//! ## Pipeline Overview
//!
//! ```text
//! file
//!  │
//!  ├─ 1. Input     path or bytes → UploadedFile (name, MIME, size)
//!  ├─ 2. Validate  PDF/JPEG/PNG/BMP/TIFF, ≤ 50 MiB
//!  ├─ 3. Encode    bytes → base64
//!  ├─ 4. Extract   PDF or OCR prompt, deterministic decoding
//!  ├─ 5. Summarise short / medium / long
//!  └─ 6. Export    "Document Summary (MEDIUM)" text file
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_briefly::{ClientConfig, GeminiClient, Session, SummaryLength, UploadedFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key from GEMINI_API_KEY
//!     let client = GeminiClient::new(ClientConfig::from_env())?;
//!     let mut session = Session::new();
//!
//!     session.select_file(UploadedFile::from_path("report.pdf", None).await?)?;
//!     session.extract(&client).await?;
//!     session.set_length(SummaryLength::Short);
//!     println!("{}", session.summarize(&client).await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `briefly` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod export;
pub mod gemini;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ClientConfig, ClientConfigBuilder, SummaryLength, SummaryProfile};
pub use error::{BrieflyError, ValidationError};
pub use export::{render_export, SummaryExport};
pub use gemini::{ApiError, GeminiClient};
pub use pipeline::extract::extract_text;
pub use pipeline::input::{UploadedFile, ACCEPTED_EXTENSIONS};
pub use pipeline::summarize::summarize_text;
pub use pipeline::validate::{validate, ALLOWED_MIME_TYPES, MAX_FILE_BYTES};
pub use progress::{NoopProgressCallback, ProgressCallback, SessionProgressCallback, Stage};
pub use prompts::ExtractionTemplate;
pub use session::{
    Action, ExtractionJob, FileId, Session, SessionReport, SessionState, SummaryJob,
    SummaryResult, TextStats,
};
