//! Pipeline stages from an uploaded file to a summary.
//!
//! Each submodule implements exactly one step and is testable on its own.
//! [`crate::session::Session`] strings them together and records the outcome.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ validate ──▶ encode ──▶ extract ──▶ summarize
//! (path)    (type/size)  (base64)   (Gemini)    (Gemini)
//! ```
//!
//! 1. [`input`]     — build an [`input::UploadedFile`] from a path or bytes
//! 2. [`validate`]  — allowed MIME types and the 50 MiB limit; purely local
//! 3. [`encode`]    — read the document and base64 it for the request body
//! 4. [`extract`]   — PDF or OCR prompt + inline data → plain text
//! 5. [`summarize`] — extracted text + length → summary text

pub mod encode;
pub mod extract;
pub mod input;
pub mod summarize;
pub mod validate;
