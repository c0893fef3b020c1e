//! Session state: one document, its extracted text, its summary.
//!
//! [`SessionState`] is a plain value updated only through
//! [`SessionState::reduce`]. Every in-flight request is tagged with the
//! [`FileId`] of the document it targets, and completions whose tag no
//! longer matches are dropped. Selecting a new file therefore cancels
//! whatever was running: both busy flags are released at once and late
//! results cannot overwrite the new document's state.
//!
//! [`Session`] wraps the state with the operations a front end triggers.
//! Jobs can run inline ([`Session::extract`], [`Session::summarize`]) or be
//! split into `begin_*` / `finish_*` so the caller owns the await.
//!
//! ```text
//!  select_file ─▶ FileAccepted ─┬─▶ ExtractionStarted ─▶ Succeeded / Failed
//!        │                      └─▶ SummarizationStarted ─▶ Succeeded / Failed
//!        └─▶ FileRejected (state untouched, error set)
//! ```

use crate::config::SummaryLength;
use crate::error::BrieflyError;
use crate::export::{render_export, SummaryExport};
use crate::gemini::GeminiClient;
use crate::pipeline::extract::extract_text;
use crate::pipeline::input::{first_dropped, UploadedFile};
use crate::pipeline::summarize::summarize_text;
use crate::pipeline::validate::validate_file;
use crate::progress::{NoopProgressCallback, ProgressCallback, Stage};
use crate::prompts::ExtractionTemplate;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Identity of one accepted file within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FileId(u64);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Character and word counts of a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TextStats {
    pub characters: usize,
    pub words: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            characters: text.chars().count(),
            words: text.split_whitespace().count(),
        }
    }
}

#[derive(Debug, Clone)]
struct CurrentFile {
    id: FileId,
    file: UploadedFile,
}

/// A generated summary and the length it was generated at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub text: String,
    pub length: SummaryLength,
}

/// Everything a front end renders.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    current: Option<CurrentFile>,
    extracted_text: Option<String>,
    summary: Option<SummaryResult>,
    length: SummaryLength,
    extracting: Option<FileId>,
    summarizing: Option<FileId>,
    error: Option<String>,
}

/// A state transition.
#[derive(Debug, Clone)]
pub enum Action {
    FileAccepted { id: FileId, file: UploadedFile },
    FileRejected { reason: String },
    LengthSelected(SummaryLength),
    ExtractionStarted { id: FileId },
    ExtractionSucceeded { id: FileId, text: String },
    ExtractionFailed { id: FileId, message: String },
    SummarizationStarted { id: FileId },
    SummarizationSucceeded { id: FileId, summary: SummaryResult },
    SummarizationFailed { id: FileId, message: String },
    /// Summarisation was asked for with no extracted text.
    InputMissing { message: String },
    ExportRequested,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::FileAccepted { .. } => "FileAccepted",
            Action::FileRejected { .. } => "FileRejected",
            Action::LengthSelected(_) => "LengthSelected",
            Action::ExtractionStarted { .. } => "ExtractionStarted",
            Action::ExtractionSucceeded { .. } => "ExtractionSucceeded",
            Action::ExtractionFailed { .. } => "ExtractionFailed",
            Action::SummarizationStarted { .. } => "SummarizationStarted",
            Action::SummarizationSucceeded { .. } => "SummarizationSucceeded",
            Action::SummarizationFailed { .. } => "SummarizationFailed",
            Action::InputMissing { .. } => "InputMissing",
            Action::ExportRequested => "ExportRequested",
        }
    }
}

impl SessionState {
    /// Apply `action`, returning the next state.
    ///
    /// Start actions for a file other than the current one, and completions
    /// that do not match the in-flight tag, leave the state unchanged.
    pub fn reduce(self, action: Action) -> Self {
        match action {
            Action::FileAccepted { id, file } => Self {
                current: Some(CurrentFile { id, file }),
                extracted_text: None,
                summary: None,
                extracting: None,
                summarizing: None,
                error: None,
                ..self
            },
            Action::FileRejected { reason } => Self {
                error: Some(reason),
                ..self
            },
            Action::LengthSelected(length) => Self { length, ..self },
            Action::InputMissing { message } => Self {
                error: Some(message),
                ..self
            },
            Action::ExportRequested => self,

            Action::ExtractionStarted { id } if self.file_id() == Some(id) => Self {
                extracting: Some(id),
                error: None,
                ..self
            },
            Action::ExtractionSucceeded { id, text } if self.extracting == Some(id) => Self {
                extracted_text: Some(text),
                extracting: None,
                ..self
            },
            Action::ExtractionFailed { id, message } if self.extracting == Some(id) => Self {
                extracted_text: None,
                extracting: None,
                error: Some(message),
                ..self
            },

            Action::SummarizationStarted { id } if self.file_id() == Some(id) => Self {
                summarizing: Some(id),
                error: None,
                ..self
            },
            Action::SummarizationSucceeded { id, summary } if self.summarizing == Some(id) => Self {
                summary: Some(summary),
                summarizing: None,
                ..self
            },
            Action::SummarizationFailed { id, message } if self.summarizing == Some(id) => Self {
                summarizing: None,
                error: Some(message),
                ..self
            },

            stale => {
                debug!(
                    "Discarding stale {} (current file {:?})",
                    stale.name(),
                    self.file_id()
                );
                self
            }
        }
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        self.current.as_ref().map(|c| &c.file)
    }

    pub fn file_id(&self) -> Option<FileId> {
        self.current.as_ref().map(|c| c.id)
    }

    pub fn extracted_text(&self) -> Option<&str> {
        self.extracted_text.as_deref()
    }

    pub fn summary(&self) -> Option<&SummaryResult> {
        self.summary.as_ref()
    }

    /// Currently selected length (not necessarily the one the summary used).
    pub fn length(&self) -> SummaryLength {
        self.length
    }

    pub fn is_extracting(&self) -> bool {
        self.extracting.is_some()
    }

    pub fn is_summarizing(&self) -> bool {
        self.summarizing.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn text_stats(&self) -> Option<TextStats> {
        self.extracted_text().map(TextStats::of)
    }
}

// ── Jobs ─────────────────────────────────────────────────────────────────

/// One extraction, detached from the session so the caller can await it.
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    pub id: FileId,
    pub file: UploadedFile,
}

impl ExtractionJob {
    pub fn template(&self) -> ExtractionTemplate {
        ExtractionTemplate::for_mime(&self.file.mime_type)
    }

    pub async fn run(&self, client: &GeminiClient) -> Result<String, BrieflyError> {
        extract_text(client, &self.file).await
    }
}

/// One summarisation, detached from the session so the caller can await it.
#[derive(Debug, Clone)]
pub struct SummaryJob {
    pub id: FileId,
    pub text: String,
    pub length: SummaryLength,
}

impl SummaryJob {
    pub async fn run(&self, client: &GeminiClient) -> Result<String, BrieflyError> {
        summarize_text(client, &self.text, self.length).await
    }
}

// ── Session ──────────────────────────────────────────────────────────────

/// The orchestrator a front end drives.
pub struct Session {
    state: SessionState,
    next_id: u64,
    progress: ProgressCallback,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            state: SessionState::default(),
            next_id: 0,
            progress: Arc::new(NoopProgressCallback),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("next_id", &self.next_id)
            .field("progress", &"<dyn SessionProgressCallback>")
            .finish()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(action);
    }

    /// Validate and accept `file`, replacing any previous document.
    ///
    /// A rejected file only sets the error; the previous document, its text
    /// and its summary stay as they were.
    pub fn select_file(&mut self, file: UploadedFile) -> Result<FileId, BrieflyError> {
        if let Err(e) = validate_file(&file) {
            warn!(
                "Rejected '{}' ({}, {} bytes): {}",
                file.name, file.mime_type, file.size, e
            );
            self.dispatch(Action::FileRejected {
                reason: e.to_string(),
            });
            return Err(e.into());
        }

        self.next_id += 1;
        let id = FileId(self.next_id);
        if self.state.is_extracting() || self.state.is_summarizing() {
            info!("New document selected; abandoning in-flight work");
        }
        info!(
            "Accepted '{}' as {} ({}, {})",
            file.name,
            id,
            file.kind_label(),
            file.size_label()
        );
        self.dispatch(Action::FileAccepted { id, file });
        Ok(id)
    }

    /// Accept the first of several dropped files. `None` for an empty drop.
    pub fn drop_files<I>(&mut self, files: I) -> Option<Result<FileId, BrieflyError>>
    where
        I: IntoIterator<Item = UploadedFile>,
    {
        first_dropped(files).map(|f| self.select_file(f))
    }

    /// Change the length for the next summary. The current summary is kept.
    pub fn set_length(&mut self, length: SummaryLength) {
        self.dispatch(Action::LengthSelected(length));
    }

    // ── Extraction ───────────────────────────────────────────────────────

    /// Mark extraction as started and hand back the job to run.
    pub fn begin_extraction(&mut self) -> Result<ExtractionJob, BrieflyError> {
        let current = self.state.current.as_ref().ok_or(BrieflyError::NoDocument)?;
        if self.state.is_extracting() {
            return Err(BrieflyError::Busy {
                operation: "Extraction",
            });
        }

        let job = ExtractionJob {
            id: current.id,
            file: current.file.clone(),
        };
        self.dispatch(Action::ExtractionStarted { id: job.id });
        self.progress.on_extraction_start(&job.file.name, job.template());
        Ok(job)
    }

    /// Record the outcome of `job`. The busy flag is released either way.
    ///
    /// Returns [`BrieflyError::Superseded`] when another document was selected
    /// while the job ran; nothing is recorded in that case.
    pub fn finish_extraction(
        &mut self,
        job: ExtractionJob,
        result: Result<String, BrieflyError>,
    ) -> Result<(), BrieflyError> {
        if self.state.extracting != Some(job.id) {
            debug!("Dropping extraction result for {}", job.id);
            return Err(BrieflyError::Superseded);
        }

        match result {
            Ok(text) => {
                let stats = TextStats::of(&text);
                self.dispatch(Action::ExtractionSucceeded { id: job.id, text });
                self.progress.on_extraction_complete(stats);
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.progress.on_error(Stage::Extraction, &message);
                self.dispatch(Action::ExtractionFailed { id: job.id, message });
                Err(e)
            }
        }
    }

    /// Extract the current document's text, awaiting the call inline.
    pub async fn extract(&mut self, client: &GeminiClient) -> Result<&str, BrieflyError> {
        let job = self.begin_extraction()?;
        let result = job.run(client).await;
        self.finish_extraction(job, result)?;
        Ok(self.state.extracted_text().unwrap_or_default())
    }

    // ── Summarisation ────────────────────────────────────────────────────

    /// Mark summarisation as started and hand back the job to run.
    ///
    /// Without extracted text this records "Please extract text first" in
    /// the error slot and returns [`BrieflyError::MissingInput`].
    pub fn begin_summarization(&mut self) -> Result<SummaryJob, BrieflyError> {
        let pending = match (self.state.file_id(), self.state.extracted_text()) {
            (Some(id), Some(text)) if !text.is_empty() => Some((id, text.to_string())),
            _ => None,
        };
        let Some((id, text)) = pending else {
            let e = BrieflyError::MissingInput;
            self.dispatch(Action::InputMissing {
                message: e.to_string(),
            });
            return Err(e);
        };
        if self.state.is_summarizing() {
            return Err(BrieflyError::Busy {
                operation: "Summarization",
            });
        }

        let job = SummaryJob {
            id,
            text,
            length: self.state.length,
        };
        self.dispatch(Action::SummarizationStarted { id });
        self.progress.on_summary_start(job.length);
        Ok(job)
    }

    /// Record the outcome of `job`. A failure keeps the previous summary.
    pub fn finish_summarization(
        &mut self,
        job: SummaryJob,
        result: Result<String, BrieflyError>,
    ) -> Result<(), BrieflyError> {
        if self.state.summarizing != Some(job.id) {
            debug!("Dropping summary result for {}", job.id);
            return Err(BrieflyError::Superseded);
        }

        match result {
            Ok(text) => {
                let chars = text.chars().count();
                self.dispatch(Action::SummarizationSucceeded {
                    id: job.id,
                    summary: SummaryResult {
                        text,
                        length: job.length,
                    },
                });
                self.progress.on_summary_complete(job.length, chars);
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.progress.on_error(Stage::Summarization, &message);
                self.dispatch(Action::SummarizationFailed { id: job.id, message });
                Err(e)
            }
        }
    }

    /// Summarise the extracted text at the selected length, awaiting inline.
    pub async fn summarize(&mut self, client: &GeminiClient) -> Result<&str, BrieflyError> {
        let job = self.begin_summarization()?;
        let result = job.run(client).await;
        self.finish_summarization(job, result)?;
        Ok(self
            .state
            .summary()
            .map(|s| s.text.as_str())
            .unwrap_or_default())
    }

    // ── Export ───────────────────────────────────────────────────────────

    /// Render the current summary for download, labelled with the currently
    /// selected length. `None` when there is no summary or it is empty.
    pub fn export(&mut self, generated_at: DateTime<Local>) -> Option<SummaryExport> {
        self.dispatch(Action::ExportRequested);
        let summary = self.state.summary()?;
        render_export(&summary.text, self.state.length, generated_at)
    }

    /// Snapshot of the finished run, for structured output.
    pub fn report(&self) -> Option<SessionReport> {
        let file = self.state.file()?;
        Some(SessionReport {
            file_name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size_bytes: file.size,
            length: self.state.summary().map(|s| s.length).unwrap_or(self.state.length),
            stats: self.state.text_stats(),
            extracted_text: self.state.extracted_text().map(str::to_string),
            summary: self.state.summary().map(|s| s.text.clone()),
        })
    }
}

/// Serialisable outcome of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub length: SummaryLength,
    pub stats: Option<TextStats>,
    pub extracted_text: Option<String>,
    pub summary: Option<String>,
}
