//! Wire types and HTTP transport for the Gemini `generateContent` method.
//!
//! Both the extraction and the summarisation clients send the same request
//! shape and read the same response shape; only the parts and the decoding
//! configuration differ. This module knows nothing about prompts. It turns a
//! [`GenerateContentRequest`] into the text of the first candidate, or an
//! [`ApiError`].
//!
//! ```text
//! POST {base}/models/{model}:generateContent?key=…
//! { contents: [ { parts: [ {text}, {inline_data: {mime_type, data}}? ] } ],
//!   generationConfig: { temperature, topK, topP, maxOutputTokens } }
//! ```

use crate::config::ClientConfig;
use crate::error::BrieflyError;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

// ── Request ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// A single-turn request made of `parts`.
    pub fn single(parts: Vec<Part>, generation_config: GenerationConfig) -> Self {
        Self {
            contents: vec![Content { parts }],
            generation_config,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn inline(mime_type: impl Into<String>, data: String) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data,
            },
        }
    }
}

/// Base64 payload embedded in the request body.
#[derive(Clone, PartialEq, Serialize)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

// Payloads run to tens of megabytes; keep them out of debug logs.
impl std::fmt::Debug for InlineData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineData")
            .field("mime_type", &self.mime_type)
            .field("data", &format_args!("<{} bytes base64>", self.data.len()))
            .finish()
    }
}

/// Decoding parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    /// Near-deterministic decoding used for text extraction.
    pub const EXTRACTION: GenerationConfig = GenerationConfig {
        temperature: 0.1,
        top_k: 1,
        top_p: 1.0,
        max_output_tokens: 8192,
    };

    /// Moderate-temperature decoding used for summaries, capped at `max_output_tokens`.
    pub fn summary(max_output_tokens: u32) -> Self {
        Self {
            temperature: 0.3,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens,
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate's first part, or `""` when any link is missing.
    pub fn first_text(&self) -> &str {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

// ── Errors ───────────────────────────────────────────────────────────────

/// Failure of a single `generateContent` call.
///
/// Callers translate this into the operation-specific [`BrieflyError`]
/// variant with [`ApiError::message_or`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx status. `message` is `error.message` from the body, if any.
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Status { status: u16, message: Option<String> },

    /// The request never produced a response. The URL (and with it the
    /// `key` query parameter) is stripped before the error is stored.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    /// 2xx response whose body is not the expected JSON.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.without_url())
    }
}

impl ApiError {
    /// The user-facing message: the endpoint's own message when it sent one,
    /// `fallback` for a bare status, and `fallback: cause` for transport and
    /// decode failures.
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(m), ..
            } if !m.is_empty() => m.clone(),
            ApiError::Status { .. } => fallback.to_string(),
            ApiError::Transport(e) => format!("{fallback}: {e}"),
            ApiError::Decode(d) => format!("{fallback}: {d}"),
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────────

/// HTTP client for one configured model.
///
/// Cheap to clone; the underlying `reqwest::Client` pools connections.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl GeminiClient {
    pub fn new(config: ClientConfig) -> Result<Self, BrieflyError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.api_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| BrieflyError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send one request and return the first candidate's text.
    ///
    /// Exactly one attempt is made.
    pub async fn generate(&self, request: &GenerateContentRequest) -> Result<String, ApiError> {
        let start = Instant::now();
        let url = self.config.endpoint();
        debug!(
            "POST {} ({} parts, maxOutputTokens={})",
            url,
            request.contents.iter().map(|c| c.parts.len()).sum::<usize>(),
            request.generation_config.max_output_tokens
        );

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message);
            warn!(
                "generateContent returned HTTP {} after {:?}",
                status.as_u16(),
                start.elapsed()
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        let parsed: GenerateContentResponse =
            serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))?;
        let text = parsed.first_text().to_string();

        debug!("generateContent ok: {} chars in {:?}", text.len(), start.elapsed());
        Ok(text)
    }
}
