//! Configuration types for the inference client and the summary length table.
//!
//! Everything that talks to the endpoint is controlled through
//! [`ClientConfig`], built via [`ClientConfigBuilder`] or read from the
//! environment with [`ClientConfig::from_env`]. The API key is deliberately
//! not checked here: a missing key shows up as the endpoint's own
//! authentication error on the first call.

use crate::error::BrieflyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Default Gemini REST base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default multimodal model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// Environment variables consulted for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "VITE_GEMINI_API_KEY"];

/// Connection settings for the `generateContent` endpoint.
///
/// # Example
/// ```rust
/// use edgequake_briefly::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .api_key("my-key")
///     .model("gemini-1.5-flash-latest")
///     .build()
///     .unwrap();
/// assert_eq!(config.model, "gemini-1.5-flash-latest");
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Static API key, sent as the `key` query parameter.
    pub api_key: String,

    /// Base URL without trailing slash. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Optional per-request timeout in seconds. Default: none.
    ///
    /// Without a timeout a hung request keeps its busy flag set until the
    /// connection drops.
    pub api_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_timeout_secs: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Read the API key from [`API_KEY_VARS`], keeping every other default.
    ///
    /// A missing key is logged but not rejected.
    pub fn from_env() -> Self {
        let api_key = API_KEY_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.is_empty())
            .unwrap_or_default();

        if api_key.is_empty() {
            warn!(
                "No API key found in {}; requests will be rejected by the endpoint",
                API_KEY_VARS.join(" / ")
            );
        }

        Self {
            api_key,
            ..Self::default()
        }
    }

    /// Full URL of the `generateContent` method for the configured model.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = Some(secs);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, BrieflyError> {
        let c = &self.config;
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(BrieflyError::InvalidConfig(format!(
                "base URL must be http(s), got '{}'",
                c.base_url
            )));
        }
        if c.model.trim().is_empty() {
            return Err(BrieflyError::InvalidConfig("model must not be empty".into()));
        }
        if c.api_timeout_secs == Some(0) {
            return Err(BrieflyError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Summary length ───────────────────────────────────────────────────────

/// Instruction and output budget bound to one [`SummaryLength`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryProfile {
    pub instruction: &'static str,
    pub max_output_tokens: u32,
}

/// How long the generated summary should be.
///
/// | Length | Instruction | Token cap |
/// |--------|-------------|-----------|
/// | `short`  | 2-3 sentences | 200 |
/// | `medium` | 1-2 paragraphs (default) | 500 |
/// | `long`   | 3-4 paragraphs | 1000 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl SummaryLength {
    pub const ALL: [SummaryLength; 3] = [Self::Short, Self::Medium, Self::Long];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }

    pub fn profile(self) -> SummaryProfile {
        match self {
            Self::Short => SummaryProfile {
                instruction: "Create a concise summary in 2-3 sentences highlighting only the most critical points and key takeaways.",
                max_output_tokens: 200,
            },
            Self::Medium => SummaryProfile {
                instruction: "Create a comprehensive summary in 1-2 paragraphs covering the main ideas, key details, and important conclusions.",
                max_output_tokens: 500,
            },
            Self::Long => SummaryProfile {
                instruction: "Create a detailed summary in 3-4 paragraphs that thoroughly covers all important aspects, key points, supporting details, and conclusions.",
                max_output_tokens: 1000,
            },
        }
    }
}

impl fmt::Display for SummaryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryLength {
    type Err = BrieflyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            other => Err(BrieflyError::InvalidConfig(format!(
                "unknown summary length '{other}' (expected short, medium or long)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ClientConfig::default();
        assert_eq!(c.base_url, DEFAULT_BASE_URL);
        assert_eq!(c.model, DEFAULT_MODEL);
        assert!(c.api_timeout_secs.is_none());
        assert_eq!(SummaryLength::default(), SummaryLength::Medium);
    }

    #[test]
    fn endpoint_joins_model() {
        let c = ClientConfig::builder()
            .base_url("http://127.0.0.1:9999/")
            .model("gemini-test")
            .build()
            .unwrap();
        assert_eq!(
            c.endpoint(),
            "http://127.0.0.1:9999/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn builder_rejects_bad_values() {
        assert!(ClientConfig::builder().base_url("ftp://x").build().is_err());
        assert!(ClientConfig::builder().model("  ").build().is_err());
        assert!(ClientConfig::builder().api_timeout_secs(0).build().is_err());
    }

    #[test]
    fn debug_redacts_key() {
        let c = ClientConfig::builder().api_key("secret-123").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("secret-123"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn length_table() {
        assert_eq!(SummaryLength::Short.profile().max_output_tokens, 200);
        assert_eq!(SummaryLength::Medium.profile().max_output_tokens, 500);
        assert_eq!(SummaryLength::Long.profile().max_output_tokens, 1000);
        assert!(SummaryLength::Short.profile().instruction.contains("2-3 sentences"));
        assert!(SummaryLength::Medium.profile().instruction.contains("1-2 paragraphs"));
        assert!(SummaryLength::Long.profile().instruction.contains("3-4 paragraphs"));
    }

    #[test]
    fn length_parse() {
        assert_eq!("SHORT".parse::<SummaryLength>().unwrap(), SummaryLength::Short);
        assert_eq!(" long ".parse::<SummaryLength>().unwrap(), SummaryLength::Long);
        assert!("tiny".parse::<SummaryLength>().is_err());
        for l in SummaryLength::ALL {
            assert_eq!(l.as_str().parse::<SummaryLength>().unwrap(), l);
        }
    }
}
