//! Summarisation: extracted text + length → summary text.

use crate::config::SummaryLength;
use crate::error::BrieflyError;
use crate::gemini::{GeminiClient, GenerateContentRequest, GenerationConfig, Part};
use crate::prompts::summary_prompt;
use tracing::{info, warn};

const FALLBACK_ERROR: &str = "Summary generation failed";

pub fn summary_request(text: &str, length: SummaryLength) -> GenerateContentRequest {
    GenerateContentRequest::single(
        vec![Part::text(summary_prompt(text, length))],
        GenerationConfig::summary(length.profile().max_output_tokens),
    )
}

/// Summarise `text` at `length`.
///
/// An empty reply is returned as-is.
///
/// # Errors
/// * [`BrieflyError::MissingInput`] — `text` is empty
/// * [`BrieflyError::SummarizationFailed`] — API or transport failure
pub async fn summarize_text(
    client: &GeminiClient,
    text: &str,
    length: SummaryLength,
) -> Result<String, BrieflyError> {
    if text.is_empty() {
        return Err(BrieflyError::MissingInput);
    }

    info!("Generating {} summary of {} chars", length, text.len());
    let request = summary_request(text, length);

    let summary = client.generate(&request).await.map_err(|e| {
        warn!("Summary generation failed: {}", e);
        BrieflyError::SummarizationFailed {
            message: e.message_or(FALLBACK_ERROR),
        }
    })?;

    if summary.trim().is_empty() {
        warn!("Endpoint returned an empty {} summary", length);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_length_budget() {
        for (length, cap) in [
            (SummaryLength::Short, 200),
            (SummaryLength::Medium, 500),
            (SummaryLength::Long, 1000),
        ] {
            let req = summary_request("Some text.", length);
            assert_eq!(req.generation_config.max_output_tokens, cap);
            assert_eq!(req.generation_config.temperature, 0.3);
            assert_eq!(req.generation_config.top_k, 40);
            assert_eq!(req.generation_config.top_p, 0.95);
            assert_eq!(req.contents.len(), 1);
            assert_eq!(req.contents[0].parts.len(), 1);
        }
    }

    #[tokio::test]
    async fn empty_text_is_missing_input() {
        let client = GeminiClient::new(crate::config::ClientConfig::default()).unwrap();
        let err = summarize_text(&client, "", SummaryLength::Short)
            .await
            .unwrap_err();
        assert!(matches!(err, BrieflyError::MissingInput));
    }
}
