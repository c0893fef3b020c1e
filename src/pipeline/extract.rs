//! Text extraction: send the document inline with the PDF or OCR prompt.
//!
//! One attempt per call. Whitespace-only output is treated as a failure so
//! that a blank scan never reaches the summariser.

use super::encode::encode_file;
use super::input::UploadedFile;
use crate::error::BrieflyError;
use crate::gemini::{GeminiClient, GenerateContentRequest, GenerationConfig, Part};
use crate::prompts::ExtractionTemplate;
use tracing::{info, warn};

/// Build the extraction request for an already-encoded document.
pub fn extraction_request(mime_type: &str, base64_data: String) -> GenerateContentRequest {
    let template = ExtractionTemplate::for_mime(mime_type);
    GenerateContentRequest::single(
        vec![
            Part::text(template.prompt()),
            Part::inline(mime_type, base64_data),
        ],
        GenerationConfig::EXTRACTION,
    )
}

/// Extract the plain text of `file`.
///
/// # Errors
/// * [`BrieflyError::ReadFailed`] — the document could not be read
/// * [`BrieflyError::ExtractionFailed`] — API or transport failure
/// * [`BrieflyError::EmptyDocument`] — the model returned no text
pub async fn extract_text(
    client: &GeminiClient,
    file: &UploadedFile,
) -> Result<String, BrieflyError> {
    let template = ExtractionTemplate::for_mime(&file.mime_type);
    info!("Extracting '{}' with {} template", file.name, template);

    let data = encode_file(file).await?;
    let request = extraction_request(&file.mime_type, data);

    let text = client.generate(&request).await.map_err(|e| {
        warn!("Extraction of '{}' failed: {}", file.name, e);
        BrieflyError::ExtractionFailed {
            message: e.message_or(template.fallback_error()),
        }
    })?;

    if text.trim().is_empty() {
        return Err(BrieflyError::EmptyDocument);
    }

    info!("Extracted {} chars from '{}'", text.len(), file.name);
    Ok(text)
}
