//! Instruction texts sent to the inference endpoint.
//!
//! Every prompt lives here so that tests can inspect them directly and a
//! wording change touches exactly one file. The two extraction templates are
//! selected by [`ExtractionTemplate::for_mime`]; the summary prompt is
//! assembled by [`summary_prompt`] from the length table in
//! [`crate::config::SummaryLength`].

use crate::config::SummaryLength;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Extraction instruction for PDF documents.
pub const PDF_EXTRACTION_PROMPT: &str = "Extract all text from this PDF document with high accuracy. \
Maintain the original formatting, structure, and layout as much as possible. Please:
- Preserve paragraph breaks and spacing
- Maintain table structures if present
- Keep headers and subheaders distinct
- Preserve any list formatting (bullets, numbers)
- Include page breaks where appropriate

Return only the extracted text without any additional commentary.";

/// Extraction (OCR) instruction for image documents.
pub const OCR_EXTRACTION_PROMPT: &str = "Extract all text from this image with high accuracy. \
Maintain the original formatting, structure, and layout as much as possible. If there are:
- Tables: Preserve tabular format with proper spacing
- Lists: Maintain bullet points or numbering
- Headers: Keep hierarchical structure
- Paragraphs: Preserve paragraph breaks

Return only the extracted text without any additional commentary or explanations.";

/// What every summary should concentrate on, regardless of length.
pub const SUMMARY_FOCUS: [&str; 5] = [
    "Main themes and key ideas",
    "Important facts, figures, and data points",
    "Significant conclusions or findings",
    "Action items or recommendations (if any)",
    "Critical insights or implications",
];

/// Which extraction instruction accompanies the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionTemplate {
    /// Layout-preserving PDF extraction.
    Pdf,
    /// OCR for raster images.
    Ocr,
}

impl ExtractionTemplate {
    /// `application/pdf` gets the PDF template, every other accepted type is
    /// treated as an image.
    pub fn for_mime(mime_type: &str) -> Self {
        if mime_type == "application/pdf" {
            Self::Pdf
        } else {
            Self::Ocr
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Self::Pdf => PDF_EXTRACTION_PROMPT,
            Self::Ocr => OCR_EXTRACTION_PROMPT,
        }
    }

    /// Message used when the endpoint fails without explaining why.
    pub fn fallback_error(self) -> &'static str {
        match self {
            Self::Pdf => "PDF text extraction failed",
            Self::Ocr => "OCR processing failed",
        }
    }
}

impl fmt::Display for ExtractionTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => f.write_str("PDF extraction"),
            Self::Ocr => f.write_str("OCR"),
        }
    }
}

/// Build the summarisation prompt for `text` at the given length.
///
/// The document text is embedded verbatim; nothing is trimmed or escaped.
pub fn summary_prompt(text: &str, length: SummaryLength) -> String {
    let focus: String = SUMMARY_FOCUS
        .iter()
        .map(|item| format!("- {item}\n"))
        .collect();

    format!(
        "Analyze the following document and provide a {length} summary. {instruction}\n\n\
         Focus on:\n{focus}\n\
         Document Content:\n{text}\n\n\
         Summary:",
        length = length.as_str(),
        instruction = length.profile().instruction,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_selection() {
        assert_eq!(
            ExtractionTemplate::for_mime("application/pdf"),
            ExtractionTemplate::Pdf
        );
        assert_eq!(
            ExtractionTemplate::for_mime("image/png"),
            ExtractionTemplate::Ocr
        );
        assert_eq!(
            ExtractionTemplate::for_mime("image/tiff"),
            ExtractionTemplate::Ocr
        );
    }

    #[test]
    fn templates_differ() {
        assert!(PDF_EXTRACTION_PROMPT.contains("PDF document"));
        assert!(PDF_EXTRACTION_PROMPT.contains("page breaks"));
        assert!(OCR_EXTRACTION_PROMPT.contains("this image"));
        assert!(!OCR_EXTRACTION_PROMPT.contains("page breaks"));
    }

    #[test]
    fn summary_prompt_layout() {
        let prompt = summary_prompt("The quick brown fox.", SummaryLength::Short);
        assert!(prompt.starts_with("Analyze the following document and provide a short summary."));
        assert!(prompt.contains("2-3 sentences"));
        for item in SUMMARY_FOCUS {
            assert!(prompt.contains(&format!("- {item}\n")), "missing {item}");
        }
        assert!(prompt.contains("Document Content:\nThe quick brown fox.\n\nSummary:"));
        assert!(prompt.ends_with("Summary:"));
    }

    #[test]
    fn summary_prompt_keeps_text_verbatim() {
        let text = "  line one\n\n\tline two  ";
        let prompt = summary_prompt(text, SummaryLength::Long);
        assert!(prompt.contains(text));
        assert!(prompt.contains("3-4 paragraphs"));
    }
}
