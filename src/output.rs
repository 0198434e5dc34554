//! Result types produced by the translation pipeline.

use crate::document::DocumentKind;
use crate::language::DetectedLanguage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Text returned in place of a translation that could not be produced.
pub const TRANSLATION_FAILED: &str = "Translation failed";

/// Where a segment's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Native,
    Ocr,
}

/// Extracted text for one page (PDF) or the whole document (text, image).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSegment {
    /// 0-based; always 0 for text and image documents.
    pub page_index: usize,
    pub text: String,
    pub provenance: Provenance,
}

impl ExtractedSegment {
    pub fn native(page_index: usize, text: impl Into<String>) -> Self {
        Self {
            page_index,
            text: text.into(),
            provenance: Provenance::Native,
        }
    }

    pub fn ocr(page_index: usize, text: impl Into<String>) -> Self {
        Self {
            page_index,
            text: text.into(),
            provenance: Provenance::Ocr,
        }
    }
}

/// Concatenate segment texts in page order, the way the document buffer
/// accumulates during extraction.
pub fn joined_text(segments: &[ExtractedSegment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Succeeded,
    Degraded,
}

/// Result of translating one unit of text. Degraded outcomes are not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationOutcome {
    pub text: String,
    pub status: OutcomeStatus,
    /// Calls made to the translation capability (0 for passthrough and
    /// empty input).
    pub attempts: u32,
}

impl TranslationOutcome {
    pub fn succeeded(text: impl Into<String>, attempts: u32) -> Self {
        Self {
            text: text.into(),
            status: OutcomeStatus::Succeeded,
            attempts,
        }
    }

    /// A degraded outcome always carries [`TRANSLATION_FAILED`].
    pub fn degraded(attempts: u32) -> Self {
        Self {
            text: TRANSLATION_FAILED.to_string(),
            status: OutcomeStatus::Degraded,
            attempts,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.status == OutcomeStatus::Degraded
    }
}

/// One page handled by the page-level fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTranslation {
    pub page_index: usize,
    pub detected_language: DetectedLanguage,
    pub outcome: TranslationOutcome,
}

/// Final translated text: outcome texts joined by single spaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedDocument {
    pub text: String,
}

impl TranslatedDocument {
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a TranslationOutcome>) -> Self {
        let text = outcomes
            .into_iter()
            .map(|o| o.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self { text }
    }
}

/// The document handed to a [`crate::pipeline::assemble::DocumentWriter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledDocument {
    pub paragraphs: Vec<String>,
}

/// A written artifact, ready for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPayload {
    pub file_name: String,
    pub media_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Per-request counters and timings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub segments: usize,
    pub ocr_calls: usize,
    pub translation_attempts: u32,
    pub extraction_duration_ms: u64,
    pub translation_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything one request produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationOutput {
    /// Per-request identifier; also names the artifact.
    pub request_id: Uuid,
    pub file_kind: DocumentKind,
    pub destination: String,
    pub detected_language: DetectedLanguage,
    pub segments: Vec<ExtractedSegment>,
    /// Whole-document outcome. When the page fallback ran its text is the
    /// joined page results, or the sentinel if no page was translated.
    pub outcome: TranslationOutcome,
    pub page_fallback_used: bool,
    pub page_translations: Vec<PageTranslation>,
    pub document: TranslatedDocument,
    pub artifact: ArtifactPayload,
    pub stats: PipelineStats,
}

/// Result of [`crate::convert::inspect`]: what the pipeline would see,
/// without OCR or translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectReport {
    pub file_name: String,
    pub file_kind: DocumentKind,
    pub size_bytes: usize,
    /// PDF only.
    pub page_count: Option<usize>,
    /// PDF pages whose native text layer is not blank.
    pub pages_with_text: Option<usize>,
    /// Embedded images across all PDF pages.
    pub image_count: Option<usize>,
}
