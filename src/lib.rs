//! # edgequake-doctranslate
//!
//! Translate text, PDF and image documents into another language.
//!
//! ## Why this crate?
//!
//! Real-world documents arrive as whatever the sender had at hand: a `.txt`
//! export, a PDF with a text layer, a scanned PDF, a phone photo. This crate
//! gets text out of all of them (falling back to OCR when there is no text
//! layer), identifies the source language, and translates with an LLM, without
//! ever failing a request just because one step came back empty.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload (txt / pdf / png / jpg)
//!  │
//!  ├─ 1. Validate   extension allow-list, PDF magic bytes
//!  ├─ 2. Extract    text layer via pdfium; tesseract/vision OCR fallback
//!  ├─ 3. Detect     lingua → English / Hindi / Tamil / Unknown
//!  ├─ 4. Translate  LLM call, bounded retries, passthrough, page fallback
//!  └─ 5. Assemble   single-paragraph .docx or .txt artifact
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_doctranslate::{translate_file, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let config = PipelineConfig::default();
//!     let output = translate_file("notice.pdf", "ta", &config).await?;
//!     println!("{}", output.document.text);
//!     eprintln!("detected {} in {}ms",
//!         output.detected_language,
//!         output.stats.total_duration_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | Enables the `doctranslate` binary (clap + anyhow + indicatif) |
//! | `server` | off     | Enables [`server`] and the `doctranslate-server` binary (axum) |
//!
//! ## External tools
//!
//! * **pdfium** for PDFs: set `PDFIUM_LIB_PATH` or install it system-wide.
//! * **tesseract** with the `eng`, `hin` and `tam` traineddata for OCR, unless
//!   [`OcrBackend::Vision`] is selected.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod artifact;
pub mod config;
pub mod context;
pub mod convert;
pub mod document;
pub mod error;
pub mod language;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
#[cfg(feature = "server")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use artifact::ArtifactStore;
pub use config::{OcrBackend, OcrFallbackScope, OutputFormat, PipelineConfig, PipelineConfigBuilder};
pub use context::RequestContext;
pub use convert::{inspect, translate_file, translate_sync, translate_to_file, translate_upload, Pipeline};
pub use document::{DocumentKind, Page, SourceDocument};
pub use error::{DetectError, DocTranslateError, OcrError, TranslateError};
pub use language::{detect, DetectedLanguage, LanguageIdentifier, LinguaIdentifier};
pub use output::{
    ExtractedSegment, InspectReport, OutcomeStatus, Provenance, TranslatedDocument,
    TranslationOutcome, TranslationOutput, TRANSLATION_FAILED,
};
pub use pipeline::assemble::{DocumentWriter, DocxWriter, PlainTextWriter};
pub use pipeline::ocr::{OcrEngine, TesseractOcr, VisionOcr};
pub use pipeline::pdf::{PdfLoader, PdfiumLoader};
pub use pipeline::translate::{translate, Translator};
pub use progress::{PipelineProgressCallback, Stage};
