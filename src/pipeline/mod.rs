//! Pipeline stages for document translation.
//!
//! Each submodule implements one step, and every external capability sits
//! behind a trait so the stages can be tested with in-memory fakes.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ pdf/ocr ──▶ extract ──▶ detect ──▶ translate ──▶ assemble
//! (path/URL) (pdfium,    (segments)  (lingua)   (LLM, retry,  (docx/txt)
//!            tesseract)                          page fallback)
//! ```
//!
//! 1. [`input`]  — read a local path or download a URL into a validated
//!    [`crate::document::SourceDocument`]
//! 2. [`pdf`]    — split a PDF into pages (text layer + embedded images); runs
//!    in `spawn_blocking` because pdfium is not async-safe
//! 3. [`ocr`]    — tesseract or vision-model OCR; never fails
//! 4. [`extract`] — turn the document into ordered segments, OCR'ing pages
//!    according to the configured trigger
//! 5. [`translate`] — retry/backoff orchestration, passthrough, and the
//!    page-level fallback; [`llm`] is the shipped translator
//! 6. [`postprocess`] — deterministic cleanup of model and OCR output
//! 7. [`assemble`] — single-paragraph document and the docx/txt writers

pub mod assemble;
pub mod encode;
pub mod extract;
pub mod input;
pub mod llm;
pub mod ocr;
pub mod pdf;
pub mod postprocess;
pub mod translate;
