//! Error types for the edgequake-doctranslate library.
//!
//! Errors are split by how far they are allowed to travel:
//!
//! * [`DocTranslateError`] — **Fatal**: the request cannot be processed at all
//!   (no file, disallowed extension, unreadable PDF, provider not configured).
//!   Returned as `Err(DocTranslateError)` from the top-level `translate_*`
//!   functions. Input-validation variants are raised before any extraction.
//!
//! * [`TranslateError`] — **Non-fatal**: one call to the translation
//!   capability failed. The orchestrator retries transient failures and turns
//!   the rest into a degraded [`crate::output::TranslationOutcome`]; this type
//!   never escapes the pipeline.
//!
//! * [`DetectError`] and [`OcrError`] — capability failures that are recovered
//!   to `"Unknown"` and an empty string respectively.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-doctranslate library.
#[derive(Debug, Error)]
pub enum DocTranslateError {
    // ── Input validation ──────────────────────────────────────────────────
    /// The upload carried no file part at all.
    #[error("No file part in the request")]
    NoFileProvided,

    /// A file part was present but no file was selected (empty filename).
    #[error("No selected file")]
    EmptySelection,

    /// The filename's extension is not in the allow-list.
    #[error("File type not allowed: '{filename}'\nSupported extensions: txt, pdf, png, jpg, jpeg")]
    UnsupportedFileType { filename: String },

    /// The destination language code is empty or not an ISO-639 style code.
    #[error("Invalid destination language code '{code}'\nUse a two- or three-letter ISO-639 code such as 'ta' or 'hi'.")]
    InvalidLanguageCode { code: String },

    // ── Input resolution ──────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is neither a file path nor a valid URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The file has a `.pdf` extension but does not start with `%PDF`.
    #[error("File is not a valid PDF: '{filename}'\nFirst bytes: {magic:?}")]
    NotAPdf { filename: String, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{filename}' is corrupt: {detail}")]
    CorruptPdf { filename: String, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{filename}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { filename: String },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{filename}'")]
    WrongPassword { filename: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Provider errors ───────────────────────────────────────────────────
    /// The configured LLM provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the translated artifact.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocTranslateError {
    /// `true` for errors caused by what the caller sent, raised before any
    /// extraction runs. The server maps these to HTTP 400.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::NoFileProvided
                | Self::EmptySelection
                | Self::UnsupportedFileType { .. }
                | Self::InvalidLanguageCode { .. }
                | Self::InvalidInput { .. }
                | Self::NotAPdf { .. }
        )
    }

    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoFileProvided => "NO_FILE_PROVIDED",
            Self::EmptySelection => "EMPTY_SELECTION",
            Self::UnsupportedFileType { .. } => "UNSUPPORTED_FILE_TYPE",
            Self::InvalidLanguageCode { .. } => "INVALID_LANGUAGE_CODE",
            Self::FileNotFound { .. } => "FILE_NOT_FOUND",
            Self::PermissionDenied { .. } => "PERMISSION_DENIED",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::DownloadFailed { .. } => "DOWNLOAD_FAILED",
            Self::DownloadTimeout { .. } => "DOWNLOAD_TIMEOUT",
            Self::NotAPdf { .. } => "NOT_A_PDF",
            Self::CorruptPdf { .. } => "CORRUPT_PDF",
            Self::PasswordRequired { .. } => "PASSWORD_REQUIRED",
            Self::WrongPassword { .. } => "WRONG_PASSWORD",
            Self::PdfiumBindingFailed(_) => "PDFIUM_UNAVAILABLE",
            Self::ProviderNotConfigured { .. } => "PROVIDER_NOT_CONFIGURED",
            Self::OutputWriteFailed { .. } => "OUTPUT_WRITE_FAILED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// A failed call to the translation capability.
///
/// Only [`TranslateError::Transient`] is retried.
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TranslateError {
    /// Worth retrying: rate limit, upstream overload, dropped connection, timeout.
    #[error("transient translation failure: {reason}")]
    Transient { reason: String },

    /// Not worth retrying: bad credentials, invalid request, unsupported pair.
    #[error("permanent translation failure: {reason}")]
    Permanent { reason: String },
}

impl TranslateError {
    pub fn transient(reason: impl Into<String>) -> Self {
        Self::Transient {
            reason: reason.into(),
        }
    }

    pub fn permanent(reason: impl Into<String>) -> Self {
        Self::Permanent {
            reason: reason.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// The language-identification capability could not name a language.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DetectError {
    /// Input had no letters to work with (empty, whitespace, digits only).
    #[error("no features in text")]
    NoFeatures,

    /// The identifier ran but could not settle on one language.
    #[error("language could not be identified reliably")]
    Inconclusive,
}

/// An OCR engine failed. Engines log this and report empty text instead.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The engine binary could not be started.
    #[error("failed to launch OCR engine '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran but exited unsuccessfully.
    #[error("OCR engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    /// The engine did not finish within the configured timeout.
    #[error("OCR timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Image could not be staged or decoded.
    #[error("OCR input error: {0}")]
    Input(String),

    /// The vision model call failed.
    #[error("vision OCR call failed: {0}")]
    Vision(String),
}
