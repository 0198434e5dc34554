//! Configuration types for document translation.
//!
//! All pipeline behaviour is controlled through [`PipelineConfig`], built via
//! its [`PipelineConfigBuilder`]. Every knob lives in one struct so a config
//! can be shared across requests, logged, and diffed between runs.
//!
//! Besides plain settings the config can carry pre-built capabilities
//! (translator, OCR engine, language identifier, PDF loader, document
//! writer). Each one left unset is resolved to the shipped default when the
//! pipeline is created; tests use these slots to inject fakes.

use crate::error::DocTranslateError;
use crate::language::LanguageIdentifier;
use crate::pipeline::assemble::DocumentWriter;
use crate::pipeline::ocr::OcrEngine;
use crate::pipeline::pdf::PdfLoader;
use crate::pipeline::translate::Translator;
use crate::progress::PipelineProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Tesseract language set covering Latin, Devanagari and Tamil scripts.
pub const DEFAULT_OCR_LANGUAGES: &str = "eng+hin+tam";

/// Shared handle to a progress callback.
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;

/// Configuration for a translation request.
///
/// Built via [`PipelineConfig::builder()`] or using [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_doctranslate::{OcrFallbackScope, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .max_attempts(3)
///     .fallback_scope(OcrFallbackScope::PerPage)
///     .model("gpt-4.1-nano")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// LLM model identifier used for translation (and vision OCR).
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for translation calls. Default: 0.1.
    ///
    /// Translation should be faithful, not creative.
    pub temperature: f32,

    /// Maximum tokens the model may generate per translation call. Default: 4096.
    pub max_tokens: usize,

    /// Total attempts against the translation capability, including the
    /// first. Default: 3.
    ///
    /// Only transient failures are retried; permanent failures stop after
    /// the first attempt.
    pub max_attempts: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-translation-call timeout in seconds. Default: 60.
    ///
    /// An elapsed timeout counts as a transient failure.
    pub api_timeout_secs: u64,

    /// Per-image OCR timeout in seconds. Default: 120.
    pub ocr_timeout_secs: u64,

    /// Which OCR engine to run. Default: [`OcrBackend::Tesseract`].
    pub ocr_backend: OcrBackend,

    /// Script/language set passed to the OCR engine. Default: `eng+hin+tam`.
    pub ocr_languages: String,

    /// Tesseract executable. Default: `tesseract` (looked up on `PATH`).
    pub tesseract_path: String,

    /// When PDF pages are OCR'd during extraction. Default: [`OcrFallbackScope::Cumulative`].
    pub fallback_scope: OcrFallbackScope,

    /// Run the page-level fallback when whole-document translation comes back
    /// as an empty string (whitespace-only replies do not count). Default: true.
    pub page_fallback: bool,

    /// Artifact format. Default: [`OutputFormat::Docx`].
    pub output_format: OutputFormat,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Custom translation system prompt. If None, uses the built-in default.
    pub system_prompt: Option<String>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional per-stage progress callback.
    pub progress_callback: Option<ProgressCallback>,

    /// Pre-built translation capability. Overrides the LLM provider chain.
    pub translator: Option<Arc<dyn Translator>>,

    /// Pre-built OCR engine. Overrides `ocr_backend`.
    pub ocr_engine: Option<Arc<dyn OcrEngine>>,

    /// Pre-built language identifier. Default: lingua.
    pub language_identifier: Option<Arc<dyn LanguageIdentifier>>,

    /// Pre-built PDF loader. Default: pdfium.
    pub pdf_loader: Option<Arc<dyn PdfLoader>>,

    /// Pre-built document writer. Overrides `output_format`.
    pub document_writer: Option<Arc<dyn DocumentWriter>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.1,
            max_tokens: 4096,
            max_attempts: 3,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
            ocr_timeout_secs: 120,
            ocr_backend: OcrBackend::default(),
            ocr_languages: DEFAULT_OCR_LANGUAGES.to_string(),
            tesseract_path: "tesseract".to_string(),
            fallback_scope: OcrFallbackScope::default(),
            page_fallback: true,
            output_format: OutputFormat::default(),
            password: None,
            system_prompt: None,
            download_timeout_secs: 120,
            progress_callback: None,
            translator: None,
            ocr_engine: None,
            language_identifier: None,
            pdf_loader: None,
            document_writer: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = |set: bool| if set { "<custom>" } else { "<default>" };
        f.debug_struct("PipelineConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_attempts", &self.max_attempts)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("ocr_timeout_secs", &self.ocr_timeout_secs)
            .field("ocr_backend", &self.ocr_backend)
            .field("ocr_languages", &self.ocr_languages)
            .field("fallback_scope", &self.fallback_scope)
            .field("page_fallback", &self.page_fallback)
            .field("output_format", &self.output_format)
            .field("translator", &slot(self.translator.is_some()))
            .field("ocr_engine", &slot(self.ocr_engine.is_some()))
            .field("language_identifier", &slot(self.language_identifier.is_some()))
            .field("pdf_loader", &slot(self.pdf_loader.is_some()))
            .field("document_writer", &slot(self.document_writer.is_some()))
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn ocr_timeout_secs(mut self, secs: u64) -> Self {
        self.config.ocr_timeout_secs = secs;
        self
    }

    pub fn ocr_backend(mut self, backend: OcrBackend) -> Self {
        self.config.ocr_backend = backend;
        self
    }

    pub fn ocr_languages(mut self, langs: impl Into<String>) -> Self {
        self.config.ocr_languages = langs.into();
        self
    }

    pub fn tesseract_path(mut self, path: impl Into<String>) -> Self {
        self.config.tesseract_path = path.into();
        self
    }

    pub fn fallback_scope(mut self, scope: OcrFallbackScope) -> Self {
        self.config.fallback_scope = scope;
        self
    }

    pub fn page_fallback(mut self, v: bool) -> Self {
        self.config.page_fallback = v;
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    pub fn translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.config.translator = Some(translator);
        self
    }

    pub fn ocr_engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.config.ocr_engine = Some(engine);
        self
    }

    pub fn language_identifier(mut self, identifier: Arc<dyn LanguageIdentifier>) -> Self {
        self.config.language_identifier = Some(identifier);
        self
    }

    pub fn pdf_loader(mut self, loader: Arc<dyn PdfLoader>) -> Self {
        self.config.pdf_loader = Some(loader);
        self
    }

    pub fn document_writer(mut self, writer: Arc<dyn DocumentWriter>) -> Self {
        self.config.document_writer = Some(writer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, DocTranslateError> {
        let c = &self.config;
        if c.max_attempts == 0 {
            return Err(DocTranslateError::InvalidConfig(
                "max_attempts must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 || c.ocr_timeout_secs == 0 {
            return Err(DocTranslateError::InvalidConfig(
                "timeouts must be ≥ 1 second".into(),
            ));
        }
        if c.ocr_languages.trim().is_empty() {
            return Err(DocTranslateError::InvalidConfig(
                "ocr_languages must name at least one language".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// OCR engine selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackend {
    /// Local `tesseract` executable. (default)
    #[default]
    Tesseract,
    /// Vision-capable LLM via the configured provider.
    Vision,
}

/// Which text decides that a PDF page needs OCR during extraction.
///
/// | Scope | Page is OCR'd when… |
/// |-------|---------------------|
/// | `Cumulative` | the text accumulated over all pages so far is blank |
/// | `PerPage` | the page's own native text is blank |
///
/// `Cumulative` is the established behaviour: once any earlier page had
/// native text, later image-only pages are never OCR'd. `PerPage` OCRs those
/// pages too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OcrFallbackScope {
    #[default]
    Cumulative,
    PerPage,
}

/// Artifact format produced by the output assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Word document with a single paragraph. (default)
    #[default]
    Docx,
    /// UTF-8 plain text.
    Txt,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Txt => "txt",
        }
    }
}
