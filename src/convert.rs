//! Top-level translation entry points.
//!
//! A [`Pipeline`] owns the resolved capabilities (translator, OCR engine,
//! language identifier, PDF loader, document writer) and runs one request at a
//! time through extract → detect → translate → assemble. It holds no
//! per-request state, so one pipeline can be shared across concurrent
//! requests (the server does exactly that).
//!
//! The free functions ([`translate_upload`], [`translate_file`], …) validate
//! their input first and only then build a pipeline, so a rejected upload
//! never touches any capability.

use crate::config::{OcrBackend, PipelineConfig};
use crate::context::RequestContext;
use crate::document::{DocumentKind, SourceDocument};
use crate::error::DocTranslateError;
use crate::language::{detect, LanguageIdentifier, LinguaIdentifier};
use crate::output::{
    joined_text, InspectReport, OutcomeStatus, PipelineStats, TranslatedDocument,
    TranslationOutcome, TranslationOutput,
};
use crate::pipeline::assemble::{assemble, writer_for, DocumentWriter};
use crate::pipeline::extract::{extract, ExtractOptions};
use crate::pipeline::input;
use crate::pipeline::llm::LlmTranslator;
use crate::pipeline::ocr::{OcrEngine, TesseractOcr, VisionOcr};
use crate::pipeline::pdf::{PdfLoader, PdfiumLoader};
use crate::pipeline::translate::{page_fallback, translate, FallbackContext, RetryPolicy, Translator};
use crate::progress::{NoopProgressCallback, PipelineProgressCallback, Stage};
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Default model when a provider is named without one.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Resolved capabilities plus the config they were built from.
pub struct Pipeline {
    config: PipelineConfig,
    translator: Arc<dyn Translator>,
    ocr: Arc<dyn OcrEngine>,
    identifier: Arc<dyn LanguageIdentifier>,
    pdf_loader: Arc<dyn PdfLoader>,
    writer: Arc<dyn DocumentWriter>,
    progress: Arc<dyn PipelineProgressCallback>,
}

impl Pipeline {
    /// Resolve every capability slot the config leaves empty.
    ///
    /// An LLM provider is only resolved when something needs one: the
    /// translator, or vision OCR.
    pub fn from_config(config: PipelineConfig) -> Result<Self, DocTranslateError> {
        let needs_provider = config.translator.is_none()
            || (config.ocr_engine.is_none() && config.ocr_backend == OcrBackend::Vision);
        let provider = if needs_provider {
            Some(resolve_provider(&config)?)
        } else {
            None
        };

        let translator: Arc<dyn Translator> = match (&config.translator, &provider) {
            (Some(t), _) => Arc::clone(t),
            (None, Some(p)) => Arc::new(LlmTranslator::new(Arc::clone(p), &config)),
            (None, None) => {
                return Err(DocTranslateError::Internal(
                    "no translator could be resolved".into(),
                ))
            }
        };

        let ocr: Arc<dyn OcrEngine> = match (&config.ocr_engine, config.ocr_backend, &provider) {
            (Some(engine), _, _) => Arc::clone(engine),
            (None, OcrBackend::Vision, Some(p)) => Arc::new(VisionOcr::new(
                Arc::clone(p),
                config.max_tokens,
                config.ocr_timeout_secs,
            )),
            _ => Arc::new(TesseractOcr::new(
                config.tesseract_path.clone(),
                config.ocr_timeout_secs,
            )),
        };

        let identifier = config
            .language_identifier
            .clone()
            .unwrap_or_else(|| Arc::new(LinguaIdentifier::new()));
        let pdf_loader = config
            .pdf_loader
            .clone()
            .unwrap_or_else(|| Arc::new(PdfiumLoader));
        let writer = config
            .document_writer
            .clone()
            .unwrap_or_else(|| writer_for(config.output_format));
        let progress = config
            .progress_callback
            .clone()
            .unwrap_or_else(NoopProgressCallback::arc);

        debug!("Pipeline ready: {:?}", config);

        Ok(Self {
            config,
            translator,
            ocr,
            identifier,
            pdf_loader,
            writer,
            progress,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Translate a validated document into `destination`.
    ///
    /// # Errors
    /// Only fatal errors: invalid destination code, unreadable PDF, or a
    /// writer failure. Translation failures end in a degraded outcome.
    pub async fn run(
        &self,
        doc: &SourceDocument,
        destination: &str,
    ) -> Result<TranslationOutput, DocTranslateError> {
        let ctx = RequestContext::new(destination)?;
        self.run_with_context(doc, &ctx).await
    }

    /// [`Pipeline::run`] with a caller-created context.
    pub async fn run_with_context(
        &self,
        doc: &SourceDocument,
        ctx: &RequestContext,
    ) -> Result<TranslationOutput, DocTranslateError> {
        let config = &self.config;
        let progress = self.progress.as_ref();
        let policy = RetryPolicy::from_config(config);
        info!(
            "[{}] Translating {} '{}' → {}",
            ctx.request_id(),
            doc.kind(),
            doc.filename(),
            ctx.destination()
        );

        // ── Step 1: Extract ──────────────────────────────────────────────────
        progress.on_stage(Stage::Extracting);
        let extract_start = Instant::now();
        let extraction = extract(
            doc,
            self.pdf_loader.as_ref(),
            self.ocr.as_ref(),
            ExtractOptions {
                languages: &config.ocr_languages,
                scope: config.fallback_scope,
                password: config.password.as_deref(),
            },
            progress,
        )
        .await?;
        let extraction_duration_ms = extract_start.elapsed().as_millis() as u64;
        let text = joined_text(&extraction.segments);
        info!(
            "[{}] Extracted {} segments, {} chars in {}ms",
            ctx.request_id(),
            extraction.segments.len(),
            text.chars().count(),
            extraction_duration_ms
        );

        // ── Step 2: Detect ───────────────────────────────────────────────────
        progress.on_stage(Stage::Detecting);
        let detected = detect(self.identifier.as_ref(), &text);
        progress.on_language_detected(detected);
        info!("[{}] Detected language: {}", ctx.request_id(), detected);

        // ── Step 3: Translate ────────────────────────────────────────────────
        progress.on_stage(Stage::Translating);
        let translate_start = Instant::now();
        let mut outcome = translate(
            self.translator.as_ref(),
            &text,
            detected,
            ctx.destination(),
            &policy,
            progress,
        )
        .await;

        // ── Step 4: Page-level fallback ──────────────────────────────────────
        let mut ocr_calls = extraction.ocr_calls;
        let mut page_translations = Vec::new();
        let fallback_armed = outcome.text.is_empty()
            && doc.kind() == DocumentKind::Pdf
            && config.page_fallback;

        let document = if fallback_armed {
            info!(
                "[{}] Whole-document translation came back empty; translating page by page",
                ctx.request_id()
            );
            progress.on_stage(Stage::PageFallback);
            let (pages, calls) = page_fallback(
                &extraction.pages,
                ctx.destination(),
                &FallbackContext {
                    ocr: self.ocr.as_ref(),
                    languages: &config.ocr_languages,
                    identifier: self.identifier.as_ref(),
                    translator: self.translator.as_ref(),
                    policy: &policy,
                    progress,
                },
            )
            .await;
            ocr_calls += calls;

            let attempts =
                outcome.attempts + pages.iter().map(|p| p.outcome.attempts).sum::<u32>();
            outcome = if pages.iter().any(|p| !p.outcome.is_degraded()) {
                let joined = TranslatedDocument::from_outcomes(pages.iter().map(|p| &p.outcome));
                TranslationOutcome {
                    text: joined.text,
                    status: OutcomeStatus::Succeeded,
                    attempts,
                }
            } else {
                // No page yielded text, or every page degraded.
                warn!(
                    "[{}] Page fallback produced no translation",
                    ctx.request_id()
                );
                TranslationOutcome::degraded(attempts)
            };
            page_translations = pages;
            TranslatedDocument {
                text: outcome.text.clone(),
            }
        } else {
            TranslatedDocument {
                text: outcome.text.clone(),
            }
        };
        let translation_duration_ms = translate_start.elapsed().as_millis() as u64;

        // ── Step 5: Assemble ─────────────────────────────────────────────────
        progress.on_stage(Stage::Assembling);
        let artifact = self.writer.write(&assemble(&document.text), ctx)?;

        let stats = PipelineStats {
            segments: extraction.segments.len(),
            ocr_calls,
            translation_attempts: outcome.attempts,
            extraction_duration_ms,
            translation_duration_ms,
            total_duration_ms: ctx.elapsed_ms(),
        };

        info!(
            "[{}] Done: {:?}, {} attempts, {}ms total",
            ctx.request_id(),
            outcome.status,
            stats.translation_attempts,
            stats.total_duration_ms
        );
        progress.on_complete(outcome.status);

        Ok(TranslationOutput {
            request_id: ctx.request_id(),
            file_kind: doc.kind(),
            destination: ctx.destination().to_string(),
            detected_language: detected,
            segments: extraction.segments,
            outcome,
            page_fallback_used: fallback_armed,
            page_translations,
            document,
            artifact,
            stats,
        })
    }
}

/// Translate an uploaded file (bytes + filename).
///
/// `filename` is `None` when the request carried no file at all.
///
/// # Errors
/// Input validation errors are returned before any capability is built or
/// invoked; see [`SourceDocument::from_upload`].
pub async fn translate_upload(
    filename: Option<&str>,
    bytes: impl Into<Vec<u8>>,
    destination: &str,
    config: &PipelineConfig,
) -> Result<TranslationOutput, DocTranslateError> {
    let doc = SourceDocument::from_upload(filename, bytes)?;
    let ctx = RequestContext::new(destination)?;
    let pipeline = Pipeline::from_config(config.clone())?;
    pipeline.run_with_context(&doc, &ctx).await
}

/// Translate a local file or HTTP(S) URL.
///
/// This is the primary entry point for the library.
///
/// # Example
/// ```rust,no_run
/// use edgequake_doctranslate::{translate_file, PipelineConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PipelineConfig::default();
/// let output = translate_file("notice.pdf", "ta", &config).await?;
/// println!("{} → {}", output.detected_language, output.document.text);
/// # Ok(())
/// # }
/// ```
pub async fn translate_file(
    input_str: impl AsRef<str>,
    destination: &str,
    config: &PipelineConfig,
) -> Result<TranslationOutput, DocTranslateError> {
    let ctx = RequestContext::new(destination)?;
    let doc = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    let pipeline = Pipeline::from_config(config.clone())?;
    pipeline.run_with_context(&doc, &ctx).await
}

/// Translate and write the artifact directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn translate_to_file(
    input_str: impl AsRef<str>,
    destination: &str,
    output_path: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<TranslationOutput, DocTranslateError> {
    let output = translate_file(input_str, destination, config).await?;
    write_atomic(output_path.as_ref(), &output.artifact.bytes).await?;
    Ok(output)
}

/// Synchronous wrapper around [`translate_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn translate_sync(
    input_str: impl AsRef<str>,
    destination: &str,
    config: &PipelineConfig,
) -> Result<TranslationOutput, DocTranslateError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DocTranslateError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(translate_file(input_str, destination, config))
}

/// Classify an input and, for PDFs, count pages, text layers and images.
///
/// Does not require an LLM provider, OCR engine or API key.
pub async fn inspect(
    input_str: impl AsRef<str>,
    config: &PipelineConfig,
) -> Result<InspectReport, DocTranslateError> {
    let doc = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;

    let mut report = InspectReport {
        file_name: doc.filename().to_string(),
        file_kind: doc.kind(),
        size_bytes: doc.bytes().len(),
        page_count: None,
        pages_with_text: None,
        image_count: None,
    };

    if doc.kind() == DocumentKind::Pdf {
        let loader = config
            .pdf_loader
            .clone()
            .unwrap_or_else(|| Arc::new(PdfiumLoader));
        let pages = loader
            .load(doc.filename(), doc.bytes(), config.password.as_deref())
            .await?;
        report.page_count = Some(pages.len());
        report.pages_with_text = Some(
            pages
                .iter()
                .filter(|p| !p.native_text.trim().is_empty())
                .count(),
        );
        report.image_count = Some(pages.iter().map(|p| p.images.len()).sum());
    }

    Ok(report)
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DocTranslateError> {
    let write_err = |source| DocTranslateError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, DocTranslateError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        DocTranslateError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider + model** (`config.provider_name`), model defaulting
///    to [`DEFAULT_MODEL`]. The factory reads the matching API key.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`),
///    only when both are set.
/// 4. **OpenAI** when `OPENAI_API_KEY` is set.
/// 5. **Full auto-detection** (`ProviderFactory::from_env`).
pub fn resolve_provider(config: &PipelineConfig) -> Result<Arc<dyn LLMProvider>, DocTranslateError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| DocTranslateError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
