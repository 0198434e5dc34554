//! Translation orchestration: retries, passthrough and the page-level fallback.
//!
//! [`translate`] never fails. Every path ends in a [`TranslationOutcome`]:
//!
//! ```text
//! blank text ─────────────────────────────▶ degraded (0 calls)
//! detected == destination ────────────────▶ succeeded, text unchanged (0 calls)
//! call ─┬─ Ok(text) ──────────────────────▶ succeeded
//!       ├─ Err(Permanent) ────────────────▶ degraded
//!       └─ Err(Transient) / timeout ─ retry until max_attempts, then degraded
//! ```
//!
//! ## Retry Strategy
//!
//! Backoff doubles per retry (`retry_backoff_ms * 2^(attempt-1)`): with the
//! 500 ms default and 3 attempts the waits are 500 ms then 1 s. Each call is
//! bounded by the configured API timeout, and an elapsed timeout is retried
//! like any other transient failure.

use crate::config::PipelineConfig;
use crate::document::Page;
use crate::error::TranslateError;
use crate::language::{detect, DetectedLanguage, LanguageIdentifier};
use crate::output::{PageTranslation, TranslationOutcome};
use crate::pipeline::extract::ocr_page_images;
use crate::pipeline::ocr::OcrEngine;
use crate::progress::PipelineProgressCallback;
use async_trait::async_trait;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, info, warn};

/// Source code sent when the source language could not be identified.
pub const AUTO_SOURCE_CODE: &str = "auto";

/// Translation capability.
///
/// Implementations make exactly one attempt per call; retrying is the
/// orchestrator's job. Failures must say whether they are worth retrying.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` (ISO code or `"auto"`) into
    /// `destination` (ISO code).
    async fn translate(
        &self,
        text: &str,
        source: &str,
        destination: &str,
    ) -> Result<String, TranslateError>;
}

/// Attempt budget, backoff and per-call timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_ms: u64,
    pub call_timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff_ms: config.retry_backoff_ms,
            call_timeout: Duration::from_secs(config.api_timeout_secs),
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_ms.saturating_mul(2u64.saturating_pow(attempt - 1)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

/// Translate `text` into `destination`. Never fails; see the module docs.
pub async fn translate(
    translator: &dyn Translator,
    text: &str,
    source: DetectedLanguage,
    destination: &str,
    policy: &RetryPolicy,
    progress: &dyn PipelineProgressCallback,
) -> TranslationOutcome {
    if text.trim().is_empty() {
        debug!("Nothing to translate; returning degraded outcome");
        return TranslationOutcome::degraded(0);
    }

    if source.matches_code(destination) {
        info!("Source is already {}; skipping translation", source);
        return TranslationOutcome::succeeded(text, 0);
    }

    let source_code = source.code().unwrap_or(AUTO_SOURCE_CODE);
    let mut attempts = 0;

    while attempts < policy.max_attempts {
        if attempts > 0 {
            let wait = policy.backoff(attempts);
            warn!(
                "Translation retry {}/{} after {:?}",
                attempts + 1,
                policy.max_attempts,
                wait
            );
            sleep(wait).await;
        }
        attempts += 1;
        progress.on_translation_attempt(attempts, policy.max_attempts);

        let result = match timeout(
            policy.call_timeout,
            translator.translate(text, source_code, destination),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(TranslateError::transient(format!(
                "timed out after {}s",
                policy.call_timeout.as_secs()
            ))),
        };

        match result {
            Ok(translated) => {
                debug!(
                    "Translated {} → {} chars on attempt {}",
                    text.chars().count(),
                    translated.chars().count(),
                    attempts
                );
                return TranslationOutcome::succeeded(translated, attempts);
            }
            Err(e) if e.is_transient() => {
                warn!("Translation attempt {} failed: {}", attempts, e);
            }
            Err(e) => {
                warn!("Translation attempt {} failed, not retrying: {}", attempts, e);
                return TranslationOutcome::degraded(attempts);
            }
        }
    }

    warn!("Translation failed after {} attempts", attempts);
    TranslationOutcome::degraded(attempts)
}

/// Collaborators the page-level fallback needs.
pub struct FallbackContext<'a> {
    pub ocr: &'a dyn OcrEngine,
    pub languages: &'a str,
    pub identifier: &'a dyn LanguageIdentifier,
    pub translator: &'a dyn Translator,
    pub policy: &'a RetryPolicy,
    pub progress: &'a dyn PipelineProgressCallback,
}

/// Re-walk `pages` ignoring their native text: OCR each page's images, then
/// detect and translate every page that produced text, in page order.
///
/// Returns the per-page results and the number of OCR calls made.
pub async fn page_fallback(
    pages: &[Page],
    destination: &str,
    ctx: &FallbackContext<'_>,
) -> (Vec<PageTranslation>, usize) {
    let mut results = Vec::new();
    let mut ocr_calls = 0;

    for page in pages {
        ocr_calls += page.images.len();
        let text = ocr_page_images(page, ctx.ocr, ctx.languages).await;
        if text.trim().is_empty() {
            debug!("Fallback: page {} has no OCR text, skipping", page.index + 1);
            continue;
        }

        let detected = detect(ctx.identifier, &text);
        let outcome = translate(
            ctx.translator,
            &text,
            detected,
            destination,
            ctx.policy,
            ctx.progress,
        )
        .await;
        info!(
            "Fallback: page {} ({}) → {:?}",
            page.index + 1,
            detected,
            outcome.status
        );

        results.push(PageTranslation {
            page_index: page.index,
            detected_language: detected,
            outcome,
        });
    }

    (results, ocr_calls)
}
