//! LLM-backed translation: one chat completion per call.
//!
//! This module is intentionally thin. Prompt wording lives in
//! [`crate::prompts`], retries and timeouts in [`crate::pipeline::translate`].
//! The only policy here is deciding which provider errors are worth retrying.
//!
//! ## Message Layout
//!
//! 1. **System message** — the translation prompt with source and destination
//!    filled in (or the user-supplied override)
//! 2. **User message** — the text to translate, verbatim

use crate::config::PipelineConfig;
use crate::error::TranslateError;
use crate::pipeline::postprocess::clean_translation;
use crate::pipeline::translate::Translator;
use crate::prompts::{translation_prompt, DEFAULT_TRANSLATION_PROMPT};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

/// [`Translator`] that asks a chat model for the translation.
pub struct LlmTranslator {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
    system_prompt: Option<String>,
}

impl LlmTranslator {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &PipelineConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
            system_prompt: config.system_prompt.clone(),
        }
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        destination: &str,
    ) -> Result<String, TranslateError> {
        let template = self
            .system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_TRANSLATION_PROMPT);
        let messages = vec![
            ChatMessage::system(translation_prompt(template, source, destination)),
            ChatMessage::user(text),
        ];

        let response = self
            .provider
            .chat(&messages, Some(&self.options))
            .await
            .map_err(|e| classify_provider_error(&e.to_string()))?;

        debug!(
            "{} → {}: {} input tokens, {} output tokens",
            source, destination, response.prompt_tokens, response.completion_tokens
        );

        Ok(clean_translation(&response.content))
    }
}

/// Build `CompletionOptions` from the pipeline config.
fn build_options(config: &PipelineConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

static RE_TRANSIENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(429|500|502|503|504)\b|rate.?limit|too many requests|overloaded|temporarily unavailable|service unavailable|timed? ?out|connection|network",
    )
    .expect("valid regex")
});

/// Sort a provider error message into transient or permanent.
///
/// Providers surface HTTP status and transport failures only as text, so the
/// message is matched against the known retryable conditions: rate limiting,
/// 5xx and overload, timeouts, and connection failures. Anything else
/// (authentication, bad request, unsupported model) is permanent.
pub fn classify_provider_error(message: &str) -> TranslateError {
    if RE_TRANSIENT.is_match(message) {
        TranslateError::transient(message)
    } else {
        TranslateError::permanent(message)
    }
}
