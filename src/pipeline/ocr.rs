//! OCR engines: turn image bytes into text.
//!
//! The [`OcrEngine`] contract never fails: an engine that cannot read an
//! image (missing binary, corrupt image, timeout, model error) logs a warning
//! and reports an empty string, which the extractor treats as "no text".
//!
//! Two engines ship with the crate:
//!
//! * [`TesseractOcr`] runs the `tesseract` CLI on a temp file. One call with a
//!   combined language set such as `eng+hin+tam` covers all three scripts.
//! * [`VisionOcr`] asks a vision-capable chat model to transcribe the image.

use crate::error::OcrError;
use crate::pipeline::encode::to_image_data;
use crate::pipeline::postprocess::clean_ocr_text;
use crate::prompts::VISION_OCR_PROMPT;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// OCR capability.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Extract text from an encoded image (PNG or JPEG) using the given
    /// `+`-separated language set. Returns `""` when nothing can be read.
    async fn recognize(&self, image: &[u8], languages: &str) -> String;
}

// ── Tesseract ────────────────────────────────────────────────────────────────

/// [`OcrEngine`] backed by the `tesseract` executable.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    program: String,
    timeout: Duration,
}

impl TesseractOcr {
    pub fn new(program: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            program: program.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    async fn run(&self, image: &[u8], languages: &str) -> Result<String, OcrError> {
        let input = tempfile::Builder::new()
            .prefix("doctranslate-ocr-")
            .tempfile()
            .map_err(|e| OcrError::Input(format!("failed to create temp file: {e}")))?;
        tokio::fs::write(input.path(), image)
            .await
            .map_err(|e| OcrError::Input(format!("failed to write temp file: {e}")))?;

        let child = Command::new(&self.program)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(languages)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| OcrError::Launch {
                program: self.program.clone(),
                source,
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| OcrError::Timeout {
                secs: self.timeout.as_secs(),
            })?
            .map_err(|source| OcrError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new("tesseract", 120)
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, image: &[u8], languages: &str) -> String {
        match self.run(image, languages).await {
            Ok(raw) => {
                let text = clean_ocr_text(&raw);
                debug!("tesseract [{}] → {} chars", languages, text.chars().count());
                text
            }
            Err(e) => {
                warn!("OCR failed, treating image as empty: {}", e);
                String::new()
            }
        }
    }
}

// ── Vision model ─────────────────────────────────────────────────────────────

/// [`OcrEngine`] backed by a vision-capable LLM.
///
/// The language set is not forwarded; the prompt already names the scripts
/// the model should expect.
pub struct VisionOcr {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
    timeout: Duration,
}

impl VisionOcr {
    pub fn new(provider: Arc<dyn LLMProvider>, max_tokens: usize, timeout_secs: u64) -> Self {
        Self {
            provider,
            options: CompletionOptions {
                temperature: Some(0.0),
                max_tokens: Some(max_tokens),
                ..Default::default()
            },
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    async fn run(&self, image: &[u8]) -> Result<String, OcrError> {
        let image_data = to_image_data(image).map_err(|e| OcrError::Input(e.to_string()))?;
        let messages = vec![
            ChatMessage::system(VISION_OCR_PROMPT),
            ChatMessage::user_with_images("", vec![image_data]),
        ];

        let response = tokio::time::timeout(
            self.timeout,
            self.provider.chat(&messages, Some(&self.options)),
        )
        .await
        .map_err(|_| OcrError::Timeout {
            secs: self.timeout.as_secs(),
        })?
        .map_err(|e| OcrError::Vision(e.to_string()))?;

        debug!(
            "vision OCR: {} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}

#[async_trait]
impl OcrEngine for VisionOcr {
    async fn recognize(&self, image: &[u8], _languages: &str) -> String {
        match self.run(image).await {
            Ok(raw) => clean_ocr_text(&raw),
            Err(e) => {
                warn!("OCR failed, treating image as empty: {}", e);
                String::new()
            }
        }
    }
}
