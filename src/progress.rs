//! Progress-callback trait for per-stage pipeline events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to observe a
//! request as it moves through extraction, detection and translation. The
//! CLI renders these events with a spinner; the server does not use them.
//!
//! # Example
//!
//! ```rust
//! use edgequake_doctranslate::{PipelineConfig, PipelineProgressCallback, Stage};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct PageCounter {
//!     pages: AtomicUsize,
//! }
//!
//! impl PipelineProgressCallback for PageCounter {
//!     fn on_page_extracted(&self, _page_index: usize, _chars: usize, _ocr: bool) {
//!         self.pages.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(PageCounter { pages: AtomicUsize::new(0) });
//! let config = PipelineConfig::builder()
//!     .progress_callback(counter as Arc<dyn PipelineProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::language::DetectedLanguage;
use crate::output::OutcomeStatus;
use std::fmt;
use std::sync::Arc;

/// Pipeline stages, in the order a request passes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extracting,
    Detecting,
    Translating,
    PageFallback,
    Assembling,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Extracting => "Extracting",
            Stage::Detecting => "Detecting",
            Stage::Translating => "Translating",
            Stage::PageFallback => "Page fallback",
            Stage::Assembling => "Assembling",
        };
        f.write_str(s)
    }
}

/// Called by the pipeline as a request progresses.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync` because one
/// callback may be shared by concurrent requests.
pub trait PipelineProgressCallback: Send + Sync {
    /// A new stage started.
    fn on_stage(&self, stage: Stage) {
        let _ = stage;
    }

    /// One PDF page (or the whole text/image document, index 0) was extracted.
    ///
    /// # Arguments
    /// * `page_index` — 0-based page index
    /// * `chars`      — characters extracted for the page
    /// * `ocr`        — whether OCR contributed to the page
    fn on_page_extracted(&self, page_index: usize, chars: usize, ocr: bool) {
        let _ = (page_index, chars, ocr);
    }

    /// Detection finished for the whole document.
    fn on_language_detected(&self, language: DetectedLanguage) {
        let _ = language;
    }

    /// A call to the translation capability is about to be made.
    ///
    /// # Arguments
    /// * `attempt`      — 1-based attempt number
    /// * `max_attempts` — configured attempt budget
    fn on_translation_attempt(&self, attempt: u32, max_attempts: u32) {
        let _ = (attempt, max_attempts);
    }

    /// The request finished (successfully or degraded).
    fn on_complete(&self, status: OutcomeStatus) {
        let _ = status;
    }
}

/// A no-op callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

impl NoopProgressCallback {
    pub fn arc() -> Arc<dyn PipelineProgressCallback> {
        Arc::new(Self)
    }
}
