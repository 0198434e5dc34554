//! Per-request context threaded through the pipeline.
//!
//! Everything a request needs to remember lives here and is passed by
//! reference; the pipeline keeps no global or session state.

use crate::error::DocTranslateError;
use crate::language::normalize_language_code;
use std::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Uuid,
    destination: String,
    started: Instant,
}

impl RequestContext {
    /// Start a request translating into `destination` (validated and
    /// lower-cased).
    pub fn new(destination: &str) -> Result<Self, DocTranslateError> {
        Ok(Self {
            request_id: Uuid::new_v4(),
            destination: normalize_language_code(destination)?,
            started: Instant::now(),
        })
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Artifact file name for this request: `translated-<request_id>.<ext>`.
    pub fn artifact_name(&self, extension: &str) -> String {
        format!("translated-{}.{}", self.request_id, extension)
    }
}
