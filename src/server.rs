//! HTTP front end: upload a document, get JSON back, download the artifact.
//!
//! Endpoints:
//! - POST /translate        - multipart `file` + `language`; runs the pipeline
//! - GET  /download/:token  - the translated artifact as an attachment
//! - GET  /health           - liveness
//!
//! Input validation failures (no file, empty selection, disallowed extension,
//! bad language code) are answered with 400 before the pipeline is touched.
//! Everything after validation is fail-soft: a failed translation still
//! returns 200 with `status: "degraded"` and the sentinel text.

use crate::artifact::ArtifactStore;
use crate::convert::Pipeline;
use crate::document::SourceDocument;
use crate::error::DocTranslateError;
use crate::language::DetectedLanguage;
use crate::output::OutcomeStatus;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

// ── State ────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub artifacts: ArtifactStore,
}

impl AppState {
    pub fn new(pipeline: Pipeline, artifacts: ArtifactStore) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            artifacts,
        }
    }
}

// ── Error Response ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
}

/// Errors a handler can answer with.
#[derive(Debug)]
pub enum ApiError {
    Pipeline(DocTranslateError),
    UnknownToken(String),
    Multipart(String),
}

impl From<DocTranslateError> for ApiError {
    fn from(e: DocTranslateError) -> Self {
        Self::Pipeline(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, code) = match self {
            ApiError::Pipeline(e) => {
                let status = match &e {
                    e if e.is_input_error() => StatusCode::BAD_REQUEST,
                    DocTranslateError::CorruptPdf { .. }
                    | DocTranslateError::PasswordRequired { .. }
                    | DocTranslateError::WrongPassword { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string(), e.code())
            }
            ApiError::UnknownToken(token) => (
                StatusCode::NOT_FOUND,
                format!("No artifact for token '{}'", token),
                "UNKNOWN_TOKEN",
            ),
            ApiError::Multipart(detail) => (
                StatusCode::BAD_REQUEST,
                format!("Malformed upload: {}", detail),
                "MALFORMED_UPLOAD",
            ),
        };

        let body = Json(ErrorResponse {
            error,
            code: code.to_string(),
        });
        (status, body).into_response()
    }
}

// ── Router ───────────────────────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/translate", post(translate_upload))
        .route("/download/:token", get(download))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub token: Uuid,
    pub file_type: String,
    pub detected_language: DetectedLanguage,
    pub status: OutcomeStatus,
    pub translated_text: String,
    pub page_fallback_used: bool,
    pub download_url: String,
}

/// POST /translate
async fn translate_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranslateResponse>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut language = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Multipart(e.to_string()))?
    {
        match field.name() {
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Multipart(e.to_string()))?;
                file = Some((name, bytes.to_vec()));
            }
            Some("language") => {
                language = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Multipart(e.to_string()))?;
            }
            _ => {}
        }
    }

    let doc = match file {
        Some((name, bytes)) => SourceDocument::from_upload(Some(&name), bytes)?,
        None => SourceDocument::from_upload(None, Vec::new())?,
    };

    let output = state.pipeline.run(&doc, &language).await?;
    let token = output.request_id;

    info!(
        token = %token,
        file_name = %doc.filename(),
        detected = %output.detected_language,
        status = ?output.outcome.status,
        "Translation complete"
    );

    state.artifacts.insert(token, output.artifact);

    Ok(Json(TranslateResponse {
        token,
        file_type: output.file_kind.label().to_string(),
        detected_language: output.detected_language,
        status: output.outcome.status,
        translated_text: output.document.text,
        page_fallback_used: output.page_fallback_used,
        download_url: format!("/download/{}", token),
    }))
}

/// GET /download/:token
async fn download(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, ApiError> {
    let artifact = Uuid::parse_str(&token)
        .ok()
        .and_then(|id| state.artifacts.get(&id))
        .ok_or_else(|| ApiError::UnknownToken(token.clone()))?;

    Ok((
        [
            (header::CONTENT_TYPE, artifact.media_type.clone()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", artifact.file_name),
            ),
        ],
        artifact.bytes.clone(),
    )
        .into_response())
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "artifacts": state.artifacts.len(),
    }))
}
