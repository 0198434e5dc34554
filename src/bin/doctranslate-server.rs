//! HTTP server binary for edgequake-doctranslate.
//!
//! Configured from the environment:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DOCTRANSLATE_BIND` | `0.0.0.0:8080` |
//! | `DOCTRANSLATE_ARTIFACT_CAPACITY` | `256` |
//! | `DOCTRANSLATE_PROVIDER` / `DOCTRANSLATE_MODEL` | auto-detected |
//! | `DOCTRANSLATE_FORMAT` | `docx` |
//! | `DOCTRANSLATE_OCR` | `tesseract` |
//! | `DOCTRANSLATE_FALLBACK_SCOPE` | `cumulative` |
//! | `DOCTRANSLATE_TESSERACT_PATH` | `tesseract` |
//! | `DOCTRANSLATE_OCR_LANGUAGES` | `eng+hin+tam` |
//! | `DOCTRANSLATE_NO_PAGE_FALLBACK` | `false` |
//! | `DOCTRANSLATE_MAX_ATTEMPTS` | `3` |
//! | `DOCTRANSLATE_API_TIMEOUT` / `DOCTRANSLATE_OCR_TIMEOUT` | `60` / `120` seconds |
//! | `DOCTRANSLATE_SYSTEM_PROMPT` | built-in |
//! | `DOCTRANSLATE_LOW_ACCURACY_DETECTION` | `false` |
//!
//! The translation settings use the same variables as the `doctranslate` CLI.

use anyhow::{Context, Result};
use edgequake_doctranslate::artifact::{ArtifactStore, DEFAULT_CAPACITY};
use edgequake_doctranslate::server::{router, AppState};
use edgequake_doctranslate::{
    LinguaIdentifier, OcrBackend, OcrFallbackScope, OutputFormat, Pipeline, PipelineConfig,
};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

/// Looks up a non-blank configuration value by name.
type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(lookup: Lookup<'_>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(name)
        .map(|v| {
            v.trim()
                .parse()
                .with_context(|| format!("Invalid value for {name}: '{v}'"))
        })
        .transpose()
}

/// Parse a kebab/lower-case enum value the way serde names it.
fn env_enum<T: serde::de::DeserializeOwned>(lookup: Lookup<'_>, name: &str) -> Result<Option<T>> {
    lookup(name)
        .map(|v| {
            serde_json::from_value(serde_json::Value::String(v.trim().to_ascii_lowercase()))
                .with_context(|| format!("Invalid value for {name}: '{v}'"))
        })
        .transpose()
}

/// Boolean switch with the spellings clap accepts for `env` flags.
fn env_flag(lookup: Lookup<'_>, name: &str) -> Result<bool> {
    match lookup(name) {
        None => Ok(false),
        Some(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "y" | "on" => Ok(true),
            "0" | "false" | "no" | "n" | "off" => Ok(false),
            _ => anyhow::bail!("Invalid value for {name}: '{v}' (expected true/false)"),
        },
    }
}

fn build_config(lookup: Lookup<'_>) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder();

    if let Some(provider) = lookup("DOCTRANSLATE_PROVIDER") {
        builder = builder.provider_name(provider);
    }
    if let Some(model) = lookup("DOCTRANSLATE_MODEL") {
        builder = builder.model(model);
    }
    if let Some(format) = env_enum::<OutputFormat>(lookup, "DOCTRANSLATE_FORMAT")? {
        builder = builder.output_format(format);
    }
    if let Some(backend) = env_enum::<OcrBackend>(lookup, "DOCTRANSLATE_OCR")? {
        builder = builder.ocr_backend(backend);
    }
    if let Some(langs) = lookup("DOCTRANSLATE_OCR_LANGUAGES") {
        builder = builder.ocr_languages(langs);
    }
    if let Some(scope) = env_enum::<OcrFallbackScope>(lookup, "DOCTRANSLATE_FALLBACK_SCOPE")? {
        builder = builder.fallback_scope(scope);
    }
    if let Some(path) = lookup("DOCTRANSLATE_TESSERACT_PATH") {
        builder = builder.tesseract_path(path);
    }
    if env_flag(lookup, "DOCTRANSLATE_NO_PAGE_FALLBACK")? {
        builder = builder.page_fallback(false);
    }
    if let Some(n) = env_parse::<u32>(lookup, "DOCTRANSLATE_MAX_ATTEMPTS")? {
        builder = builder.max_attempts(n);
    }
    if let Some(secs) = env_parse::<u64>(lookup, "DOCTRANSLATE_API_TIMEOUT")? {
        builder = builder.api_timeout_secs(secs);
    }
    if let Some(secs) = env_parse::<u64>(lookup, "DOCTRANSLATE_OCR_TIMEOUT")? {
        builder = builder.ocr_timeout_secs(secs);
    }
    if let Some(prompt) = lookup("DOCTRANSLATE_SYSTEM_PROMPT") {
        builder = builder.system_prompt(prompt);
    }

    builder.build().context("Invalid configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let addr: SocketAddr = process_env("DOCTRANSLATE_BIND")
        .unwrap_or_else(|| "0.0.0.0:8080".to_string())
        .parse()
        .context("DOCTRANSLATE_BIND must be host:port")?;
    let capacity = env_parse::<usize>(&process_env, "DOCTRANSLATE_ARTIFACT_CAPACITY")?
        .unwrap_or(DEFAULT_CAPACITY);

    let mut config = build_config(&process_env)?;
    // Every request shares one detector; load its models before serving.
    let low_accuracy = env_flag(&process_env, "DOCTRANSLATE_LOW_ACCURACY_DETECTION")?;
    tracing::info!("Loading language models (low_accuracy={})", low_accuracy);
    config.language_identifier = Some(Arc::new(LinguaIdentifier::preloaded(low_accuracy)));

    let pipeline = Pipeline::from_config(config).context("Failed to set up pipeline")?;
    let app = router(AppState::new(pipeline, ArtifactStore::new(capacity)));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("doctranslate server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
