//! Input resolution: turn a user-supplied path or URL into a [`SourceDocument`].
//!
//! Uploads arrive at the server as bytes plus a filename and go straight to
//! [`SourceDocument::from_upload`]. The CLI and library entry points accept a
//! local path or an HTTP(S) URL instead; this module reads or downloads it and
//! runs it through the same validation, using the path's (or URL's) last
//! segment as the filename.

use crate::document::SourceDocument;
use crate::error::DocTranslateError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Read or download `input` and validate it as an upload.
pub async fn resolve_input(
    input: &str,
    timeout_secs: u64,
) -> Result<SourceDocument, DocTranslateError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(Path::new(input)).await
    }
}

async fn read_local(path: &Path) -> Result<SourceDocument, DocTranslateError> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    // Reject by extension before touching the file system.
    SourceDocument::from_upload(Some(&filename), Vec::new())?;

    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => DocTranslateError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => DocTranslateError::FileNotFound {
            path: PathBuf::from(path),
        },
    })?;

    debug!("Read local input: {} ({} bytes)", path.display(), bytes.len());
    SourceDocument::from_upload(Some(&filename), bytes)
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<SourceDocument, DocTranslateError> {
    let parsed = reqwest::Url::parse(url).map_err(|_| DocTranslateError::InvalidInput {
        input: url.to_string(),
    })?;
    let filename = filename_from_url(&parsed).ok_or_else(|| DocTranslateError::InvalidInput {
        input: url.to_string(),
    })?;

    // Same early rejection as for local files: no download for a .zip.
    SourceDocument::from_upload(Some(&filename), Vec::new())?;

    info!("Downloading document from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DocTranslateError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let map_send_err = |e: reqwest::Error| {
        if e.is_timeout() {
            DocTranslateError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            DocTranslateError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(parsed).send().await.map_err(map_send_err)?;

    if !response.status().is_success() {
        return Err(DocTranslateError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(map_send_err)?;
    info!("Downloaded {} bytes as '{}'", bytes.len(), filename);

    SourceDocument::from_upload(Some(&filename), bytes.to_vec())
}

/// Last non-empty path segment of a URL, if it has an extension.
fn filename_from_url(url: &reqwest::Url) -> Option<String> {
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .next_back()
        .filter(|s| s.contains('.'))
        .map(str::to_string)
}
