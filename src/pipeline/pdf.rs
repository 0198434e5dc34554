//! PDF loading: native text layer and embedded images per page, via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and is CPU-bound. [`PdfiumLoader`] therefore does all of its work on
//! tokio's blocking pool and hands back plain owned [`Page`] values.
//!
//! ## Binding
//!
//! The library is looked up at `PDFIUM_LIB_PATH` when set, then in the working
//! directory, then in the system library path.

use crate::document::Page;
use crate::error::DocTranslateError;
use crate::pipeline::encode::encode_png;
use async_trait::async_trait;
use pdfium_render::prelude::*;
use tracing::{debug, info, warn};

/// Native-text extraction capability.
#[async_trait]
pub trait PdfLoader: Send + Sync {
    /// Split a PDF into pages, in order, each with its native text and
    /// embedded images.
    async fn load(
        &self,
        filename: &str,
        bytes: &[u8],
        password: Option<&str>,
    ) -> Result<Vec<Page>, DocTranslateError>;
}

/// [`PdfLoader`] backed by pdfium.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumLoader;

#[async_trait]
impl PdfLoader for PdfiumLoader {
    async fn load(
        &self,
        filename: &str,
        bytes: &[u8],
        password: Option<&str>,
    ) -> Result<Vec<Page>, DocTranslateError> {
        let filename = filename.to_string();
        let bytes = bytes.to_vec();
        let password = password.map(str::to_string);

        tokio::task::spawn_blocking(move || load_blocking(&filename, &bytes, password.as_deref()))
            .await
            .map_err(|e| DocTranslateError::Internal(format!("PDF task panicked: {}", e)))?
    }
}

/// Bind to a pdfium library.
pub fn bind_pdfium() -> Result<Pdfium, DocTranslateError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(path) => Pdfium::bind_to_library(&path),
        Err(_) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./")),
    }
    .or_else(|_| Pdfium::bind_to_system_library())
    .map_err(|e| DocTranslateError::PdfiumBindingFailed(e.to_string()))?;

    Ok(Pdfium::new(bindings))
}

fn load_blocking(
    filename: &str,
    bytes: &[u8],
    password: Option<&str>,
) -> Result<Vec<Page>, DocTranslateError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, password)
        .map_err(|e| classify_load_error(filename, password.is_some(), &e))?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut result = Vec::with_capacity(pages.len() as usize);
    for (index, page) in pages.iter().enumerate() {
        let native_text = match page.text() {
            Ok(text) => text.all(),
            Err(e) => {
                warn!("Page {}: no readable text layer ({:?})", index + 1, e);
                String::new()
            }
        };

        let mut extracted = Page::new(index, native_text);
        for (id, object) in page.objects().iter().enumerate() {
            let Some(image) = object.as_image_object() else {
                continue;
            };
            let png = image
                .get_raw_image()
                .map_err(|e| format!("{:?}", e))
                .and_then(|img| encode_png(&img).map_err(|e| e.to_string()));
            match png {
                Ok(png) => extracted = extracted.with_image(id, png),
                Err(e) => warn!("Page {}: skipping image object {} ({})", index + 1, id, e),
            }
        }

        debug!(
            "Page {}: {} native chars, {} images",
            index + 1,
            extracted.native_text.chars().count(),
            extracted.images.len()
        );
        result.push(extracted);
    }

    Ok(result)
}

/// pdfium reports password problems only through its error text.
fn classify_load_error(
    filename: &str,
    password_given: bool,
    error: &PdfiumError,
) -> DocTranslateError {
    let detail = format!("{:?}", error);
    if detail.to_ascii_lowercase().contains("password") {
        if password_given {
            DocTranslateError::WrongPassword {
                filename: filename.to_string(),
            }
        } else {
            DocTranslateError::PasswordRequired {
                filename: filename.to_string(),
            }
        }
    } else {
        DocTranslateError::CorruptPdf {
            filename: filename.to_string(),
            detail,
        }
    }
}
