//! Text extraction: classified document → ordered [`ExtractedSegment`]s.
//!
//! | Kind  | Segments |
//! |-------|----------|
//! | Text  | one native segment with the decoded content (none if empty) |
//! | Image | one OCR segment over the whole image |
//! | PDF   | one segment per page, native text plus OCR of the page's images when the OCR trigger fires |
//!
//! ## The OCR trigger
//!
//! While walking PDF pages the extractor keeps a running buffer of all text
//! extracted so far. Under [`OcrFallbackScope::Cumulative`] a page's images
//! are OCR'd only while that whole buffer is still blank, so a document whose
//! first page has a text layer never OCRs a later scanned page. Under
//! [`OcrFallbackScope::PerPage`] the page's own native text decides.
//!
//! Pages with neither text nor images contribute an empty segment; nothing
//! here fails except loading the PDF itself.

use crate::config::OcrFallbackScope;
use crate::document::{DocumentKind, Page, SourceDocument};
use crate::error::DocTranslateError;
use crate::output::ExtractedSegment;
use crate::pipeline::ocr::OcrEngine;
use crate::pipeline::pdf::PdfLoader;
use crate::progress::PipelineProgressCallback;
use tracing::debug;

/// Settings the extractor reads from the pipeline config.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions<'a> {
    pub languages: &'a str,
    pub scope: OcrFallbackScope,
    pub password: Option<&'a str>,
}

/// What extraction produced. `pages` is kept for the page-level fallback so
/// the PDF is not loaded twice; it is empty for text and image documents.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub segments: Vec<ExtractedSegment>,
    pub pages: Vec<Page>,
    pub ocr_calls: usize,
}

/// Extract `doc` into segments in ascending page order.
pub async fn extract(
    doc: &SourceDocument,
    pdf_loader: &dyn PdfLoader,
    ocr: &dyn OcrEngine,
    options: ExtractOptions<'_>,
    progress: &dyn PipelineProgressCallback,
) -> Result<Extraction, DocTranslateError> {
    match doc.kind() {
        DocumentKind::Text => {
            let text = doc.decoded_text();
            let mut extraction = Extraction::default();
            if !text.is_empty() {
                progress.on_page_extracted(0, text.chars().count(), false);
                extraction.segments.push(ExtractedSegment::native(0, text));
            }
            Ok(extraction)
        }
        DocumentKind::Image => {
            let text = ocr.recognize(doc.bytes(), options.languages).await;
            progress.on_page_extracted(0, text.chars().count(), true);
            Ok(Extraction {
                segments: vec![ExtractedSegment::ocr(0, text)],
                pages: Vec::new(),
                ocr_calls: 1,
            })
        }
        DocumentKind::Pdf => {
            let pages = pdf_loader
                .load(doc.filename(), doc.bytes(), options.password)
                .await?;
            let (segments, ocr_calls) =
                extract_pages(&pages, ocr, options.languages, options.scope, progress).await;
            Ok(Extraction {
                segments,
                pages,
                ocr_calls,
            })
        }
    }
}

/// Walk loaded PDF pages, applying the OCR trigger. Returns the segments and
/// the number of OCR calls made.
pub async fn extract_pages(
    pages: &[Page],
    ocr: &dyn OcrEngine,
    languages: &str,
    scope: OcrFallbackScope,
    progress: &dyn PipelineProgressCallback,
) -> (Vec<ExtractedSegment>, usize) {
    let mut buffer = String::new();
    let mut segments = Vec::with_capacity(pages.len());
    let mut ocr_calls = 0;

    for page in pages {
        buffer.push_str(&page.native_text);

        let needs_ocr = match scope {
            OcrFallbackScope::Cumulative => buffer.trim().is_empty(),
            OcrFallbackScope::PerPage => page.native_text.trim().is_empty(),
        };

        let mut text = page.native_text.clone();
        let mut used_ocr = false;
        if needs_ocr && !page.images.is_empty() {
            let recognised = ocr_page_images(page, ocr, languages).await;
            ocr_calls += page.images.len();
            if !recognised.is_empty() {
                buffer.push_str(&recognised);
                text.push_str(&recognised);
                used_ocr = true;
            }
        }

        debug!(
            "Page {}: {} chars ({})",
            page.index + 1,
            text.chars().count(),
            if used_ocr { "ocr" } else { "native" }
        );
        progress.on_page_extracted(page.index, text.chars().count(), used_ocr);

        segments.push(if used_ocr {
            ExtractedSegment::ocr(page.index, text)
        } else {
            ExtractedSegment::native(page.index, text)
        });
    }

    (segments, ocr_calls)
}

/// OCR every image on `page` in order and join the non-empty results with
/// single spaces.
pub async fn ocr_page_images(page: &Page, ocr: &dyn OcrEngine, languages: &str) -> String {
    let mut parts = Vec::with_capacity(page.images.len());
    for image in &page.images {
        let text = ocr.recognize(&image.png, languages).await;
        if !text.trim().is_empty() {
            parts.push(text);
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Provenance;
    use crate::progress::NoopProgressCallback;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reads the image bytes back as text.
    struct EchoOcr {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OcrEngine for EchoOcr {
        async fn recognize(&self, image: &[u8], _languages: &str) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            String::from_utf8_lossy(image).into_owned()
        }
    }

    fn echo() -> EchoOcr {
        EchoOcr {
            calls: AtomicUsize::new(0),
        }
    }

    #[tokio::test]
    async fn images_joined_with_spaces() {
        let page = Page::new(0, "")
            .with_image(0, b"first".to_vec())
            .with_image(1, b"".to_vec())
            .with_image(2, b"third".to_vec());
        let ocr = echo();
        assert_eq!(ocr_page_images(&page, &ocr, "eng").await, "first third");
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn cumulative_scope_stops_after_first_text() {
        let pages = vec![
            Page::new(0, "").with_image(0, b"scan one".to_vec()),
            Page::new(1, "").with_image(0, b"scan two".to_vec()),
        ];
        let ocr = echo();
        let (segments, calls) = extract_pages(
            &pages,
            &ocr,
            "eng",
            OcrFallbackScope::Cumulative,
            &NoopProgressCallback,
        )
        .await;

        assert_eq!(calls, 1);
        assert_eq!(segments[0].text, "scan one");
        assert_eq!(segments[0].provenance, Provenance::Ocr);
        assert_eq!(segments[1].text, "");
        assert_eq!(segments[1].provenance, Provenance::Native);
    }

    #[tokio::test]
    async fn page_without_text_or_images_is_empty_segment() {
        let pages = vec![Page::new(0, ""), Page::new(1, "tail")];
        let (segments, calls) = extract_pages(
            &pages,
            &echo(),
            "eng",
            OcrFallbackScope::PerPage,
            &NoopProgressCallback,
        )
        .await;
        assert_eq!(calls, 0);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "");
        assert_eq!(segments[1].page_index, 1);
    }

    #[tokio::test]
    async fn blank_native_text_is_kept_before_ocr_text() {
        let pages = vec![Page::new(0, "\n").with_image(0, b"scan".to_vec())];
        let (segments, _) = extract_pages(
            &pages,
            &echo(),
            "eng",
            OcrFallbackScope::Cumulative,
            &NoopProgressCallback,
        )
        .await;
        assert_eq!(segments[0].text, "\nscan");
    }
}
