//! Source documents and the pages derived from them.
//!
//! A [`SourceDocument`] is created once per request from the uploaded bytes
//! and filename. Its [`DocumentKind`] is decided by the filename extension
//! alone; anything outside the allow-list is rejected before extraction runs.

use crate::error::DocTranslateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Extensions accepted for upload, lower-case.
pub const ALLOWED_EXTENSIONS: &[&str] = &["txt", "pdf", "png", "jpg", "jpeg"];

/// Declared type of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    Text,
    Image,
    #[serde(rename = "PDF")]
    Pdf,
}

impl DocumentKind {
    /// Classify a filename by its last extension (case-insensitive).
    ///
    /// A name without a `.` has no extension and is rejected.
    pub fn from_filename(filename: &str) -> Result<Self, DocTranslateError> {
        let unsupported = || DocTranslateError::UnsupportedFileType {
            filename: filename.to_string(),
        };

        let (_, ext) = filename.rsplit_once('.').ok_or_else(unsupported)?;
        match ext.to_ascii_lowercase().as_str() {
            "txt" => Ok(Self::Text),
            "pdf" => Ok(Self::Pdf),
            "png" | "jpg" | "jpeg" => Ok(Self::Image),
            _ => Err(unsupported()),
        }
    }

    /// Display label used in results ("Text", "Image", "PDF").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Image => "Image",
            Self::Pdf => "PDF",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An uploaded document, owned by the request that created it.
#[derive(Clone)]
pub struct SourceDocument {
    filename: String,
    kind: DocumentKind,
    bytes: Vec<u8>,
}

impl fmt::Debug for SourceDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceDocument")
            .field("filename", &self.filename)
            .field("kind", &self.kind)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl SourceDocument {
    /// Validate an upload and classify it.
    ///
    /// `filename` is `None` when the request had no file part and `Some("")`
    /// when a part was sent without selecting a file; both are rejected here,
    /// as are disallowed extensions. PDFs must start with `%PDF`.
    pub fn from_upload(
        filename: Option<&str>,
        bytes: impl Into<Vec<u8>>,
    ) -> Result<Self, DocTranslateError> {
        let filename = filename.ok_or(DocTranslateError::NoFileProvided)?;
        if filename.trim().is_empty() {
            return Err(DocTranslateError::EmptySelection);
        }

        let kind = DocumentKind::from_filename(filename)?;
        let bytes = bytes.into();

        if kind == DocumentKind::Pdf && bytes.len() >= 4 && &bytes[..4] != b"%PDF" {
            let mut magic = [0u8; 4];
            magic.copy_from_slice(&bytes[..4]);
            return Err(DocTranslateError::NotAPdf {
                filename: filename.to_string(),
                magic,
            });
        }

        Ok(Self {
            filename: filename.to_string(),
            kind,
            bytes,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decode a text upload. Invalid UTF-8 is replaced, a leading BOM dropped.
    pub fn decoded_text(&self) -> String {
        let text = String::from_utf8_lossy(&self.bytes);
        text.strip_prefix('\u{FEFF}').unwrap_or(&text).to_string()
    }
}

/// An image embedded in a PDF page, PNG-encoded.
#[derive(Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    /// Index of the image object within its page.
    pub id: usize,
    pub png: Vec<u8>,
}

impl fmt::Debug for EmbeddedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedImage")
            .field("id", &self.id)
            .field("png_len", &self.png.len())
            .finish()
    }
}

/// One page of a PDF: its native text layer and embedded images, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// 0-based.
    pub index: usize,
    pub native_text: String,
    pub images: Vec<EmbeddedImage>,
}

impl Page {
    pub fn new(index: usize, native_text: impl Into<String>) -> Self {
        Self {
            index,
            native_text: native_text.into(),
            images: Vec::new(),
        }
    }

    pub fn with_image(mut self, id: usize, png: Vec<u8>) -> Self {
        self.images.push(EmbeddedImage { id, png });
        self
    }
}
