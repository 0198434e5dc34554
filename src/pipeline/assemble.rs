//! Output assembly: final text → single-paragraph document → artifact bytes.
//!
//! [`assemble`] does no content transformation; it only wraps the text as one
//! paragraph. Writers turn that into bytes:
//!
//! * [`DocxWriter`] — a minimal WordprocessingML package (three zip parts).
//!   Line breaks inside the paragraph become `<w:br/>` so the text reads the
//!   same as the plain-text artifact.
//! * [`PlainTextWriter`] — UTF-8 with a trailing newline.

use crate::config::OutputFormat;
use crate::context::RequestContext;
use crate::error::DocTranslateError;
use crate::output::{ArtifactPayload, AssembledDocument};
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use std::sync::Arc;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Document-writer capability.
pub trait DocumentWriter: Send + Sync {
    /// Serialise `document` into a downloadable payload named after the request.
    fn write(
        &self,
        document: &AssembledDocument,
        ctx: &RequestContext,
    ) -> Result<ArtifactPayload, DocTranslateError>;
}

/// Wrap the final text as a single paragraph.
pub fn assemble(final_text: &str) -> AssembledDocument {
    AssembledDocument {
        paragraphs: vec![final_text.to_string()],
    }
}

/// The shipped writer for `format`.
pub fn writer_for(format: OutputFormat) -> Arc<dyn DocumentWriter> {
    match format {
        OutputFormat::Docx => Arc::new(DocxWriter),
        OutputFormat::Txt => Arc::new(PlainTextWriter),
    }
}

// ── Plain text ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextWriter;

impl DocumentWriter for PlainTextWriter {
    fn write(
        &self,
        document: &AssembledDocument,
        ctx: &RequestContext,
    ) -> Result<ArtifactPayload, DocTranslateError> {
        let mut text = document.paragraphs.join("\n\n");
        if !text.ends_with('\n') {
            text.push('\n');
        }
        Ok(ArtifactPayload {
            file_name: ctx.artifact_name(OutputFormat::Txt.extension()),
            media_type: "text/plain; charset=utf-8".to_string(),
            bytes: text.into_bytes(),
        })
    }
}

// ── DOCX ─────────────────────────────────────────────────────────────────────

pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

#[derive(Debug, Clone, Copy, Default)]
pub struct DocxWriter;

impl DocxWriter {
    fn package(document_xml: &str) -> Result<Vec<u8>, zip::result::ZipError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, body) in [
            ("[Content_Types].xml", CONTENT_TYPES_XML),
            ("_rels/.rels", ROOT_RELS_XML),
            ("word/document.xml", document_xml),
        ] {
            zip.start_file(name, options)?;
            zip.write_all(body.as_bytes())?;
        }

        Ok(zip.finish()?.into_inner())
    }
}

impl DocumentWriter for DocxWriter {
    fn write(
        &self,
        document: &AssembledDocument,
        ctx: &RequestContext,
    ) -> Result<ArtifactPayload, DocTranslateError> {
        let bytes = Self::package(&document_xml(document))
            .map_err(|e| DocTranslateError::Internal(format!("failed to build docx: {}", e)))?;
        Ok(ArtifactPayload {
            file_name: ctx.artifact_name(OutputFormat::Docx.extension()),
            media_type: DOCX_MEDIA_TYPE.to_string(),
            bytes,
        })
    }
}

fn document_xml(document: &AssembledDocument) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );
    for paragraph in &document.paragraphs {
        xml.push_str("<w:p><w:r>");
        for (i, line) in paragraph.split('\n').enumerate() {
            if i > 0 {
                xml.push_str("<w:br/>");
            }
            xml.push_str(r#"<w:t xml:space="preserve">"#);
            xml.push_str(&escape(line));
            xml.push_str("</w:t>");
        }
        xml.push_str("</w:r></w:p>");
    }
    xml.push_str("</w:body></w:document>");
    xml
}
