//! Pipeline integration tests with in-memory capabilities.
//!
//! Every external capability (PDF loader, OCR, language identification,
//! translation, document writer) is replaced by a fake that counts its calls,
//! so these tests run offline and assert exactly which capabilities ran.
//!
//! Run with:
//!   cargo test --test pipeline

use async_trait::async_trait;
use edgequake_doctranslate::output::{AssembledDocument, ArtifactPayload};
use edgequake_doctranslate::{
    inspect, translate_upload, DetectError, DetectedLanguage, DocTranslateError, DocumentKind,
    DocumentWriter, LanguageIdentifier, OcrEngine, OcrFallbackScope, OutcomeStatus, Page,
    PdfLoader, PipelineConfig, PipelineProgressCallback, Provenance, RequestContext, Stage,
    TranslateError, Translator, TRANSLATION_FAILED,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Fakes ────────────────────────────────────────────────────────────────────

type Behaviour = dyn Fn(usize, &str) -> Result<String, TranslateError> + Send + Sync;

/// Translator whose reply is decided per call by `behaviour(call_index, text)`.
struct FakeTranslator {
    behaviour: Box<Behaviour>,
    calls: Mutex<Vec<(String, String, String)>>,
}

impl FakeTranslator {
    fn new(behaviour: impl Fn(usize, &str) -> Result<String, TranslateError> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            behaviour: Box::new(behaviour),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Prefixes the text with the destination code.
    fn tagging() -> Arc<Self> {
        Self::new(|_, text| Ok(format!("<ta>{text}</ta>")))
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Translator for FakeTranslator {
    async fn translate(&self, text: &str, source: &str, destination: &str) -> Result<String, TranslateError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((text.to_string(), source.to_string(), destination.to_string()));
            calls.len() - 1
        };
        (self.behaviour)(index, text)
    }
}

/// Identifies by script: Tamil, Devanagari, Latin letters, else fails.
#[derive(Default)]
struct ScriptIdentifier {
    calls: AtomicUsize,
}

impl LanguageIdentifier for ScriptIdentifier {
    fn identify(&self, text: &str) -> Result<String, DetectError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.chars().any(|c| ('\u{0B80}'..='\u{0BFF}').contains(&c)) {
            Ok("ta".into())
        } else if text.chars().any(|c| ('\u{0900}'..='\u{097F}').contains(&c)) {
            Ok("hi".into())
        } else if text.chars().any(|c| c.is_ascii_alphabetic()) {
            Ok("en".into())
        } else {
            Err(DetectError::NoFeatures)
        }
    }
}

/// "Images" are UTF-8 text; OCR reads them back.
#[derive(Default)]
struct FakeOcr {
    calls: Mutex<Vec<String>>,
}

impl FakeOcr {
    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl OcrEngine for FakeOcr {
    async fn recognize(&self, image: &[u8], languages: &str) -> String {
        self.calls.lock().unwrap().push(languages.to_string());
        String::from_utf8_lossy(image).trim().to_string()
    }
}

struct FakePdf {
    pages: Vec<Page>,
    calls: AtomicUsize,
}

impl FakePdf {
    fn new(pages: Vec<Page>) -> Arc<Self> {
        Arc::new(Self {
            pages,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl PdfLoader for FakePdf {
    async fn load(&self, _: &str, _: &[u8], _: Option<&str>) -> Result<Vec<Page>, DocTranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pages.clone())
    }
}

/// Keeps every document it is asked to write.
#[derive(Default)]
struct RecordingWriter {
    written: Mutex<Vec<AssembledDocument>>,
}

impl DocumentWriter for RecordingWriter {
    fn write(&self, document: &AssembledDocument, ctx: &RequestContext) -> Result<ArtifactPayload, DocTranslateError> {
        self.written.lock().unwrap().push(document.clone());
        Ok(ArtifactPayload {
            file_name: ctx.artifact_name("txt"),
            media_type: "text/plain".into(),
            bytes: document.paragraphs.join("\n").into_bytes(),
        })
    }
}

struct Harness {
    translator: Arc<FakeTranslator>,
    identifier: Arc<ScriptIdentifier>,
    ocr: Arc<FakeOcr>,
    pdf: Arc<FakePdf>,
    writer: Arc<RecordingWriter>,
}

impl Harness {
    fn new(translator: Arc<FakeTranslator>, pages: Vec<Page>) -> Self {
        Self {
            translator,
            identifier: Arc::new(ScriptIdentifier::default()),
            ocr: Arc::new(FakeOcr::default()),
            pdf: FakePdf::new(pages),
            writer: Arc::new(RecordingWriter::default()),
        }
    }

    fn config(&self) -> edgequake_doctranslate::PipelineConfigBuilder {
        PipelineConfig::builder()
            .translator(self.translator.clone())
            .language_identifier(self.identifier.clone())
            .ocr_engine(self.ocr.clone())
            .pdf_loader(self.pdf.clone())
            .document_writer(self.writer.clone())
            .retry_backoff_ms(0)
    }

    fn nothing_ran(&self) -> bool {
        self.translator.call_count() == 0
            && self.identifier.calls.load(Ordering::SeqCst) == 0
            && self.ocr.call_count() == 0
            && self.pdf.calls.load(Ordering::SeqCst) == 0
            && self.writer.written.lock().unwrap().is_empty()
    }
}

const PDF_BYTES: &[u8] = b"%PDF-1.7\n%fake";

fn two_page_pdf() -> Vec<Page> {
    vec![
        Page::new(0, "Hello world"),
        Page::new(1, "").with_image(0, "வணக்கம்".as_bytes().to_vec()),
    ]
}

// ── Scenario A: text upload ──────────────────────────────────────────────────

#[tokio::test]
async fn text_upload_is_detected_translated_and_assembled() {
    let h = Harness::new(FakeTranslator::tagging(), vec![]);
    let config = h.config().build().unwrap();

    let out = translate_upload(Some("hello.txt"), b"Hello world".to_vec(), "ta", &config)
        .await
        .unwrap();

    assert_eq!(out.file_kind, DocumentKind::Text);
    assert_eq!(out.detected_language, DetectedLanguage::English);
    assert_eq!(out.outcome.status, OutcomeStatus::Succeeded);
    assert_eq!(out.document.text, "<ta>Hello world</ta>");
    assert_eq!(out.segments.len(), 1);
    assert_eq!(out.segments[0].provenance, Provenance::Native);

    assert_eq!(
        h.translator.calls(),
        vec![("Hello world".to_string(), "en".to_string(), "ta".to_string())]
    );

    let written = h.writer.written.lock().unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].paragraphs, vec!["<ta>Hello world</ta>".to_string()]);
    assert_eq!(h.ocr.call_count(), 0);
}

#[tokio::test]
async fn docx_artifact_has_a_single_paragraph() {
    let h = Harness::new(FakeTranslator::tagging(), vec![]);
    let config = PipelineConfig::builder()
        .translator(h.translator.clone())
        .language_identifier(h.identifier.clone())
        .build()
        .unwrap();

    let out = translate_upload(Some("hello.txt"), b"Hello\nworld".to_vec(), "ta", &config)
        .await
        .unwrap();

    assert!(out.artifact.file_name.ends_with(".docx"));
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(out.artifact.bytes)).unwrap();
    let mut xml = String::new();
    std::io::Read::read_to_string(&mut archive.by_name("word/document.xml").unwrap(), &mut xml).unwrap();
    assert_eq!(xml.matches("<w:p>").count(), 1, "got: {xml}");
}

// ── Scenario B: rejected upload ──────────────────────────────────────────────

#[tokio::test]
async fn disallowed_extension_runs_nothing() {
    let h = Harness::new(FakeTranslator::tagging(), two_page_pdf());
    let config = h.config().build().unwrap();

    let err = translate_upload(Some("archive.zip"), b"PK\x03\x04".to_vec(), "ta", &config)
        .await
        .unwrap_err();

    assert!(matches!(err, DocTranslateError::UnsupportedFileType { .. }));
    assert!(err.is_input_error());
    assert!(h.nothing_ran());
}

#[tokio::test]
async fn missing_or_unselected_file_runs_nothing() {
    let h = Harness::new(FakeTranslator::tagging(), vec![]);
    let config = h.config().build().unwrap();

    let err = translate_upload(None, Vec::new(), "ta", &config).await.unwrap_err();
    assert!(matches!(err, DocTranslateError::NoFileProvided));

    let err = translate_upload(Some(""), Vec::new(), "ta", &config).await.unwrap_err();
    assert!(matches!(err, DocTranslateError::EmptySelection));

    assert!(h.nothing_ran());
}

// ── Scenario C: translation keeps failing ────────────────────────────────────

#[tokio::test]
async fn transient_failures_degrade_after_three_attempts() {
    let h = Harness::new(
        FakeTranslator::new(|_, _| Err(TranslateError::transient("503 Service Unavailable"))),
        vec![],
    );
    let config = h.config().build().unwrap();

    let out = translate_upload(Some("hello.txt"), b"Hello world".to_vec(), "ta", &config)
        .await
        .expect("pipeline completes despite translation failure");

    assert_eq!(out.outcome.text, TRANSLATION_FAILED);
    assert_eq!(out.outcome.status, OutcomeStatus::Degraded);
    assert_eq!(out.document.text, TRANSLATION_FAILED);
    assert_eq!(h.translator.call_count(), 3);
    assert_eq!(out.stats.translation_attempts, 3);
    assert_eq!(out.artifact.bytes, TRANSLATION_FAILED.as_bytes());
}

#[tokio::test]
async fn permanent_failure_degrades_on_first_attempt() {
    let h = Harness::new(
        FakeTranslator::new(|_, _| Err(TranslateError::permanent("401 Unauthorized"))),
        vec![],
    );
    let config = h.config().build().unwrap();

    let out = translate_upload(Some("hello.txt"), b"Hello world".to_vec(), "ta", &config)
        .await
        .unwrap();

    assert!(out.outcome.is_degraded());
    assert_eq!(h.translator.call_count(), 1);
}

#[tokio::test]
async fn attempt_budget_is_configurable() {
    let h = Harness::new(
        FakeTranslator::new(|_, _| Err(TranslateError::transient("429"))),
        vec![],
    );
    let config = h.config().max_attempts(5).build().unwrap();

    translate_upload(Some("hello.txt"), b"Hello".to_vec(), "ta", &config)
        .await
        .unwrap();
    assert_eq!(h.translator.call_count(), 5);
}

#[tokio::test]
async fn recovers_after_transient_failures() {
    let h = Harness::new(
        FakeTranslator::new(|i, text| {
            if i < 2 {
                Err(TranslateError::transient("rate limit"))
            } else {
                Ok(format!("<ta>{text}</ta>"))
            }
        }),
        vec![],
    );
    let config = h.config().build().unwrap();

    let out = translate_upload(Some("hello.txt"), b"Hello".to_vec(), "ta", &config)
        .await
        .unwrap();
    assert_eq!(out.outcome.status, OutcomeStatus::Succeeded);
    assert_eq!(out.outcome.attempts, 3);
}

// ── Scenario D: OCR trigger scope ────────────────────────────────────────────

#[tokio::test]
async fn cumulative_scope_skips_ocr_after_text_page() {
    let h = Harness::new(FakeTranslator::tagging(), two_page_pdf());
    let config = h.config().build().unwrap();
    assert_eq!(config.fallback_scope, OcrFallbackScope::Cumulative);

    let out = translate_upload(Some("doc.pdf"), PDF_BYTES.to_vec(), "ta", &config)
        .await
        .unwrap();

    assert_eq!(h.ocr.call_count(), 0);
    assert_eq!(out.segments.len(), 2);
    assert_eq!(out.segments[1].text, "");
    assert_eq!(out.segments[1].provenance, Provenance::Native);
    assert_eq!(out.document.text, "<ta>Hello world</ta>");
}

#[tokio::test]
async fn per_page_scope_ocrs_image_only_page() {
    let h = Harness::new(FakeTranslator::tagging(), two_page_pdf());
    let config = h
        .config()
        .fallback_scope(OcrFallbackScope::PerPage)
        .build()
        .unwrap();

    let out = translate_upload(Some("doc.pdf"), PDF_BYTES.to_vec(), "ta", &config)
        .await
        .unwrap();

    assert_eq!(h.ocr.calls.lock().unwrap().as_slice(), ["eng+hin+tam"]);
    assert_eq!(out.segments[1].text, "வணக்கம்");
    assert_eq!(out.segments[1].provenance, Provenance::Ocr);
    assert_eq!(out.stats.ocr_calls, 1);
}

#[tokio::test]
async fn scanned_first_page_is_ocred_under_cumulative_scope() {
    let pages = vec![
        Page::new(0, "")
            .with_image(0, b"Scanned".to_vec())
            .with_image(1, b"notice".to_vec()),
        Page::new(1, "").with_image(0, b"never read".to_vec()),
    ];
    let h = Harness::new(FakeTranslator::tagging(), pages);
    let config = h.config().build().unwrap();

    let out = translate_upload(Some("scan.pdf"), PDF_BYTES.to_vec(), "ta", &config)
        .await
        .unwrap();

    assert_eq!(h.ocr.call_count(), 2);
    assert_eq!(out.segments[0].text, "Scanned notice");
    assert_eq!(out.segments[1].text, "");
}

#[tokio::test]
async fn segments_are_in_page_order() {
    let pages = (0..5).map(|i| Page::new(i, format!("page{i} "))).collect();
    let h = Harness::new(FakeTranslator::tagging(), pages);
    let config = h.config().build().unwrap();

    let out = translate_upload(Some("doc.pdf"), PDF_BYTES.to_vec(), "ta", &config)
        .await
        .unwrap();

    let indices: Vec<usize> = out.segments.iter().map(|s| s.page_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    assert_eq!(h.translator.calls()[0].0, "page0 page1 page2 page3 page4 ");
}

// ── Scenario E: passthrough ──────────────────────────────────────────────────

#[tokio::test]
async fn image_in_destination_language_is_passed_through() {
    let h = Harness::new(FakeTranslator::tagging(), vec![]);
    let config = h.config().build().unwrap();
    let ocr_text = "வணக்கம் உலகம்";

    let out = translate_upload(Some("photo.png"), ocr_text.as_bytes().to_vec(), "ta", &config)
        .await
        .unwrap();

    assert_eq!(out.file_kind, DocumentKind::Image);
    assert_eq!(out.detected_language, DetectedLanguage::Tamil);
    assert_eq!(out.outcome.status, OutcomeStatus::Succeeded);
    assert_eq!(out.document.text, ocr_text);
    assert_eq!(out.segments[0].provenance, Provenance::Ocr);
    assert_eq!(h.translator.call_count(), 0);
    assert_eq!(h.ocr.call_count(), 1);
}

#[tokio::test]
async fn destination_code_comparison_ignores_case() {
    let h = Harness::new(FakeTranslator::tagging(), vec![]);
    let config = h.config().build().unwrap();

    let out = translate_upload(Some("a.txt"), b"Hello".to_vec(), "EN", &config)
        .await
        .unwrap();
    assert_eq!(out.document.text, "Hello");
    assert_eq!(h.translator.call_count(), 0);
}

// ── Detection and empty input ────────────────────────────────────────────────

#[tokio::test]
async fn unknown_source_is_sent_as_auto() {
    let h = Harness::new(FakeTranslator::tagging(), vec![]);
    let config = h.config().build().unwrap();

    let out = translate_upload(Some("digits.txt"), b"12345 67890".to_vec(), "ta", &config)
        .await
        .unwrap();

    assert_eq!(out.detected_language, DetectedLanguage::Unknown);
    assert_eq!(h.translator.calls()[0].1, "auto");
}

#[tokio::test]
async fn empty_text_file_degrades_without_calls() {
    let h = Harness::new(FakeTranslator::tagging(), vec![]);
    let config = h.config().build().unwrap();

    let out = translate_upload(Some("empty.txt"), Vec::new(), "ta", &config)
        .await
        .unwrap();

    assert!(out.segments.is_empty());
    assert_eq!(out.detected_language, DetectedLanguage::Unknown);
    assert_eq!(out.outcome.text, TRANSLATION_FAILED);
    assert_eq!(h.translator.call_count(), 0);
    assert!(!out.page_fallback_used);
}

#[tokio::test]
async fn malformed_utf8_is_still_processed() {
    let h = Harness::new(FakeTranslator::tagging(), vec![]);
    let config = h.config().build().unwrap();

    let out = translate_upload(Some("bad.txt"), b"Hello \xFF\xFE world".to_vec(), "ta", &config)
        .await
        .unwrap();
    assert_eq!(out.detected_language, DetectedLanguage::English);
    assert!(out.segments[0].text.contains('\u{FFFD}'));
}

// ── Page-level fallback ──────────────────────────────────────────────────────

/// First call (whole document) comes back empty, later calls translate.
fn blank_then_tagging() -> Arc<FakeTranslator> {
    FakeTranslator::new(|i, text| {
        if i == 0 {
            Ok(String::new())
        } else {
            Ok(format!("<ta>{text}</ta>"))
        }
    })
}

fn scanned_pdf() -> Vec<Page> {
    vec![
        Page::new(0, "native one").with_image(0, b"First page".to_vec()),
        Page::new(1, "native two"),
        Page::new(2, "native three")
            .with_image(0, "नमस्ते".as_bytes().to_vec())
            .with_image(1, b"dunia".to_vec()),
    ]
}

#[tokio::test]
async fn empty_translation_triggers_page_fallback() {
    let h = Harness::new(blank_then_tagging(), scanned_pdf());
    let config = h.config().build().unwrap();

    let out = translate_upload(Some("doc.pdf"), PDF_BYTES.to_vec(), "ta", &config)
        .await
        .unwrap();

    assert!(out.page_fallback_used);
    let pages: Vec<usize> = out.page_translations.iter().map(|p| p.page_index).collect();
    assert_eq!(pages, vec![0, 2], "page 1 has no images and is skipped");
    assert_eq!(out.page_translations[1].detected_language, DetectedLanguage::Hindi);

    // Native text is ignored; only OCR text is translated.
    let calls = h.translator.calls();
    assert_eq!(calls[1].0, "First page");
    assert_eq!(calls[2].0, "नमस्ते dunia");
    assert_eq!(calls[2].1, "hi");

    assert_eq!(out.document.text, "<ta>First page</ta> <ta>नमस्ते dunia</ta>");
    assert_eq!(out.outcome.text, out.document.text);
    assert_eq!(out.outcome.status, OutcomeStatus::Succeeded);
    assert_eq!(
        h.writer.written.lock().unwrap()[0].paragraphs,
        vec![out.document.text.clone()]
    );
}

#[tokio::test]
async fn degraded_translation_does_not_trigger_page_fallback() {
    let h = Harness::new(
        FakeTranslator::new(|_, _| Err(TranslateError::permanent("bad request"))),
        scanned_pdf(),
    );
    let config = h.config().build().unwrap();

    let out = translate_upload(Some("doc.pdf"), PDF_BYTES.to_vec(), "ta", &config)
        .await
        .unwrap();

    assert!(!out.page_fallback_used);
    assert_eq!(out.document.text, TRANSLATION_FAILED);
    assert_eq!(h.ocr.call_count(), 0);
}

#[tokio::test]
async fn page_fallback_can_be_disabled() {
    let h = Harness::new(blank_then_tagging(), scanned_pdf());
    let config = h.config().page_fallback(false).build().unwrap();

    let out = translate_upload(Some("doc.pdf"), PDF_BYTES.to_vec(), "ta", &config)
        .await
        .unwrap();

    assert!(!out.page_fallback_used);
    assert_eq!(h.translator.call_count(), 1);
}

#[tokio::test]
async fn empty_translation_of_text_file_has_no_fallback() {
    let h = Harness::new(blank_then_tagging(), vec![]);
    let config = h.config().build().unwrap();

    let out = translate_upload(Some("a.txt"), b"Hello".to_vec(), "ta", &config)
        .await
        .unwrap();

    assert!(!out.page_fallback_used);
    assert_eq!(out.document.text, "");
}

#[tokio::test]
async fn whitespace_reply_does_not_trigger_page_fallback() {
    let h = Harness::new(
        FakeTranslator::new(|_, _| Ok("  \n ".into())),
        scanned_pdf(),
    );
    let config = h.config().build().unwrap();

    let out = translate_upload(Some("doc.pdf"), PDF_BYTES.to_vec(), "ta", &config)
        .await
        .unwrap();

    assert!(!out.page_fallback_used);
    assert_eq!(h.translator.call_count(), 1);
    assert_eq!(h.ocr.call_count(), 0);
}

#[tokio::test]
async fn fallback_with_no_ocr_text_is_degraded() {
    let pages = vec![Page::new(0, "only text"), Page::new(1, "more text")];
    let h = Harness::new(blank_then_tagging(), pages);
    let config = h.config().build().unwrap();

    let out = translate_upload(Some("doc.pdf"), PDF_BYTES.to_vec(), "ta", &config)
        .await
        .unwrap();

    assert!(out.page_fallback_used);
    assert!(out.page_translations.is_empty());
    assert_eq!(out.outcome.status, OutcomeStatus::Degraded);
    assert_eq!(out.outcome.text, TRANSLATION_FAILED);
    assert_eq!(out.document.text, TRANSLATION_FAILED);
    assert_eq!(out.artifact.bytes, TRANSLATION_FAILED.as_bytes());
    assert_eq!(out.outcome.attempts, 1);
}

#[tokio::test]
async fn fallback_where_every_page_fails_carries_one_sentinel() {
    let h = Harness::new(
        FakeTranslator::new(|i, _| {
            if i == 0 {
                Ok(String::new())
            } else {
                Err(TranslateError::permanent("unsupported language pair"))
            }
        }),
        scanned_pdf(),
    );
    let config = h.config().build().unwrap();

    let out = translate_upload(Some("doc.pdf"), PDF_BYTES.to_vec(), "ta", &config)
        .await
        .unwrap();

    assert!(out.page_fallback_used);
    assert_eq!(out.page_translations.len(), 2);
    assert!(out.page_translations.iter().all(|p| p.outcome.is_degraded()));
    assert_eq!(out.outcome.status, OutcomeStatus::Degraded);
    assert_eq!(out.document.text, TRANSLATION_FAILED);
    assert_eq!(out.outcome.attempts, 3);
}

#[tokio::test]
async fn fallback_page_already_in_destination_is_passed_through() {
    let tamil = "வணக்கம் உலகம்";
    let pages = vec![
        Page::new(0, "cover").with_image(0, b"First page".to_vec()),
        Page::new(1, "body").with_image(0, tamil.as_bytes().to_vec()),
        Page::new(2, "blank"),
        Page::new(3, "end").with_image(0, "नमस्ते".as_bytes().to_vec()),
    ];
    let h = Harness::new(blank_then_tagging(), pages);
    let config = h.config().build().unwrap();

    let out = translate_upload(Some("doc.pdf"), PDF_BYTES.to_vec(), "ta", &config)
        .await
        .unwrap();

    let indices: Vec<usize> = out.page_translations.iter().map(|p| p.page_index).collect();
    assert_eq!(indices, vec![0, 1, 3]);

    let tamil_page = &out.page_translations[1];
    assert_eq!(tamil_page.detected_language, DetectedLanguage::Tamil);
    assert_eq!(tamil_page.outcome.status, OutcomeStatus::Succeeded);
    assert_eq!(tamil_page.outcome.text, tamil);
    assert_eq!(tamil_page.outcome.attempts, 0);

    // Whole document, page 0, page 3; never the Tamil page.
    let calls = h.translator.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|(text, _, _)| text != tamil));

    assert_eq!(
        out.document.text,
        format!("<ta>First page</ta> {tamil} <ta>नमस्ते</ta>")
    );
    assert_eq!(out.outcome.status, OutcomeStatus::Succeeded);
}

// ── Progress reporting ───────────────────────────────────────────────────────

#[derive(Default)]
struct StageLog {
    stages: Mutex<Vec<Stage>>,
    attempts: Mutex<Vec<u32>>,
    completed: Mutex<Option<OutcomeStatus>>,
}

impl PipelineProgressCallback for StageLog {
    fn on_stage(&self, stage: Stage) {
        self.stages.lock().unwrap().push(stage);
    }

    fn on_translation_attempt(&self, attempt: u32, _max_attempts: u32) {
        self.attempts.lock().unwrap().push(attempt);
    }

    fn on_complete(&self, status: OutcomeStatus) {
        *self.completed.lock().unwrap() = Some(status);
    }
}

#[tokio::test]
async fn stages_are_reported_in_order() {
    let h = Harness::new(blank_then_tagging(), scanned_pdf());
    let log = Arc::new(StageLog::default());
    let config = h.config().progress_callback(log.clone()).build().unwrap();

    translate_upload(Some("doc.pdf"), PDF_BYTES.to_vec(), "ta", &config)
        .await
        .unwrap();

    assert_eq!(
        log.stages.lock().unwrap().as_slice(),
        [
            Stage::Extracting,
            Stage::Detecting,
            Stage::Translating,
            Stage::PageFallback,
            Stage::Assembling,
        ]
    );
    assert_eq!(*log.completed.lock().unwrap(), Some(OutcomeStatus::Succeeded));
}

#[tokio::test]
async fn each_retry_is_reported() {
    let h = Harness::new(
        FakeTranslator::new(|_, _| Err(TranslateError::transient("overloaded"))),
        vec![],
    );
    let log = Arc::new(StageLog::default());
    let config = h.config().progress_callback(log.clone()).build().unwrap();

    translate_upload(Some("a.txt"), b"Hello".to_vec(), "ta", &config)
        .await
        .unwrap();

    assert_eq!(log.attempts.lock().unwrap().as_slice(), [1, 2, 3]);
    assert_eq!(*log.completed.lock().unwrap(), Some(OutcomeStatus::Degraded));
}

// ── Inspect ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn inspect_reports_pdf_structure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.pdf");
    std::fs::write(&path, PDF_BYTES).unwrap();

    let h = Harness::new(FakeTranslator::tagging(), scanned_pdf());
    let config = h.config().build().unwrap();

    let report = inspect(path.to_str().unwrap(), &config).await.unwrap();
    assert_eq!(report.file_kind, DocumentKind::Pdf);
    assert_eq!(report.page_count, Some(3));
    assert_eq!(report.pages_with_text, Some(3));
    assert_eq!(report.image_count, Some(3));
    assert_eq!(h.translator.call_count(), 0);
}

#[tokio::test]
async fn inspect_rejects_disallowed_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.docx");
    std::fs::write(&path, b"x").unwrap();

    let err = inspect(path.to_str().unwrap(), &PipelineConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DocTranslateError::UnsupportedFileType { .. }));
}
