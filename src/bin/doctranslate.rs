//! CLI binary for edgequake-doctranslate.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `PipelineConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_doctranslate::config::ProgressCallback;
use edgequake_doctranslate::{
    inspect, translate_file, translate_to_file, DetectedLanguage, OcrBackend, OcrFallbackScope,
    OutcomeStatus, OutputFormat, PipelineConfig, PipelineProgressCallback, Stage,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner that follows the pipeline stage, plus one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_stage(&self, stage: Stage) {
        self.bar.set_prefix(stage.to_string());
        self.bar.set_message("");
    }

    fn on_page_extracted(&self, page_index: usize, chars: usize, ocr: bool) {
        self.bar.println(format!(
            "  {} Page {:>3}  {}  {}",
            green("✓"),
            page_index + 1,
            dim(&format!("{chars:>6} chars")),
            if ocr { dim("ocr") } else { dim("text layer") },
        ));
    }

    fn on_language_detected(&self, language: DetectedLanguage) {
        self.bar
            .println(format!("  {} Source language: {}", green("✓"), bold(language.name())));
    }

    fn on_translation_attempt(&self, attempt: u32, max_attempts: u32) {
        self.bar.set_message(format!("attempt {attempt}/{max_attempts}"));
    }

    fn on_complete(&self, status: OutcomeStatus) {
        self.bar.finish_and_clear();
        match status {
            OutcomeStatus::Succeeded => eprintln!("{} Translation complete", green("✔")),
            OutcomeStatus::Degraded => eprintln!("{} Translation failed; output is degraded", yellow("⚠")),
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Translate a text file to Tamil, print to stdout
  doctranslate hello.txt --to ta --format txt

  # Translate a scanned PDF to Hindi, write a .docx
  doctranslate scan.pdf --to hi -o scan-hi.docx

  # OCR with a vision model instead of tesseract
  doctranslate photo.jpg --to en --ocr vision --model gpt-4.1-mini

  # OCR image-only pages even after a page with a text layer
  doctranslate mixed.pdf --to ta --fallback-scope per-page -o mixed.docx

  # Inspect a document (no API key needed)
  doctranslate --inspect-only report.pdf

  # JSON output with segments, outcome and stats
  doctranslate notice.pdf --to ta --json > result.json

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium
  RUST_LOG                Log filter (overrides -v / -q)

SETUP:
  1. Install tesseract with eng, hin and tam language data
  2. Set API key:     export OPENAI_API_KEY=sk-...
  3. Translate:       doctranslate document.pdf --to ta -o translated.docx
"#;

/// Translate text, PDF and image documents with LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "doctranslate",
    version,
    about = "Translate text, PDF and image documents using LLMs",
    long_about = "Extract text from a .txt, .pdf, .png, .jpg or .jpeg document (with OCR \
fallback for scans), detect its language, and translate it with an LLM. Supports OpenAI, \
Anthropic, Google Gemini, Azure OpenAI, and any OpenAI-compatible endpoint.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local file path or HTTP/HTTPS URL.
    input: String,

    /// Destination language code (ISO-639, e.g. ta, hi, en).
    #[arg(short, long, env = "DOCTRANSLATE_TO", required_unless_present = "inspect_only")]
    to: Option<String>,

    /// Write the translated document to this file instead of printing the text.
    #[arg(short, long, env = "DOCTRANSLATE_OUTPUT")]
    output: Option<PathBuf>,

    /// Artifact format.
    #[arg(long, env = "DOCTRANSLATE_FORMAT", value_enum, default_value = "docx")]
    format: FormatArg,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "DOCTRANSLATE_PROVIDER")]
    provider: Option<String>,

    /// LLM model ID (default: gpt-4.1-nano).
    #[arg(long, env = "DOCTRANSLATE_MODEL")]
    model: Option<String>,

    /// OCR engine.
    #[arg(long, env = "DOCTRANSLATE_OCR", value_enum, default_value = "tesseract")]
    ocr: OcrArg,

    /// OCR language set, `+`-separated tesseract codes.
    #[arg(long, env = "DOCTRANSLATE_OCR_LANGUAGES", default_value = "eng+hin+tam")]
    ocr_languages: String,

    /// Tesseract executable.
    #[arg(long, env = "DOCTRANSLATE_TESSERACT_PATH", default_value = "tesseract")]
    tesseract_path: String,

    /// Which text decides whether a PDF page is OCR'd.
    #[arg(long, env = "DOCTRANSLATE_FALLBACK_SCOPE", value_enum, default_value = "cumulative")]
    fallback_scope: ScopeArg,

    /// Do not re-translate page by page when whole-document translation is empty.
    #[arg(long, env = "DOCTRANSLATE_NO_PAGE_FALLBACK")]
    no_page_fallback: bool,

    /// Total translation attempts per text, including the first.
    #[arg(long, env = "DOCTRANSLATE_MAX_ATTEMPTS", default_value_t = 3,
          value_parser = clap::value_parser!(u32).range(1..))]
    max_attempts: u32,

    /// Per-call translation timeout in seconds.
    #[arg(long, env = "DOCTRANSLATE_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Per-image OCR timeout in seconds.
    #[arg(long, env = "DOCTRANSLATE_OCR_TIMEOUT", default_value_t = 120)]
    ocr_timeout: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "DOCTRANSLATE_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "DOCTRANSLATE_PASSWORD")]
    password: Option<String>,

    /// Path to a text file containing a custom translation system prompt.
    #[arg(long, env = "DOCTRANSLATE_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Output structured JSON (TranslationOutput) instead of text.
    #[arg(long, env = "DOCTRANSLATE_JSON")]
    json: bool,

    /// Classify the input and count pages/images only, no translation.
    #[arg(long)]
    inspect_only: bool,

    /// Disable progress spinner.
    #[arg(long, env = "DOCTRANSLATE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCTRANSLATE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCTRANSLATE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Docx,
    Txt,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Docx => OutputFormat::Docx,
            FormatArg::Txt => OutputFormat::Txt,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OcrArg {
    Tesseract,
    Vision,
}

impl From<OcrArg> for OcrBackend {
    fn from(v: OcrArg) -> Self {
        match v {
            OcrArg::Tesseract => OcrBackend::Tesseract,
            OcrArg::Vision => OcrBackend::Vision,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ScopeArg {
    Cumulative,
    PerPage,
}

impl From<ScopeArg> for OcrFallbackScope {
    fn from(v: ScopeArg) -> Self {
        match v {
            ScopeArg::Cumulative => OcrFallbackScope::Cumulative,
            ScopeArg::PerPage => OcrFallbackScope::PerPage,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner provides the feedback that matters; keep INFO logs out of
    // its way unless -v was given.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let config = build_config(&cli, None).await?;
        let report = inspect(&cli.input, &config)
            .await
            .context("Failed to inspect document")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialize report")?
            );
        } else {
            println!("File:         {}", report.file_name);
            println!("Type:         {}", report.file_kind);
            println!("Size:         {} bytes", report.size_bytes);
            if let Some(pages) = report.page_count {
                println!("Pages:        {}", pages);
            }
            if let Some(text_pages) = report.pages_with_text {
                println!("Text layer:   {} pages", text_pages);
            }
            if let Some(images) = report.image_count {
                println!("Images:       {}", images);
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn PipelineProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb).await?;

    // ── Run translation ──────────────────────────────────────────────────
    let to = cli.to.as_deref().context("--to is required")?;
    let output = if let Some(ref output_path) = cli.output {
        translate_to_file(&cli.input, to, output_path, &config)
            .await
            .context("Translation failed")?
    } else {
        translate_file(&cli.input, to, &config)
            .await
            .context("Translation failed")?
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if cli.output.is_none() {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.document.text.as_bytes())
            .context("Failed to write to stdout")?;
        if !output.document.text.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    if !cli.quiet && !cli.json {
        let stats = &output.stats;
        eprintln!(
            "{}  {} → {}  {} attempts  {}ms{}",
            if output.outcome.is_degraded() {
                yellow("⚠")
            } else {
                green("✔")
            },
            output.detected_language,
            output.destination,
            stats.translation_attempts,
            stats.total_duration_ms,
            cli.output
                .as_ref()
                .map(|p| format!("  →  {}", bold(&p.display().to_string())))
                .unwrap_or_default(),
        );
        if output.page_fallback_used {
            eprintln!(
                "   {}",
                dim(&format!(
                    "page fallback used ({} pages translated)",
                    output.page_translations.len()
                ))
            );
        }
    }

    Ok(())
}

/// Map CLI args to `PipelineConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<PipelineConfig> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {:?}", path))?,
        )
    } else {
        None
    };

    let mut builder = PipelineConfig::builder()
        .output_format(cli.format.into())
        .ocr_backend(cli.ocr.into())
        .ocr_languages(cli.ocr_languages.clone())
        .tesseract_path(cli.tesseract_path.clone())
        .fallback_scope(cli.fallback_scope.into())
        .page_fallback(!cli.no_page_fallback)
        .max_attempts(cli.max_attempts)
        .api_timeout_secs(cli.api_timeout)
        .ocr_timeout_secs(cli.ocr_timeout)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    if let Some(prompt) = system_prompt {
        builder = builder.system_prompt(prompt);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
