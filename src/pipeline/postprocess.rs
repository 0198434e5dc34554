//! Post-processing: deterministic cleanup of model replies and OCR output.
//!
//! Even with a strict prompt, chat models wrap translations in code fences or
//! open with "Translation:" now and then, and tesseract ends every page with a
//! form feed. These rules remove such artefacts without touching content.
//!
//! Two entry points, each a fixed sequence of pure `&str → String` passes:
//!
//! * [`clean_translation`] — for translation replies
//! * [`clean_ocr_text`]    — for OCR engine output
//!
//! Both return an empty string for blank input so callers can test emptiness
//! directly.

use once_cell::sync::Lazy;
use regex::Regex;

/// Clean a translation reply.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF → LF)
/// 2. Strip outer code fences
/// 3. Drop a leading "Translation:" / "Here is the translation…:" label line
/// 4. Strip invisible Unicode
/// 5. Trim surrounding whitespace
pub fn clean_translation(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = strip_outer_fences(&s);
    let s = strip_preamble(&s);
    let s = remove_invisible_chars(&s);
    s.trim().to_string()
}

/// Clean OCR output.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF → LF)
/// 2. Remove form feeds (page breaks emitted by tesseract)
/// 3. Trim trailing whitespace per line
/// 4. Collapse 3+ consecutive blank lines down to 1
/// 5. Strip invisible Unicode
/// 6. Trim surrounding whitespace
pub fn clean_ocr_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = s.replace('\u{000C}', "");
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    let s = remove_invisible_chars(&s);
    s.trim().to_string()
}

// ── Rule: Normalise line endings ─────────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule: Strip outer code fences ────────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z0-9_-]*\n(.*)\n```\s*$").expect("valid regex"));

fn strip_outer_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule: Drop a leading preamble line ───────────────────────────────────────

// Only a label alone on the first line is dropped; "Translation: …" running
// into the sentence is content.
static RE_PREAMBLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:here is the translation[^\n:]*|here's the translation[^\n:]*|translation|translated text)[ \t]*:[ \t]*\n")
        .expect("valid regex")
});

fn strip_preamble(input: &str) -> String {
    RE_PREAMBLE.replace(input, "").to_string()
}

// ── Rule: Trim trailing whitespace per line ──────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule: Collapse excessive blank lines ─────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Rule: Remove invisible Unicode characters ────────────────────────────────

// ZWJ/ZWNJ are left alone: Devanagari and Tamil use them to control conjuncts.
fn remove_invisible_chars(input: &str) -> String {
    input.replace(['\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{2060}'], "")
}

// ── Tests ────────────────────────────────────────────────────────────────────
