//! Prompts for LLM-backed translation and vision OCR.
//!
//! Every prompt lives here so changing model instructions never touches the
//! retry or error-handling code. Callers can override the translation prompt
//! via [`crate::config::PipelineConfig::system_prompt`]; the placeholders
//! `{source}` and `{destination}` are substituted in overrides too.

/// Default system prompt for translating a block of text.
pub const DEFAULT_TRANSLATION_PROMPT: &str = r#"You are a professional translator. Translate the user's text from {source} into {destination}.

Follow these rules precisely:

1. Translate ALL of the text; do not summarise or omit anything
2. Preserve line breaks, numbering and punctuation style
3. Keep proper nouns, numbers, URLs and code unchanged
4. If part of the text is already in {destination}, keep it as is
5. Output ONLY the translated text
   - Do NOT add commentary, notes or explanations
   - Do NOT wrap the output in quotes or code fences
   - Do NOT prefix it with "Translation:" or similar"#;

/// Source description used when the source language is not known.
pub const AUTO_SOURCE: &str = "the language it is written in (detect it)";

/// Prompt for reading text off an image with a vision model.
pub const VISION_OCR_PROMPT: &str = r#"Extract all text from this image exactly as written.
The text may be in English, Hindi (Devanagari script) or Tamil script.
Keep the original script; do not translate or transliterate.
Return only the extracted text, nothing else. If there is no text, return an empty reply."#;

/// Fill the `{source}` / `{destination}` placeholders of a translation prompt.
///
/// `source` is an ISO code or `"auto"`; codes are rendered as-is because
/// models understand ISO-639 codes directly.
pub fn translation_prompt(template: &str, source: &str, destination: &str) -> String {
    let source = if source.eq_ignore_ascii_case("auto") {
        AUTO_SOURCE.to_string()
    } else {
        format!("the language with ISO-639 code '{source}'")
    };
    let destination = format!("the language with ISO-639 code '{destination}'");
    template
        .replace("{source}", &source)
        .replace("{destination}", &destination)
}
