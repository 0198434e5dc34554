//! Language detection: map extracted text to one of the supported labels.
//!
//! The identification capability returns an ISO-639-1 code or fails.
//! [`detect`] folds both outcomes into a [`DetectedLanguage`]: codes found in
//! [`LANGUAGE_NAMES`] map to their label, everything else (unmapped codes,
//! empty input, identifier failures) maps to [`DetectedLanguage::Unknown`].
//! Callers never see an error.
//!
//! ## Memory
//!
//! [`LinguaIdentifier`] covers every lingua language. Models load lazily on
//! the first detections that need them, and with all of them resident the
//! detector holds on the order of 1 GB in high-accuracy mode. Low-accuracy
//! mode keeps only trigram models (roughly a tenth of that) at some cost on
//! short inputs. Long-running processes should build the identifier once, at
//! startup, with [`LinguaIdentifier::preloaded`] so the first request does
//! not pay the load.

use crate::error::{DetectError, DocTranslateError};
use lingua::{LanguageDetector, LanguageDetectorBuilder};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// A detection result. Always defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectedLanguage {
    English,
    Hindi,
    Tamil,
    Unknown,
}

/// Code → label table. The only source of truth for known languages.
pub const LANGUAGE_NAMES: &[(&str, DetectedLanguage)] = &[
    ("en", DetectedLanguage::English),
    ("hi", DetectedLanguage::Hindi),
    ("ta", DetectedLanguage::Tamil),
];

impl DetectedLanguage {
    /// Look `code` up in [`LANGUAGE_NAMES`]; unmapped codes are `Unknown`.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim().to_ascii_lowercase();
        LANGUAGE_NAMES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, lang)| *lang)
            .unwrap_or(Self::Unknown)
    }

    /// Full name shown to users: "English", "Hindi", "Tamil" or "Unknown".
    pub fn name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Tamil => "Tamil",
            Self::Unknown => "Unknown",
        }
    }

    /// ISO-639-1 code, `None` for `Unknown`.
    pub fn code(&self) -> Option<&'static str> {
        LANGUAGE_NAMES
            .iter()
            .find(|(_, lang)| lang == self)
            .map(|(c, _)| *c)
    }

    /// `true` when this label names the language of `code`. `Unknown` never matches.
    pub fn matches_code(&self, code: &str) -> bool {
        self.code()
            .is_some_and(|c| c.eq_ignore_ascii_case(code.trim()))
    }
}

impl fmt::Display for DetectedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Language-identification capability.
pub trait LanguageIdentifier: Send + Sync {
    /// Return the ISO-639-1 code of `text`'s language.
    fn identify(&self, text: &str) -> Result<String, DetectError>;
}

/// Map `text` to a [`DetectedLanguage`], swallowing identifier failures.
pub fn detect(identifier: &dyn LanguageIdentifier, text: &str) -> DetectedLanguage {
    match identifier.identify(text) {
        Ok(code) => {
            let lang = DetectedLanguage::from_code(&code);
            debug!("Identified language code '{}' → {}", code, lang);
            lang
        }
        Err(e) => {
            debug!("Language identification failed ({}); reporting Unknown", e);
            DetectedLanguage::Unknown
        }
    }
}

/// [`LanguageIdentifier`] backed by the `lingua` n-gram models.
///
/// Built over all languages so that text in an unsupported language is
/// identified as such (and reported `Unknown`) instead of being forced onto
/// the closest of English/Hindi/Tamil.
pub struct LinguaIdentifier {
    detector: LanguageDetector,
}

impl LinguaIdentifier {
    /// High accuracy, models loaded on demand.
    pub fn new() -> Self {
        Self::build(false, false)
    }

    /// Trigram models only: much smaller, less reliable on a few words.
    pub fn low_accuracy() -> Self {
        Self::build(true, false)
    }

    /// Load every model now instead of on the first detections.
    pub fn preloaded(low_accuracy: bool) -> Self {
        Self::build(low_accuracy, true)
    }

    fn build(low_accuracy: bool, preload: bool) -> Self {
        let mut builder = LanguageDetectorBuilder::from_all_languages();
        if low_accuracy {
            builder.with_low_accuracy_mode();
        }
        if preload {
            builder.with_preloaded_language_models();
        }
        debug!(
            "Building lingua detector (low_accuracy={}, preload={})",
            low_accuracy, preload
        );
        Self {
            detector: builder.build(),
        }
    }
}

impl Default for LinguaIdentifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageIdentifier for LinguaIdentifier {
    fn identify(&self, text: &str) -> Result<String, DetectError> {
        if !text.chars().any(char::is_alphabetic) {
            return Err(DetectError::NoFeatures);
        }
        self.detector
            .detect_language_of(text)
            .map(|lang| lang.iso_code_639_1().to_string().to_ascii_lowercase())
            .ok_or(DetectError::Inconclusive)
    }
}

static LANGUAGE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{2,3}(-[a-z0-9]{2,8})?$").expect("valid regex"));

/// Normalise and validate a destination language code (`"TA"` → `"ta"`).
///
/// Accepts ISO-639-1/2 codes with an optional region or script subtag
/// (`"zh-cn"`). Translation targets are not limited to the detection table.
pub fn normalize_language_code(code: &str) -> Result<String, DocTranslateError> {
    let normalized = code.trim().to_ascii_lowercase().replace('_', "-");
    if LANGUAGE_CODE.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(DocTranslateError::InvalidLanguageCode {
            code: code.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<&'static str, DetectError>);

    impl LanguageIdentifier for Fixed {
        fn identify(&self, _text: &str) -> Result<String, DetectError> {
            self.0.clone().map(str::to_string)
        }
    }

    static LINGUA: Lazy<LinguaIdentifier> = Lazy::new(LinguaIdentifier::new);

    #[test]
    fn table_codes_map_to_names() {
        assert_eq!(detect(&Fixed(Ok("en")), "x"), DetectedLanguage::English);
        assert_eq!(detect(&Fixed(Ok("hi")), "x"), DetectedLanguage::Hindi);
        assert_eq!(detect(&Fixed(Ok("ta")), "x"), DetectedLanguage::Tamil);
        assert_eq!(detect(&Fixed(Ok("EN")), "x"), DetectedLanguage::English);
    }

    #[test]
    fn unmapped_code_is_unknown_not_passed_through() {
        assert_eq!(detect(&Fixed(Ok("fr")), "Bonjour"), DetectedLanguage::Unknown);
        assert_eq!(detect(&Fixed(Ok("")), ""), DetectedLanguage::Unknown);
    }

    #[test]
    fn identifier_failure_is_unknown() {
        assert_eq!(
            detect(&Fixed(Err(DetectError::NoFeatures)), ""),
            DetectedLanguage::Unknown
        );
        assert_eq!(
            detect(&Fixed(Err(DetectError::Inconclusive)), "zzz"),
            DetectedLanguage::Unknown
        );
    }

    #[test]
    fn names_and_codes() {
        assert_eq!(DetectedLanguage::Tamil.name(), "Tamil");
        assert_eq!(DetectedLanguage::Unknown.name(), "Unknown");
        assert_eq!(DetectedLanguage::Hindi.code(), Some("hi"));
        assert_eq!(DetectedLanguage::Unknown.code(), None);
        assert!(DetectedLanguage::English.matches_code("EN"));
        assert!(!DetectedLanguage::English.matches_code("ta"));
        assert!(!DetectedLanguage::Unknown.matches_code("unknown"));
    }

    #[test]
    fn lingua_identifies_supported_scripts() {
        assert_eq!(
            detect(&*LINGUA, "This is a simple English sentence about the weather today."),
            DetectedLanguage::English
        );
        assert_eq!(
            detect(&*LINGUA, "இது ஒரு எளிய தமிழ் வாக்கியம், இன்று வானிலை நன்றாக உள்ளது."),
            DetectedLanguage::Tamil
        );
    }

    #[test]
    fn low_accuracy_mode_still_separates_scripts() {
        let lingua = LinguaIdentifier::low_accuracy();
        assert_eq!(
            detect(&lingua, "The committee will publish its annual report on the website next week."),
            DetectedLanguage::English
        );
        assert_eq!(
            detect(&lingua, "यह एक सरल हिंदी वाक्य है और आज मौसम बहुत अच्छा है।"),
            DetectedLanguage::Hindi
        );
        assert_eq!(detect(&lingua, "   "), DetectedLanguage::Unknown);
    }

    #[test]
    fn lingua_never_fails_on_degenerate_input() {
        let garbage = String::from_utf8_lossy(b"\xFF\xFE\xFD").to_string();
        for text in ["", "   \n\t", "12345 678", garbage.as_str()] {
            let lang = detect(&*LINGUA, text);
            assert_eq!(lang, DetectedLanguage::Unknown, "input {text:?}");
        }
    }

    #[test]
    fn language_code_normalisation() {
        assert_eq!(normalize_language_code(" TA ").unwrap(), "ta");
        assert_eq!(normalize_language_code("zh_CN").unwrap(), "zh-cn");
        assert_eq!(normalize_language_code("fil").unwrap(), "fil");
        for bad in ["", "t", "tamil", "t4", "en-"] {
            assert!(
                matches!(
                    normalize_language_code(bad),
                    Err(DocTranslateError::InvalidLanguageCode { .. })
                ),
                "{bad:?}"
            );
        }
    }
}
