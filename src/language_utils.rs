/*!
 * Language code utilities and the detector collaborator seam.
 *
 * Auto-detection itself lives outside this library; callers plug in a
 * `LanguageDetector` and this module prepares the character-bounded sample
 * it runs on.
 */

use isolang::Language;

/// Default number of characters sampled for language detection
pub const DEFAULT_DETECTION_SAMPLE_CHARS: usize = 2500;

/// Collaborator detecting the language of a text sample.
///
/// Returns an ISO 639-1 code, or `None` when detection is inconclusive.
pub trait LanguageDetector: Send + Sync {
    /// Detect the language of the sample text
    fn detect(&self, sample: &str) -> Option<String>;
}

/// Detect the source language of a list of texts using a bounded sample
pub fn detect_language(
    detector: &dyn LanguageDetector,
    texts: &[String],
    max_chars: usize,
) -> Option<String> {
    let sample = build_detection_sample(texts, max_chars);
    if sample.trim().is_empty() {
        return None;
    }
    detector.detect(&sample)
}

/// Build a detection sample by concatenating trimmed texts up to `max_chars`
/// characters, skipping empty entries
pub fn build_detection_sample(texts: &[String], max_chars: usize) -> String {
    let mut buffer: Vec<String> = Vec::new();
    let mut total = 0usize;

    for text in texts {
        if text.is_empty() {
            continue;
        }
        if total >= max_chars {
            break;
        }

        let snippet = text.trim();
        if snippet.is_empty() {
            continue;
        }

        let remaining = max_chars - total;
        let snippet: String = if snippet.chars().count() > remaining {
            snippet.chars().take(remaining).collect()
        } else {
            snippet.to_string()
        };

        total += snippet.chars().count();
        buffer.push(snippet);
    }

    buffer.join("\n")
}

/// Check whether a language code is usable for a translation request:
/// either "auto" or a known ISO 639-1 code
pub fn is_valid_language_code(code: &str) -> bool {
    let code = code.trim().to_lowercase();
    if code == "auto" {
        return true;
    }
    Language::from_639_1(&code).is_some()
}

/// English display name for an ISO 639-1 code, falling back to the code
/// itself when unknown
pub fn language_display_name(code: &str) -> String {
    Language::from_639_1(&code.trim().to_lowercase())
        .map(|lang| lang.to_name().to_string())
        .unwrap_or_else(|| code.to_string())
}
