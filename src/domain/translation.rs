use crate::domain::error::DomainError;

/// Placeholder shown when the gateway returns no transcription text.
pub const NO_TEXT_PLACEHOLDER: &str = "No text detected";

/// Placeholder shown when the gateway returns no translation text.
pub const NO_TRANSLATION_PLACEHOLDER: &str = "Translation not available";

/// A language the translation gateway accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Two-letter code sent over the wire (e.g. "en").
    pub code: &'static str,
    /// Human-readable name.
    pub name: &'static str,
}

/// Languages the gateway supports for both transcription and synthesis.
pub const SUPPORTED_LANGUAGES: &[Language] = &[
    Language { code: "en", name: "English" },
    Language { code: "es", name: "Spanish" },
    Language { code: "de", name: "German" },
    Language { code: "it", name: "Italian" },
    Language { code: "pt", name: "Portuguese" },
    Language { code: "ja", name: "Japanese" },
    Language { code: "ko", name: "Korean" },
    Language { code: "zh", name: "Chinese (Mandarin)" },
    Language { code: "ar", name: "Arabic" },
    Language { code: "hi", name: "Hindi" },
    Language { code: "ru", name: "Russian" },
    Language { code: "nl", name: "Dutch" },
    Language { code: "tr", name: "Turkish" },
    Language { code: "pl", name: "Polish" },
    Language { code: "sv", name: "Swedish" },
    Language { code: "da", name: "Danish" },
];

impl Language {
    /// Look up a language by its wire code.
    pub fn find(code: &str) -> Option<&'static Language> {
        SUPPORTED_LANGUAGES.iter().find(|l| l.code == code)
    }
}

/// Validated source/target pair for one translation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub source: &'static Language,
    pub target: &'static Language,
}

impl LanguagePair {
    /// Build a pair from wire codes, rejecting codes the gateway would
    /// silently remap server-side.
    pub fn new(source: &str, target: &str) -> Result<Self, DomainError> {
        let source = Language::find(source)
            .ok_or_else(|| DomainError::UnsupportedLanguage(source.to_string()))?;
        let target = Language::find(target)
            .ok_or_else(|| DomainError::UnsupportedLanguage(target.to_string()))?;
        Ok(Self { source, target })
    }
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self {
            source: &SUPPORTED_LANGUAGES[0],
            target: &SUPPORTED_LANGUAGES[1],
        }
    }
}

/// Completed translation as reported by the gateway.
///
/// All fields are optional on the wire, so presentation falls back to
/// fixed placeholders when text is missing or empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationResult {
    pub original_text: Option<String>,
    pub translated_text: Option<String>,
    pub audio_url: Option<String>,
}

impl TranslationResult {
    /// Transcribed source text, or the placeholder when absent or empty.
    pub fn original_text_display(&self) -> &str {
        self.original_text
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(NO_TEXT_PLACEHOLDER)
    }

    /// Translated text, or the placeholder when absent or empty.
    pub fn translated_text_display(&self) -> &str {
        self.translated_text
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(NO_TRANSLATION_PLACEHOLDER)
    }

    /// URL of the synthesized audio, if the gateway produced one.
    pub fn audio_url(&self) -> Option<&str> {
        self.audio_url.as_deref().filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_lookup() {
        assert_eq!(Language::find("en").map(|l| l.name), Some("English"));
        assert_eq!(Language::find("da").map(|l| l.name), Some("Danish"));
        assert!(Language::find("fr").is_none());
        assert!(Language::find("id").is_none());
    }

    #[test]
    fn test_language_pair_validation() {
        let pair = LanguagePair::new("en", "es").unwrap();
        assert_eq!(pair.source.code, "en");
        assert_eq!(pair.target.code, "es");

        let err = LanguagePair::new("en", "xx").unwrap_err();
        assert!(err.to_string().contains("xx"));
    }

    #[test]
    fn test_result_placeholders() {
        let result = TranslationResult::default();
        assert_eq!(result.original_text_display(), NO_TEXT_PLACEHOLDER);
        assert_eq!(result.translated_text_display(), NO_TRANSLATION_PLACEHOLDER);
        assert!(result.audio_url().is_none());
    }

    #[test]
    fn test_result_empty_strings_fall_back() {
        let result = TranslationResult {
            original_text: Some(String::new()),
            translated_text: Some(String::new()),
            audio_url: Some(String::new()),
        };
        assert_eq!(result.original_text_display(), NO_TEXT_PLACEHOLDER);
        assert_eq!(result.translated_text_display(), NO_TRANSLATION_PLACEHOLDER);
        assert!(result.audio_url().is_none());
    }

    #[test]
    fn test_result_with_text() {
        let result = TranslationResult {
            original_text: Some("hello".to_string()),
            translated_text: Some("hola".to_string()),
            audio_url: Some("https://example.com/out.mp3".to_string()),
        };
        assert_eq!(result.original_text_display(), "hello");
        assert_eq!(result.translated_text_display(), "hola");
        assert_eq!(result.audio_url(), Some("https://example.com/out.mp3"));
    }
}
