//! Language codes: provider normalization and speech-engine tags.
//!
//! The remote provider only understands upper-case two-letter codes, while
//! speech engines want full BCP-47 tags. Both are derived from the same
//! fixed table of supported languages.

/// Provider code used when a tag is not recognized.
pub const DEFAULT_PROVIDER_CODE: &str = "EN";

/// Speech tag used when a tag is not recognized.
pub const DEFAULT_SPEECH_TAG: &str = "en-US";

/// Metadata for one supported language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageConfig {
    /// ISO 639-1 code (e.g., "ja", "en")
    pub code: &'static str,

    /// Code sent to the translation provider (e.g., "JA", "EN")
    pub provider_code: &'static str,

    /// English name of the language
    pub name: &'static str,

    /// Tag handed to speech recognition/synthesis engines (e.g., "ja-JP")
    pub speech_tag: &'static str,
}

/// All languages the provider and the speech engines are driven with.
pub const LANGUAGES: [LanguageConfig; 10] = [
    LanguageConfig { code: "ja", provider_code: "JA", name: "Japanese", speech_tag: "ja-JP" },
    LanguageConfig { code: "en", provider_code: "EN", name: "English", speech_tag: "en-US" },
    LanguageConfig { code: "zh", provider_code: "ZH", name: "Chinese", speech_tag: "zh-CN" },
    LanguageConfig { code: "de", provider_code: "DE", name: "German", speech_tag: "de-DE" },
    LanguageConfig { code: "fr", provider_code: "FR", name: "French", speech_tag: "fr-FR" },
    LanguageConfig { code: "es", provider_code: "ES", name: "Spanish", speech_tag: "es-ES" },
    LanguageConfig { code: "it", provider_code: "IT", name: "Italian", speech_tag: "it-IT" },
    LanguageConfig { code: "pt", provider_code: "PT", name: "Portuguese", speech_tag: "pt-PT" },
    LanguageConfig { code: "ru", provider_code: "RU", name: "Russian", speech_tag: "ru-RU" },
    LanguageConfig { code: "ko", provider_code: "KO", name: "Korean", speech_tag: "ko-KR" },
];

/// Look up a language by any tag whose first two characters name it.
///
/// Matching is case-insensitive, so "JA", "ja-JP" and "ja_jp" all resolve
/// to Japanese.
pub fn lookup(tag: &str) -> Option<&'static LanguageConfig> {
    let prefix: String = tag.chars().take(2).collect::<String>().to_lowercase();
    LANGUAGES.iter().find(|lang| lang.code == prefix)
}

/// Normalize an arbitrary language tag to the provider's code.
///
/// Unknown tags fail open to [`DEFAULT_PROVIDER_CODE`] so an unrecognized
/// tag never blocks a translation.
pub fn normalize(tag: &str) -> &'static str {
    lookup(tag)
        .map(|lang| lang.provider_code)
        .unwrap_or(DEFAULT_PROVIDER_CODE)
}

/// Speech-engine tag for a language code, falling back to [`DEFAULT_SPEECH_TAG`].
pub fn speech_tag(tag: &str) -> &'static str {
    lookup(tag)
        .map(|lang| lang.speech_tag)
        .unwrap_or(DEFAULT_SPEECH_TAG)
}
