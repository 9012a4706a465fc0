//! Response languages for prompt templates
//!
//! Prompts are authored in English and Korean. `Other` carries any further
//! ISO 639-1 code so a template can add a variant without touching this enum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language of a prompt variant
///
/// # Examples
///
/// ```
/// use newbond_prompt::Language;
///
/// let lang = Language::Korean;
/// assert_eq!(lang.code(), "ko");
/// assert_eq!(Language::from_code("한국어"), Language::Korean);
/// assert_eq!(Language::from_code("ja"), Language::Other("ja".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(into = "String", from = "String")]
pub enum Language {
    /// English
    English,
    /// Korean, the language analysts read the reports in
    #[default]
    Korean,
    /// Other languages (ISO 639-1 code)
    Other(String),
}

impl Language {
    /// ISO 639-1 code
    pub fn code(&self) -> &str {
        match self {
            Language::English => "en",
            Language::Korean => "ko",
            Language::Other(code) => code,
        }
    }

    /// English display name, also used when a prompt says "answer in X"
    pub fn name(&self) -> &str {
        match self {
            Language::English => "English",
            Language::Korean => "Korean",
            Language::Other(code) => code,
        }
    }

    /// Parse from an ISO code or a common name; unknown input becomes `Other`
    pub fn from_code(s: &str) -> Self {
        let lowered = s.trim().to_lowercase();
        match lowered.as_str() {
            "en" | "english" | "en-us" => Language::English,
            "ko" | "korean" | "kr" | "ko-kr" | "한국어" => Language::Korean,
            _ => Language::Other(lowered),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for Language {
    fn from(s: &str) -> Self {
        Language::from_code(s)
    }
}

impl From<String> for Language {
    fn from(s: String) -> Self {
        Language::from_code(&s)
    }
}

impl From<Language> for String {
    fn from(lang: Language) -> Self {
        lang.code().to_string()
    }
}
