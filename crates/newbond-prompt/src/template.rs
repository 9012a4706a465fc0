//! Core prompt template trait

use crate::{Language, PromptError, Result};

/// A named prompt with one source per language.
///
/// Variables are passed as `serde_json::Value` so the trait stays dyn-compatible
/// and templates can live in the registry as `Arc<dyn PromptTemplate>`.
pub trait PromptTemplate: Send + Sync {
    /// Template identifier
    fn name(&self) -> &str;

    /// Languages this template has a variant for
    fn languages(&self) -> Vec<Language>;

    fn supports_language(&self, lang: &Language) -> bool {
        self.languages().contains(lang)
    }

    /// Render the variant for `lang`; errors when the variant is missing
    fn render(&self, lang: &Language, vars: &serde_json::Value) -> Result<String>;

    /// Render `lang`, falling back to English, then to any available variant
    fn render_with_fallback(&self, lang: &Language, vars: &serde_json::Value) -> Result<String> {
        if self.supports_language(lang) {
            return self.render(lang, vars);
        }
        if self.supports_language(&Language::English) {
            return self.render(&Language::English, vars);
        }

        let fallback = self
            .languages()
            .into_iter()
            .next()
            .ok_or_else(|| PromptError::NoLanguageAvailable(self.name().to_string()))?;
        self.render(&fallback, vars)
    }

    /// Raw source of a variant
    fn raw_template(&self, lang: &Language) -> Option<&str>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Fixed-text template used to exercise the provided methods
    struct Fixed(Vec<(Language, &'static str)>);

    impl PromptTemplate for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn languages(&self) -> Vec<Language> {
            self.0.iter().map(|(l, _)| l.clone()).collect()
        }

        fn render(&self, lang: &Language, _vars: &serde_json::Value) -> Result<String> {
            self.raw_template(lang)
                .map(ToString::to_string)
                .ok_or_else(|| PromptError::TemplateNotFound {
                    name: "fixed".into(),
                    language: lang.code().into(),
                })
        }

        fn raw_template(&self, lang: &Language) -> Option<&str> {
            self.0.iter().find(|(l, _)| l == lang).map(|(_, s)| *s)
        }
    }

    #[test]
    fn test_fallback_prefers_english() {
        let t = Fixed(vec![(Language::Korean, "안녕"), (Language::English, "Hello")]);
        let out = t
            .render_with_fallback(&Language::Other("ja".into()), &json!({}))
            .unwrap();
        assert_eq!(out, "Hello");
    }

    #[test]
    fn test_fallback_to_first_available() {
        let t = Fixed(vec![(Language::Korean, "안녕")]);
        let out = t.render_with_fallback(&Language::English, &json!({})).unwrap();
        assert_eq!(out, "안녕");
    }

    #[test]
    fn test_fallback_without_variants() {
        let t = Fixed(vec![]);
        assert!(matches!(
            t.render_with_fallback(&Language::Korean, &json!({})),
            Err(PromptError::NoLanguageAvailable(_))
        ));
    }
}
