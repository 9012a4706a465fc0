//! MiniJinja-backed templates
//!
//! Prompt text is whitespace sensitive (the LLM sees every newline), so the
//! environment keeps trailing newlines and never auto-escapes.

use crate::{Language, PromptError, PromptTemplate, Result};
use minijinja::{AutoEscape, Environment};
use std::collections::HashMap;

/// A prompt template with one Jinja source per language.
///
/// Besides the MiniJinja builtins, templates can use `fixed(n)` to print a
/// number with `n` decimals (default 2).
///
/// # Examples
///
/// ```
/// use newbond_prompt::{JinjaTemplate, Language, PromptTemplate};
/// use serde_json::json;
///
/// let template = JinjaTemplate::bilingual(
///     "price",
///     "Closed at ${{ close | fixed }}",
///     "종가는 ${{ close | fixed }}입니다",
/// ).unwrap();
///
/// let ko = template.render(&Language::Korean, &json!({ "close": 187.5 })).unwrap();
/// assert_eq!(ko, "종가는 $187.50입니다");
/// ```
pub struct JinjaTemplate {
    name: String,
    templates: HashMap<Language, String>,
}

impl JinjaTemplate {
    pub fn builder(name: impl Into<String>) -> JinjaTemplateBuilder {
        JinjaTemplateBuilder::new(name)
    }

    /// Single English variant
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Result<Self> {
        Self::builder(name).english(template).build()
    }

    /// English and Korean variants
    pub fn bilingual(
        name: impl Into<String>,
        english: impl Into<String>,
        korean: impl Into<String>,
    ) -> Result<Self> {
        Self::builder(name).english(english).korean(korean).build()
    }
}

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.add_filter("fixed", |value: f64, digits: Option<u32>| {
        format!("{:.*}", digits.unwrap_or(2) as usize, value)
    });
    env
}

impl PromptTemplate for JinjaTemplate {
    fn name(&self) -> &str {
        &self.name
    }

    fn languages(&self) -> Vec<Language> {
        self.templates.keys().cloned().collect()
    }

    fn render(&self, lang: &Language, vars: &serde_json::Value) -> Result<String> {
        let source = self
            .templates
            .get(lang)
            .ok_or_else(|| PromptError::TemplateNotFound {
                name: self.name.clone(),
                language: lang.code().to_string(),
            })?;

        environment()
            .render_str(source, minijinja::Value::from_serialize(vars))
            .map_err(|e| PromptError::RenderError {
                name: self.name.clone(),
                detail: e.to_string(),
            })
    }

    fn raw_template(&self, lang: &Language) -> Option<&str> {
        self.templates.get(lang).map(String::as_str)
    }
}

impl std::fmt::Debug for JinjaTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JinjaTemplate")
            .field("name", &self.name)
            .field("languages", &self.templates.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`JinjaTemplate`]
pub struct JinjaTemplateBuilder {
    name: String,
    templates: HashMap<Language, String>,
}

impl JinjaTemplateBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            templates: HashMap::new(),
        }
    }

    /// Add a variant for a specific language
    pub fn template(mut self, lang: Language, content: impl Into<String>) -> Self {
        self.templates.insert(lang, content.into());
        self
    }

    pub fn english(self, content: impl Into<String>) -> Self {
        self.template(Language::English, content)
    }

    pub fn korean(self, content: impl Into<String>) -> Self {
        self.template(Language::Korean, content)
    }

    /// Parse every variant and finish.
    ///
    /// Sources are only compiled here, not rendered, so templates that need
    /// variables still validate.
    pub fn build(self) -> Result<JinjaTemplate> {
        if self.templates.is_empty() {
            return Err(PromptError::NoTemplatesProvided(self.name));
        }

        let env = environment();
        for (lang, content) in &self.templates {
            env.template_from_str(content)
                .map_err(|e| PromptError::TemplateParseFailed {
                    name: self.name.clone(),
                    language: lang.code().to_string(),
                    detail: e.to_string(),
                })?;
        }

        Ok(JinjaTemplate {
            name: self.name,
            templates: self.templates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bilingual_render() {
        let template =
            JinjaTemplate::bilingual("intro", "{{ name }} is listed", "{{ name }}은 상장된 기업입니다")
                .unwrap();

        let en = template
            .render(&Language::English, &json!({ "name": "Apple Inc" }))
            .unwrap();
        assert_eq!(en, "Apple Inc is listed");

        let ko = template
            .render(&Language::Korean, &json!({ "name": "Apple Inc" }))
            .unwrap();
        assert_eq!(ko, "Apple Inc은 상장된 기업입니다");
    }

    #[test]
    fn test_trailing_newline_is_kept() {
        let template = JinjaTemplate::new("line", "[Headline]: {{ h }} \n").unwrap();
        let out = template
            .render(&Language::English, &json!({ "h": "Record quarter" }))
            .unwrap();
        assert_eq!(out, "[Headline]: Record quarter \n");
    }

    #[test]
    fn test_no_html_escaping() {
        let template = JinjaTemplate::new("raw", "{{ text }}").unwrap();
        let out = template
            .render(&Language::English, &json!({ "text": "R&D <up> \"10%\"" }))
            .unwrap();
        assert_eq!(out, "R&D <up> \"10%\"");
    }

    #[test]
    fn test_fixed_filter() {
        let template = JinjaTemplate::new("num", "{{ a | fixed }} {{ b | fixed(1) }}").unwrap();
        let out = template
            .render(&Language::English, &json!({ "a": 3, "b": 10.04 }))
            .unwrap();
        assert_eq!(out, "3.00 10.0");
    }

    #[test]
    fn test_build_validates_without_vars() {
        // A filter on an undefined variable must not fail at build time
        assert!(JinjaTemplate::new("ok", "{{ price | fixed }}").is_ok());
        assert!(JinjaTemplate::new("bad", "{{ unclosed").is_err());
        assert!(JinjaTemplate::builder("empty").build().is_err());
    }

    #[test]
    fn test_conditional_wording() {
        let template = JinjaTemplate::new(
            "move",
            "{% if direction == 'up' %}rose{% elif direction == 'down' %}fell{% else %}was flat{% endif %}",
        )
        .unwrap();
        let out = template
            .render(&Language::English, &json!({ "direction": "down" }))
            .unwrap();
        assert_eq!(out, "fell");
    }

    #[test]
    fn test_missing_language() {
        let template = JinjaTemplate::new("en_only", "Hello").unwrap();
        assert!(matches!(
            template.render(&Language::Korean, &json!({})),
            Err(PromptError::TemplateNotFound { .. })
        ));
        assert_eq!(template.raw_template(&Language::English), Some("Hello"));
    }
}
