//! Prompt templates for newbond
//!
//! Every LLM-facing string in the workspace (earnings prompts, analyst system
//! prompts, news assistant instructions) is a [`JinjaTemplate`] with English
//! and Korean variants, looked up through a [`PromptRegistry`] whose default
//! language is the configured response language.
//!
//! ```
//! use newbond_prompt::{JinjaTemplate, Language, PromptRegistry};
//! use serde_json::json;
//!
//! let registry = PromptRegistry::with_language(Language::Korean);
//! registry.register(JinjaTemplate::bilingual(
//!     "analyze",
//!     "Analyze {{ symbol }}",
//!     "{{ symbol }}을 분석해줘",
//! ).unwrap());
//!
//! let prompt = registry.render("analyze", &json!({ "symbol": "AAPL" })).unwrap();
//! assert_eq!(prompt, "AAPL을 분석해줘");
//! ```

mod error;
mod jinja;
mod language;
mod registry;
mod template;

pub use error::{PromptError, Result};
pub use jinja::{JinjaTemplate, JinjaTemplateBuilder};
pub use language::Language;
pub use registry::PromptRegistry;
pub use template::PromptTemplate;
