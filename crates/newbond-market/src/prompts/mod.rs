//! Prompt templates for the earnings narrative and the news assistant
//!
//! - `earnings`: narrative fragments assembled into the user prompt
//! - `system`: analyst system prompts for the two earnings phases
//! - `news`: news assistant system prompts and user message

mod earnings;
mod news;
mod system;

pub use earnings::*;
pub use news::*;
pub use system::*;

use newbond_prompt::{Language, PromptRegistry, Result};

/// Template names
pub mod names {
    pub const COMPANY_INTRO: &str = "earnings.company_intro";
    pub const UPCOMING_HEADLINE: &str = "earnings.upcoming_headline";
    pub const RESULTS_SUMMARY: &str = "earnings.results_summary";
    pub const PRICE_MOVE: &str = "earnings.price_move";
    pub const NEWS_ITEM: &str = "earnings.news_item";
    pub const WINDOW_SECTION: &str = "earnings.window_section";
    pub const NO_THIRD_WINDOW: &str = "earnings.no_third_window";
    pub const PRE_INSTRUCTION: &str = "earnings.pre_instruction";
    pub const POST_INSTRUCTION: &str = "earnings.post_instruction";
    pub const SYSTEM_PRE: &str = "earnings.system.pre";
    pub const SYSTEM_POST: &str = "earnings.system.post";
    pub const NEWS_TRANSLATE: &str = "news.system.translate";
    pub const NEWS_OPINIONS: &str = "news.system.opinions";
    pub const NEWS_SUMMARIZE: &str = "news.system.summarize";
    pub const NEWS_USER: &str = "news.user";
}

/// Register every template with `registry`
pub fn register_prompts(registry: &PromptRegistry) -> Result<()> {
    // Earnings narrative
    registry.register(company_intro()?);
    registry.register(upcoming_headline()?);
    registry.register(results_summary()?);
    registry.register(price_move()?);
    registry.register(news_item()?);
    registry.register(window_section()?);
    registry.register(no_third_window()?);
    registry.register(pre_instruction()?);
    registry.register(post_instruction()?);

    // System prompts
    registry.register(analyst_pre_announcement()?);
    registry.register(analyst_post_announcement()?);

    // News assistant
    registry.register(news_translate()?);
    registry.register(news_opinions()?);
    registry.register(news_summarize()?);
    registry.register(news_user()?);

    Ok(())
}

/// A registry answering in `language`, with every template registered
pub fn prompt_registry(language: Language) -> Result<PromptRegistry> {
    let registry = PromptRegistry::with_language(language);
    register_prompts(&registry)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_all_prompts() {
        let registry = prompt_registry(Language::Korean).unwrap();
        assert_eq!(registry.len(), 15);
        for name in [
            names::COMPANY_INTRO,
            names::RESULTS_SUMMARY,
            names::WINDOW_SECTION,
            names::SYSTEM_POST,
            names::NEWS_USER,
        ] {
            assert!(registry.contains(name), "{name} missing");
        }
    }

    #[test]
    fn test_company_intro_korean() {
        let registry = prompt_registry(Language::Korean).unwrap();
        let intro = registry
            .render(
                names::COMPANY_INTRO,
                &json!({ "name": "Apple Inc", "ipo": "1980-12-12", "industry": "Technology" }),
            )
            .unwrap();
        assert_eq!(
            intro,
            "[기업소개]:\n\nApple Inc은 1980-12-12에 상장한 Technology섹터의 기업입니다. "
        );
    }

    #[test]
    fn test_english_only_template_falls_back() {
        let registry = prompt_registry(Language::Korean).unwrap();
        let text = registry
            .render(
                names::PRE_INSTRUCTION,
                &json!({ "start": "2024-01-01", "end": "2024-01-22", "ticker": "AAPL" }),
            )
            .unwrap();
        assert!(text.starts_with("\n\n Based on all the information (from 2024-01-01 to 2024-01-22)"));
        assert!(text.contains("AAPL stock price movement for next month"));
    }
}
