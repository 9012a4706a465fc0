//! News assistant prompts

use super::names;
use newbond_prompt::{JinjaTemplate, Result};

/// Vars: `language`
pub fn news_translate() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        names::NEWS_TRANSLATE,
        "You are an expert in translation. Translate the title and content from the following JSON data \
         into {{ language }}. Return the translated content in the same JSON format, but only translate \
         the title and content into {{ language }}. Do not provide any other response besides the JSON format.",
    )
}

pub fn news_opinions() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        names::NEWS_OPINIONS,
        "Given the provided news data, please provide your expert analysis and insights on the current \
         market trends and future prospects. Consider factors such as recent developments, market sentiment, \
         and potential impacts on various industries based on the news. Your analysis should be comprehensive, \
         well-informed, and forward-looking, offering valuable insights for investors and stakeholders. \
         Thank you for your expertise",
    )
}

pub fn news_summarize() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        names::NEWS_SUMMARIZE,
        "You're an expert in data summarization. Given the provided JSON data, please summarize its contents \
         systematically and comprehensively into about 20 sentences, ignoring JSON parameters unrelated to \
         news articles.",
    )
}

/// Vars: `news` (serialized payload)
pub fn news_user() -> Result<JinjaTemplate> {
    JinjaTemplate::bilingual(
        names::NEWS_USER,
        "Here is the news data the system prompt refers to. Do exactly what the system prompt asks. News data : {{ news }}",
        "다음이 system 이 이야기한 뉴스 데이터야. system prompt가 말한대로 실행해줘. 단 답변을 꼭 한국어로 해줘. 뉴스 데이터 : {{ news }}",
    )
}
