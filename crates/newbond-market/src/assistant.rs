//! News assistant: translate, give opinions on, or summarize a news payload

use crate::config::GenerationLimits;
use crate::error::{MarketError, Result};
use crate::prompts::names;
use newbond_llm::{CompletionRequest, LLMProvider, Message};
use newbond_prompt::PromptRegistry;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsAction {
    Translate,
    Opinions,
    Summarize,
}

impl NewsAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action.trim() {
            "translate" => Some(Self::Translate),
            "opinions" => Some(Self::Opinions),
            "summarize" => Some(Self::Summarize),
            _ => None,
        }
    }

    fn system_prompt(self) -> &'static str {
        match self {
            Self::Translate => names::NEWS_TRANSLATE,
            Self::Opinions => names::NEWS_OPINIONS,
            Self::Summarize => names::NEWS_SUMMARIZE,
        }
    }
}

/// `result` is `None` when the completion failed; `error` then says why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsReply {
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The front end posts news either as a JSON array or as that array
/// serialized into a string.
fn decode_payload(news: &Value) -> Value {
    match news {
        Value::String(raw) => serde_json::from_str(raw).unwrap_or_else(|_| news.clone()),
        other => other.clone(),
    }
}

/// Keep only `title` and `content` of each article
pub fn digest_news(news: &Value) -> Result<Vec<Value>> {
    let articles = decode_payload(news);
    let items = articles
        .as_array()
        .ok_or_else(|| MarketError::DataShape("news payload is not a list of articles".to_string()))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let field = |name: &str| {
                item.get(name).cloned().ok_or_else(|| {
                    MarketError::DataShape(format!("news article {i} has no `{name}`"))
                })
            };
            Ok(json!({ "title": field("title")?, "content": field("content")? }))
        })
        .collect()
}

pub struct NewsAssistant {
    llm: Arc<dyn LLMProvider>,
    prompts: Arc<PromptRegistry>,
    model: String,
    timeout: Duration,
    limits: GenerationLimits,
}

impl NewsAssistant {
    pub fn new(
        llm: Arc<dyn LLMProvider>,
        prompts: Arc<PromptRegistry>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            llm,
            prompts,
            model: model.into(),
            timeout,
            limits: GenerationLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: GenerationLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Malformed payloads are errors; LLM failures degrade the reply
    #[instrument(skip(self, news), fields(model = %self.model))]
    pub async fn run(&self, action: NewsAction, news: &Value) -> Result<NewsReply> {
        let data = match action {
            NewsAction::Translate => match news {
                Value::String(raw) => raw.clone(),
                other => other.to_string(),
            },
            NewsAction::Opinions | NewsAction::Summarize => Value::Array(digest_news(news)?).to_string(),
        };

        let language = self.prompts.default_language().name();
        let system = self
            .prompts
            .render(action.system_prompt(), &json!({ "language": language }))?;
        let user = self.prompts.render(names::NEWS_USER, &json!({ "news": data }))?;

        let request = self
            .limits
            .apply(CompletionRequest::builder(&self.model))
            .system(system)
            .add_message(Message::user(user))
            .build();

        Ok(match self.complete(request).await {
            Ok(text) => {
                info!(?action, chars = text.len(), "News assistant completed");
                NewsReply {
                    result: Some(text),
                    error: None,
                }
            }
            Err(e) => {
                error!(?action, error = %e, "News assistant LLM call failed");
                NewsReply {
                    result: None,
                    error: Some(e.to_string()),
                }
            }
        })
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let response = tokio::time::timeout(self.timeout, self.llm.complete(request))
            .await
            .map_err(|_| MarketError::LlmCall(format!("timed out after {:?}", self.timeout)))??;
        debug!(tokens = response.usage.total(), "Completion usage");

        response
            .text()
            .map(ToString::to_string)
            .ok_or_else(|| MarketError::LlmCall("empty completion".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::prompt_registry;
    use newbond_llm::{CompletionResponse, LLMError, MockLLMProvider, StopReason, TokenUsage};
    use newbond_prompt::Language;

    fn reply(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    fn assistant(llm: MockLLMProvider) -> NewsAssistant {
        NewsAssistant::new(
            Arc::new(llm),
            Arc::new(prompt_registry(Language::Korean).unwrap()),
            "gpt-4-0125-preview",
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_parse_action() {
        assert_eq!(NewsAction::parse("translate"), Some(NewsAction::Translate));
        assert_eq!(NewsAction::parse("summarize"), Some(NewsAction::Summarize));
        assert_eq!(NewsAction::parse("dance"), None);
    }

    #[test]
    fn test_digest_accepts_string_and_array() {
        let array = json!([
            { "publishOn": "2024-02-13", "title": "A", "content": "a", "gettyImageUrl": null }
        ]);
        let from_array = digest_news(&array).unwrap();
        let from_string = digest_news(&Value::String(array.to_string())).unwrap();
        assert_eq!(from_array, vec![json!({ "title": "A", "content": "a" })]);
        assert_eq!(from_array, from_string);

        assert!(matches!(digest_news(&json!({"title": "A"})), Err(MarketError::DataShape(_))));
        assert!(matches!(digest_news(&json!([{"title": "A"}])), Err(MarketError::DataShape(_))));
    }

    #[tokio::test]
    async fn test_summarize_sends_digest() {
        let mut llm = MockLLMProvider::new();
        llm.expect_complete()
            .withf(|req| {
                let user = &req.messages[0].content;
                req.model == "gpt-4-0125-preview"
                    && req.system.as_deref().is_some_and(|s| s.contains("about 20 sentences"))
                    && user.starts_with("다음이 system 이 이야기한 뉴스 데이터야.")
                    && user.contains(r#"{"content":"a","title":"A"}"#)
                    && !user.contains("publishOn")
            })
            .returning(|_| Ok(reply("요약")));

        let news = json!([{ "publishOn": "2024-02-13", "title": "A", "content": "a" }]);
        let out = assistant(llm).run(NewsAction::Summarize, &news).await.unwrap();
        assert_eq!(out.result.as_deref(), Some("요약"));
    }

    #[tokio::test]
    async fn test_translate_passes_raw_payload() {
        let mut llm = MockLLMProvider::new();
        llm.expect_complete()
            .withf(|req| {
                req.system.as_deref().is_some_and(|s| s.contains("into Korean"))
                    && req.messages[0].content.ends_with("뉴스 데이터 : not json at all")
            })
            .returning(|_| Ok(reply("번역")));

        let out = assistant(llm)
            .run(NewsAction::Translate, &json!("not json at all"))
            .await
            .unwrap();
        assert_eq!(out.result.as_deref(), Some("번역"));
    }

    #[tokio::test]
    async fn test_llm_failure_yields_null_result() {
        let mut llm = MockLLMProvider::new();
        llm.expect_complete()
            .returning(|_| Err(LLMError::AuthenticationFailed));

        let out = assistant(llm)
            .run(NewsAction::Opinions, &json!([{ "title": "A", "content": "a" }]))
            .await
            .unwrap();
        assert!(out.result.is_none());
        assert!(out.error.is_some());
    }
}
