//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// A chat-completion backend.
///
/// Pipelines hold an `Arc<dyn LLMProvider>`; tests swap in `MockLLMProvider`
/// (enable the `mock` feature from other crates).
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Provider name (e.g. "openai")
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Message, Role, StopReason, TokenUsage};

    #[tokio::test]
    async fn test_mock_provider() {
        let mut mock = MockLLMProvider::new();
        mock.expect_complete()
            .withf(|req| req.model == "gpt-4")
            .returning(|_| {
                Ok(CompletionResponse {
                    message: Message::assistant("[Positive Developments]:"),
                    stop_reason: StopReason::EndTurn,
                    usage: TokenUsage::default(),
                })
            });
        mock.expect_name().return_const("mock".to_string());

        let provider: &dyn LLMProvider = &mock;
        let response = provider
            .complete(CompletionRequest::builder("gpt-4").build())
            .await
            .unwrap();
        assert_eq!(response.message.role, Role::Assistant);
        assert_eq!(provider.name(), "mock");
    }
}
