//! LLM provider abstraction layer for newbond
//!
//! Chat-completion request/response types, the [`LLMProvider`] trait the
//! market pipelines call through, and the OpenAI implementation (behind the
//! default `openai` feature).

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

#[cfg(any(test, feature = "mock"))]
pub use provider::MockLLMProvider;

#[cfg(feature = "openai")]
pub mod providers;
