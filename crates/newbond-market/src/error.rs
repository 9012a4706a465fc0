//! Error types for market data pipelines

use thiserror::Error;

/// Errors raised by provider clients, pipelines and chart rendering
#[derive(Debug, Error)]
pub enum MarketError {
    /// Upstream provider failed: network error, non-2xx status, timeout or empty result
    #[error("{provider} request failed: {reason}")]
    ProviderFetch { provider: String, reason: String },

    /// Provider data had an unexpected shape (missing field, duplicate dates, ...)
    #[error("Unexpected data shape: {0}")]
    DataShape(String),

    /// LLM completion failed
    #[error("LLM call failed: {0}")]
    LlmCall(String),

    /// Chart rendering or PNG encoding failed
    #[error("Chart rendering failed: {0}")]
    Chart(String),

    /// Missing API key or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bad ticker, date or payload in a request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Prompt template failed to render
    #[error("Prompt error: {0}")]
    Prompt(#[from] newbond_prompt::PromptError),
}

impl MarketError {
    pub fn fetch(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ProviderFetch {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Classify a reqwest failure, keeping timeouts recognisable
    pub fn from_reqwest(provider: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::fetch(provider, format!("timed out: {err}"))
        } else {
            Self::fetch(provider, err.to_string())
        }
    }
}

impl From<newbond_llm::LLMError> for MarketError {
    fn from(err: newbond_llm::LLMError) -> Self {
        Self::LlmCall(err.to_string())
    }
}

impl From<newbond_utils::ConfigError> for MarketError {
    fn from(err: newbond_utils::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for market operations
pub type Result<T> = std::result::Result<T, MarketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MarketError::fetch("FRED", "HTTP 500");
        assert_eq!(err.to_string(), "FRED request failed: HTTP 500");

        let err = MarketError::DataShape("no earnings calendar entry for AAPL".into());
        assert!(err.to_string().contains("AAPL"));
    }

    #[test]
    fn test_llm_error_conversion() {
        let err: MarketError = newbond_llm::LLMError::AuthenticationFailed.into();
        assert!(matches!(err, MarketError::LlmCall(_)));
    }
}
