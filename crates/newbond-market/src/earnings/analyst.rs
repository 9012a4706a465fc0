//! Earnings analysis through the LLM

use super::EarningsNarrativeBuilder;
use crate::config::GenerationLimits;
use crate::error::{MarketError, Result};
use chrono::NaiveDate;
use newbond_llm::{CompletionRequest, LLMProvider, Message};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// Response body of the analysis endpoint.
///
/// A failed completion still yields a report: `completion` is `None` and
/// `error` says why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub info: String,
    pub prompt_news: String,
    pub completion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct EarningsAnalyst {
    builder: EarningsNarrativeBuilder,
    llm: Arc<dyn LLMProvider>,
    model: String,
    timeout: Duration,
    limits: GenerationLimits,
}

impl EarningsAnalyst {
    pub fn new(
        builder: EarningsNarrativeBuilder,
        llm: Arc<dyn LLMProvider>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            builder,
            llm,
            model: model.into(),
            timeout,
            limits: GenerationLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: GenerationLimits) -> Self {
        self.limits = limits;
        self
    }

    pub async fn analyze(&self, ticker: &str) -> Result<AnalysisReport> {
        self.analyze_on(ticker, chrono::Local::now().date_naive()).await
    }

    /// Prompt-building failures propagate; LLM failures degrade the report
    #[instrument(skip(self), fields(model = %self.model))]
    pub async fn analyze_on(&self, ticker: &str, today: NaiveDate) -> Result<AnalysisReport> {
        let bundle = self.builder.build_prompt_on(ticker, today).await?;

        let request = self
            .limits
            .apply(CompletionRequest::builder(&self.model))
            .system(bundle.system_prompt)
            .add_message(Message::user(bundle.full_prompt))
            .build();

        let (completion, error) = match self.complete(request).await {
            Ok(text) => {
                info!(ticker, chars = text.len(), "Earnings analysis completed");
                (Some(text), None)
            }
            Err(e) => {
                error!(ticker, error = %e, "Earnings analysis LLM call failed");
                (None, Some(e.to_string()))
            }
        };

        Ok(AnalysisReport {
            info: bundle.company_intro,
            prompt_news: bundle.news_section,
            completion,
            error,
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
