//! Configuration for the market pipelines
//!
//! API keys come from the environment (`.env` is loaded by the binary);
//! everything else has a default and can be overridden through the builder.

use crate::earnings::NewsSampling;
use crate::error::{MarketError, Result};
use chrono::NaiveDate;
use newbond_llm::completion::CompletionRequestBuilder;
use newbond_prompt::Language;
use newbond_utils::{env_opt, env_parse};
use std::time::Duration;

const fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => NaiveDate::MIN,
    }
}

pub const DEFAULT_INDICATOR_START: NaiveDate = ymd(2019, 1, 1);
pub const DEFAULT_BASE_RATE_START: NaiveDate = ymd(2000, 1, 1);
pub const DEFAULT_BASE_RATE_END: NaiveDate = ymd(2023, 2, 1);
pub const DEFAULT_CALENDAR_START: NaiveDate = ymd(2023, 12, 1);

/// Sampling limits sent with every completion; `None` leaves the provider default
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationLimits {
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
}

impl GenerationLimits {
    pub(crate) fn apply(self, mut request: CompletionRequestBuilder) -> CompletionRequestBuilder {
        if let Some(max_tokens) = self.max_tokens {
            request = request.max_tokens(max_tokens);
        }
        if let Some(temperature) = self.temperature {
            request = request.temperature(temperature);
        }
        request
    }
}

/// Settings shared by every pipeline
#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub fred_api_key: Option<String>,
    pub finnhub_api_key: Option<String>,
    pub rapidapi_key: Option<String>,
    pub openai_api_key: Option<String>,
    /// OpenAI-compatible endpoint override
    pub openai_api_base: Option<String>,

    /// Model for earnings analysis
    pub analysis_model: String,
    /// Model for the news assistant
    pub news_model: String,

    /// Timeout for every provider call
    pub request_timeout: Duration,
    /// Timeout for LLM completions
    pub llm_timeout: Duration,
    pub generation: GenerationLimits,

    /// Headlines per news window
    pub news_sample_size: usize,
    pub news_sampling: NewsSampling,
    /// Language the LLM answers in
    pub response_language: Language,

    pub indicator_start: NaiveDate,
    pub base_rate_start: NaiveDate,
    pub base_rate_end: NaiveDate,
    pub calendar_start: NaiveDate,

    /// Requests per minute
    pub finnhub_rate_limit: u32,
    /// Requests per minute
    pub fred_rate_limit: u32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            fred_api_key: None,
            finnhub_api_key: None,
            rapidapi_key: None,
            openai_api_key: None,
            openai_api_base: None,
            analysis_model: "gpt-4".to_string(),
            news_model: "gpt-4-0125-preview".to_string(),
            request_timeout: Duration::from_secs(10),
            llm_timeout: Duration::from_secs(120),
            generation: GenerationLimits::default(),
            news_sample_size: 20,
            news_sampling: NewsSampling::default(),
            response_language: Language::Korean,
            indicator_start: DEFAULT_INDICATOR_START,
            base_rate_start: DEFAULT_BASE_RATE_START,
            base_rate_end: DEFAULT_BASE_RATE_END,
            calendar_start: DEFAULT_CALENDAR_START,
            finnhub_rate_limit: 60,
            fred_rate_limit: 120,
        }
    }
}

impl MarketConfig {
    pub fn builder() -> MarketConfigBuilder {
        MarketConfigBuilder::default()
    }

    /// Keys and overrides from the environment, validated
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env_all_keys().with_env_overrides()?.build()
    }

    pub fn validate(&self) -> Result<()> {
        if self.fred_api_key.is_none() {
            return Err(MarketError::Config("FRED_API_KEY is required".to_string()));
        }
        if self.finnhub_api_key.is_none() {
            return Err(MarketError::Config("FINNHUB_KEY is required".to_string()));
        }
        if self.news_sample_size == 0 {
            return Err(MarketError::Config(
                "news_sample_size must be greater than 0".to_string(),
            ));
        }
        if self.finnhub_rate_limit == 0 || self.fred_rate_limit == 0 {
            return Err(MarketError::Config(
                "rate limits must be greater than 0".to_string(),
            ));
        }
        if self.request_timeout.is_zero() || self.llm_timeout.is_zero() {
            return Err(MarketError::Config("timeouts must be non-zero".to_string()));
        }
        if self.generation.max_tokens == Some(0) {
            return Err(MarketError::Config("max_tokens must be greater than 0".to_string()));
        }
        if let Some(t) = self.generation.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(MarketError::Config(format!(
                    "temperature must be within 0.0..=2.0, got {t}"
                )));
            }
        }
        if self.base_rate_start >= self.base_rate_end {
            return Err(MarketError::Config(format!(
                "base rate range is empty: {} .. {}",
                self.base_rate_start, self.base_rate_end
            )));
        }
        Ok(())
    }
}

/// Builder for [`MarketConfig`]
#[derive(Debug, Default)]
pub struct MarketConfigBuilder {
    config: MarketConfig,
}

impl MarketConfigBuilder {
    pub fn fred_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.fred_api_key = Some(key.into());
        self
    }

    pub fn finnhub_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.finnhub_api_key = Some(key.into());
        self
    }

    pub fn rapidapi_key(mut self, key: impl Into<String>) -> Self {
        self.config.rapidapi_key = Some(key.into());
        self
    }

    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.openai_api_key = Some(key.into());
        self
    }

    pub fn openai_api_base(mut self, base: impl Into<String>) -> Self {
        self.config.openai_api_base = Some(base.into());
        self
    }

    pub fn analysis_model(mut self, model: impl Into<String>) -> Self {
        self.config.analysis_model = model.into();
        self
    }

    pub fn news_model(mut self, model: impl Into<String>) -> Self {
        self.config.news_model = model.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn llm_timeout(mut self, timeout: Duration) -> Self {
        self.config.llm_timeout = timeout;
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.generation.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.generation.temperature = Some(temperature);
        self
    }

    pub fn news_sample_size(mut self, size: usize) -> Self {
        self.config.news_sample_size = size;
        self
    }

    pub fn news_sampling(mut self, sampling: NewsSampling) -> Self {
        self.config.news_sampling = sampling;
        self
    }

    pub fn response_language(mut self, language: Language) -> Self {
        self.config.response_language = language;
        self
    }

    pub fn indicator_start(mut self, date: NaiveDate) -> Self {
        self.config.indicator_start = date;
        self
    }

    pub fn base_rate_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.config.base_rate_start = start;
        self.config.base_rate_end = end;
        self
    }

    pub fn calendar_start(mut self, date: NaiveDate) -> Self {
        self.config.calendar_start = date;
        self
    }

    pub fn finnhub_rate_limit(mut self, per_minute: u32) -> Self {
        self.config.finnhub_rate_limit = per_minute;
        self
    }

    pub fn fred_rate_limit(mut self, per_minute: u32) -> Self {
        self.config.fred_rate_limit = per_minute;
        self
    }

    /// Load every provider key from the environment
    pub fn with_env_all_keys(mut self) -> Self {
        let keys = [
            ("FRED_API_KEY", &mut self.config.fred_api_key),
            ("FINNHUB_KEY", &mut self.config.finnhub_api_key),
            ("RAPID_API_KEY", &mut self.config.rapidapi_key),
            ("OPENAI_API_KEY", &mut self.config.openai_api_key),
            ("OPENAI_API_BASE", &mut self.config.openai_api_base),
        ];
        for (var, slot) in keys {
            if let Some(value) = env_opt(var) {
                *slot = Some(value);
            }
        }
        self
    }

    /// Optional `NEWBOND_*` tuning variables
    pub fn with_env_overrides(mut self) -> Result<Self> {
        let c = &mut self.config;
        if let Some(model) = env_opt("NEWBOND_ANALYSIS_MODEL") {
            c.analysis_model = model;
        }
        if let Some(model) = env_opt("NEWBOND_NEWS_MODEL") {
            c.news_model = model;
        }
        if let Some(code) = env_opt("NEWBOND_RESPONSE_LANGUAGE") {
            c.response_language = Language::from_code(&code);
        }
        c.news_sample_size = env_parse("NEWBOND_NEWS_SAMPLE_SIZE", c.news_sample_size)?;
        c.request_timeout = Duration::from_secs(env_parse(
            "NEWBOND_REQUEST_TIMEOUT_SECS",
            c.request_timeout.as_secs(),
        )?);
        c.llm_timeout = Duration::from_secs(env_parse(
            "NEWBOND_LLM_TIMEOUT_SECS",
            c.llm_timeout.as_secs(),
        )?);
        if env_opt("NEWBOND_LLM_MAX_TOKENS").is_some() {
            c.generation.max_tokens = Some(env_parse("NEWBOND_LLM_MAX_TOKENS", 0)?);
        }
        if env_opt("NEWBOND_LLM_TEMPERATURE").is_some() {
            c.generation.temperature = Some(env_parse("NEWBOND_LLM_TEMPERATURE", 0.0)?);
        }
        if let Some(seed) = env_opt("NEWBOND_NEWS_SEED") {
            let seed = seed.parse().map_err(|_| {
                MarketError::Config(format!("NEWBOND_NEWS_SEED must be an integer, got '{seed}'"))
            })?;
            c.news_sampling = NewsSampling::Random { seed: Some(seed) };
        }
        Ok(self)
    }

    pub fn build(self) -> Result<MarketConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed() -> MarketConfigBuilder {
        MarketConfig::builder()
            .fred_api_key("fred")
            .finnhub_api_key("finnhub")
    }

    #[test]
    fn test_defaults() {
        let config = keyed().build().unwrap();
        assert_eq!(config.analysis_model, "gpt-4");
        assert_eq!(config.news_model, "gpt-4-0125-preview");
        assert_eq!(config.news_sample_size, 20);
        assert_eq!(config.response_language, Language::Korean);
        assert_eq!(config.indicator_start, NaiveDate::from_ymd_opt(2019, 1, 1).unwrap());
        assert_eq!(config.calendar_start, NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.news_sampling, NewsSampling::Random { seed: None });
        assert_eq!(config.generation, GenerationLimits::default());
    }

    #[test]
    fn test_generation_limits() {
        let config = keyed().max_tokens(1024).temperature(0.2).build().unwrap();
        assert_eq!(config.generation.max_tokens, Some(1024));
        assert_eq!(config.generation.temperature, Some(0.2));

        let request = config
            .generation
            .apply(CompletionRequestBuilder::new("gpt-4"))
            .build();
        assert_eq!(request.max_tokens, Some(1024));
        assert_eq!(request.temperature, Some(0.2));

        let request = GenerationLimits::default()
            .apply(CompletionRequestBuilder::new("gpt-4"))
            .build();
        assert_eq!((request.max_tokens, request.temperature), (None, None));
    }

    #[test]
    fn test_keys_required() {
        let err = MarketConfig::builder().finnhub_api_key("x").build().unwrap_err();
        assert!(err.to_string().contains("FRED_API_KEY"));

        let err = MarketConfig::builder().fred_api_key("x").build().unwrap_err();
        assert!(err.to_string().contains("FINNHUB_KEY"));
    }

    #[test]
    fn test_validation() {
        assert!(keyed().news_sample_size(0).build().is_err());
        assert!(keyed().fred_rate_limit(0).build().is_err());
        assert!(keyed().llm_timeout(Duration::ZERO).build().is_err());
        assert!(keyed().max_tokens(0).build().is_err());
        assert!(keyed().temperature(2.5).build().is_err());
        assert!(keyed().temperature(f32::NAN).build().is_err());

        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert!(keyed().base_rate_range(start, start).build().is_err());
    }

    #[test]
    fn test_builder_overrides() {
        let config = keyed()
            .analysis_model("gpt-4o")
            .response_language(Language::English)
            .news_sampling(NewsSampling::MostRecent)
            .build()
            .unwrap();
        assert_eq!(config.analysis_model, "gpt-4o");
        assert_eq!(config.response_language, Language::English);
        assert_eq!(config.news_sampling, NewsSampling::MostRecent);
    }
}
