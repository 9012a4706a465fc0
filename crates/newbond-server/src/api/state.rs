use newbond_llm::LLMProvider;
use newbond_llm::providers::{OpenAIConfig, OpenAIProvider};
use newbond_market::api::{
    CompanyDataSource, EconomicDataSource, FinnhubClient, FredClient, MarketNewsSource, PriceSource,
    RapidApiClient, YahooFinanceClient,
};
use newbond_market::{
    ChartStyle, EarningsAnalyst, EarningsNarrativeBuilder, IndicatorAggregator, MarketConfig,
    MarketError, NewsAssistant, prompt_registry,
};
use std::sync::Arc;

/// Name of the single HTML page template
pub const PAGE_TEMPLATE: &str = "chart_pilot.html";

/// Provider clients, built once at start-up
#[derive(Clone)]
pub struct Providers {
    pub economic: Arc<dyn EconomicDataSource>,
    pub company: Arc<dyn CompanyDataSource>,
    pub prices: Arc<dyn PriceSource>,
    pub news: Arc<dyn MarketNewsSource>,
}

impl Providers {
    /// Live FRED, Finnhub, Yahoo and RapidAPI clients
    pub fn from_config(config: &MarketConfig) -> Result<Self, MarketError> {
        let fred = FredClient::new(
            config.fred_api_key.as_deref().unwrap_or_default(),
            config.fred_rate_limit,
            config.request_timeout,
        )?;
        let finnhub = FinnhubClient::new(
            config.finnhub_api_key.as_deref().unwrap_or_default(),
            config.finnhub_rate_limit,
            config.request_timeout,
        )?;
        let rapidapi = RapidApiClient::new(
            config.rapidapi_key.as_deref().unwrap_or_default(),
            config.request_timeout,
        )?;

        Ok(Self {
            economic: Arc::new(fred),
            company: Arc::new(finnhub),
            prices: Arc::new(YahooFinanceClient::new(config.request_timeout)),
            news: Arc::new(rapidapi),
        })
    }
}

/// Shared application state, passed to all handlers via `State`
pub struct AppState {
    pub config: MarketConfig,
    pub providers: Providers,
    pub indicators: IndicatorAggregator,
    pub analyst: EarningsAnalyst,
    pub assistant: NewsAssistant,
    pub style: ChartStyle,
    pub pages: minijinja::Environment<'static>,
}

impl AppState {
    pub fn new(
        config: MarketConfig,
        providers: Providers,
        llm: Arc<dyn LLMProvider>,
    ) -> Result<Arc<Self>, MarketError> {
        let prompts = Arc::new(prompt_registry(config.response_language.clone())?);

        let builder = EarningsNarrativeBuilder::new(
            Arc::clone(&providers.company),
            Arc::clone(&providers.prices),
            Arc::clone(&prompts),
        )
        .with_news_count(config.news_sample_size)
        .with_sampling(config.news_sampling);
        let analyst = EarningsAnalyst::new(
            builder,
            Arc::clone(&llm),
            config.analysis_model.clone(),
            config.llm_timeout,
        )
        .with_limits(config.generation);
        let assistant = NewsAssistant::new(llm, prompts, config.news_model.clone(), config.llm_timeout)
            .with_limits(config.generation);

        let mut pages = minijinja::Environment::new();
        pages
            .add_template(PAGE_TEMPLATE, include_str!("../../templates/chart_pilot.html"))
            .map_err(|e| MarketError::Config(format!("page template: {e}")))?;

        Ok(Arc::new(Self {
            indicators: IndicatorAggregator::new(Arc::clone(&providers.economic)),
            config,
            providers,
            analyst,
            assistant,
            style: ChartStyle::default(),
            pages,
        }))
    }

    /// State backed by the live providers and an OpenAI chat model
    pub fn from_config(config: MarketConfig) -> Result<Arc<Self>, MarketError> {
        let providers = Providers::from_config(&config)?;

        let api_key = config
            .openai_api_key
            .clone()
            .ok_or_else(|| MarketError::Config("OPENAI_API_KEY is required".to_string()))?;
        let mut openai = OpenAIConfig::new(api_key).with_timeout(config.llm_timeout.as_secs());
        if let Some(base) = &config.openai_api_base {
            openai = openai.with_api_base(base.clone());
        }
        let llm: Arc<dyn LLMProvider> = Arc::new(OpenAIProvider::with_config(openai)?);

        Self::new(config, providers, llm)
    }
}
