//! HTTP routes

mod dto;
mod error;
mod handlers;
mod pages;
mod state;

pub use state::AppState;

use axum::{
    Router,
    routing::{get, post},
};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the application router
pub fn router(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/submit", post(pages::submit))
        .route("/calendar", post(handlers::calendar))
        .route("/seekingNews", post(handlers::seeking_news))
        .route("/gptRequest", post(handlers::gpt_request))
        .route("/api/charts/both/{ticker}", get(handlers::both_charts))
        .route("/api/analysis/{ticker}", get(handlers::analysis))
        .route("/api/stockwave/{ticker}", get(handlers::stockwave))
        .route("/api/indicators", get(handlers::indicators))
        .route("/api/indicators/chart", get(handlers::indicators_chart))
        .route("/health", get(handlers::health))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::state::{AppState, Providers};
    use newbond_llm::MockLLMProvider;
    use newbond_market::MarketConfig;
    use newbond_market::api::{
        MockCompanyDataSource, MockEconomicDataSource, MockMarketNewsSource, MockPriceSource,
    };
    use std::sync::Arc;

    /// Mock doubles; unexpected calls panic
    #[derive(Default)]
    pub(crate) struct TestProviders {
        pub economic: MockEconomicDataSource,
        pub company: MockCompanyDataSource,
        pub prices: MockPriceSource,
        pub news: MockMarketNewsSource,
        pub llm: MockLLMProvider,
    }

    pub(crate) fn test_state(mocks: TestProviders) -> Arc<AppState> {
        test_state_with(MarketConfig::default(), mocks)
    }

    pub(crate) fn test_state_with(config: MarketConfig, mocks: TestProviders) -> Arc<AppState> {
        let providers = Providers {
            economic: Arc::new(mocks.economic),
            company: Arc::new(mocks.company),
            prices: Arc::new(mocks.prices),
            news: Arc::new(mocks.news),
        };
        AppState::new(config, providers, Arc::new(mocks.llm)).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{TestProviders, test_state};
    use super::*;

    #[test]
    fn test_router_builds() {
        let state = test_state(TestProviders::default());
        let _router = router(state, Path::new("chartHtml"));
    }
}
