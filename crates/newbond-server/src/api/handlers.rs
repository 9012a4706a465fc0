use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{Days, NaiveDate};
use newbond_market::api::{PriceBar, SeekingNewsItem};
use newbond_market::charts::{
    render_eps_surprise, render_indicators, render_recommendations, render_stockwave, to_base64,
};
use newbond_market::{AnalysisReport, IndicatorTable, NewsAction, normalize_ticker};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::dto::{
    BothChartsResponse, GptRequest, HealthResponse, IndicatorQuery, IndicatorsChartResponse,
    SeekingNewsRequest, StockwaveResponse,
};
use super::error::ApiError;
use super::state::AppState;

/// Quarters shown on the EPS surprise chart
const EPS_HISTORY_LIMIT: u32 = 4;
/// Days of history on the stock wave chart
const STOCKWAVE_DAYS: u64 = 365;
const CALENDAR_COUNTRY: &str = "USA";

/// Run chart rendering on the blocking pool and base64 the PNG
pub(super) async fn render_blocking<F>(render: F) -> Result<String, ApiError>
where
    F: FnOnce() -> newbond_market::Result<Vec<u8>> + Send + 'static,
{
    let png = tokio::task::spawn_blocking(render)
        .await
        .map_err(|e| ApiError::Internal(format!("chart task failed: {e}")))??;
    Ok(to_base64(&png))
}

fn parse_start(raw: Option<&str>, default: NaiveDate) -> Result<NaiveDate, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| ApiError::BadRequest(format!("start must be YYYY-MM-DD, got '{s}'"))),
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// POST /calendar - Economic calendar passthrough
pub async fn calendar(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let calendar = state
        .providers
        .news
        .economic_calendar(CALENDAR_COUNTRY, state.config.calendar_start)
        .await?;
    Ok(Json(calendar))
}

/// POST /seekingNews - Latest Seeking Alpha news for the given categories
pub async fn seeking_news(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SeekingNewsRequest>,
) -> Result<Json<Vec<SeekingNewsItem>>, ApiError> {
    let items = state.providers.news.seeking_news(&req.categories).await?;
    info!(categories = req.categories.len(), items = items.len(), "seeking news fetched");
    Ok(Json(items))
}

/// POST /gptRequest - Translate, comment on or summarize a news payload
pub async fn gpt_request(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GptRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(action) = req.action.as_deref().and_then(NewsAction::parse) else {
        return Ok(Json(json!({ "result": { "error": "Invalid action" } })));
    };

    let reply = state.assistant.run(action, &req.g_news).await?;
    let body = serde_json::to_value(reply).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(body))
}

/// GET /api/charts/both/{ticker} - EPS surprise and recommendation charts
#[instrument(skip(state))]
pub async fn both_charts(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<BothChartsResponse>, ApiError> {
    let ticker = normalize_ticker(&ticker)?;
    let company = &state.providers.company;
    let (surprises, trends) = tokio::try_join!(
        company.eps_surprises(&ticker, EPS_HISTORY_LIMIT),
        company.recommendation_trends(&ticker),
    )?;

    let (style, symbol) = (state.style.clone(), ticker.clone());
    let earnings_chart =
        render_blocking(move || render_eps_surprise(&symbol, &surprises, &style)).await?;
    let (style, symbol) = (state.style.clone(), ticker);
    let recommendations_chart =
        render_blocking(move || render_recommendations(&symbol, &trends, &style)).await?;

    Ok(Json(BothChartsResponse {
        earnings_chart,
        recommendations_chart,
    }))
}

/// GET /api/analysis/{ticker} - Earnings prompt plus the model's analysis
pub async fn analysis(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<AnalysisReport>, ApiError> {
    let ticker = normalize_ticker(&ticker)?;
    let report = state.analyst.analyze(&ticker).await?;
    Ok(Json(report))
}

/// GET /api/stockwave/{ticker} - One year of price and volume
#[instrument(skip(state))]
pub async fn stockwave(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<StockwaveResponse>, ApiError> {
    let ticker = normalize_ticker(&ticker)?;
    let end = today();
    let start = end - Days::new(STOCKWAVE_DAYS);
    let bars: Vec<PriceBar> = state.providers.prices.price_history(&ticker, start, end).await?;

    let style = state.style.clone();
    let stockwave_data = render_blocking(move || render_stockwave(&ticker, &bars, &style)).await?;
    Ok(Json(StockwaveResponse { stockwave_data }))
}

/// GET /api/indicators - Merged indicator table
pub async fn indicators(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IndicatorQuery>,
) -> Result<Json<IndicatorTable>, ApiError> {
    let start = parse_start(query.start.as_deref(), state.config.indicator_start)?;
    let table = state.indicators.aggregate(start).await?;
    Ok(Json(table))
}

/// GET /api/indicators/chart - Merged indicator table as a line chart
pub async fn indicators_chart(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IndicatorQuery>,
) -> Result<Json<IndicatorsChartResponse>, ApiError> {
    let start = parse_start(query.start.as_deref(), state.config.indicator_start)?;
    let table = state.indicators.aggregate(start).await?;

    let style = state.style.clone();
    let indicators_chart = render_blocking(move || render_indicators(&table, &style)).await?;
    Ok(Json(IndicatorsChartResponse { indicators_chart }))
}

/// GET /health - Health check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{TestProviders, test_state, test_state_with};
    use axum::http::StatusCode;
    use newbond_llm::{CompletionResponse, LLMError, Message, StopReason, TokenUsage};
    use newbond_market::api::{EpsSurprise, RecommendationTrend};
    use newbond_market::{
        GenerationLimits, IndicatorSeries, MarketConfig, MarketError, Periodicity, TimeSeriesPoint,
    };

    fn completion(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    #[test]
    fn test_parse_start() {
        let default = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        assert_eq!(parse_start(None, default).unwrap(), default);
        assert_eq!(parse_start(Some(" "), default).unwrap(), default);
        assert_eq!(
            parse_start(Some("2020-06-01"), default).unwrap(),
            NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()
        );
        assert!(matches!(
            parse_start(Some("06/01/2020"), default),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body.status, "ok");
    }

    #[tokio::test]
    async fn test_unknown_gpt_action() {
        let state = test_state(TestProviders::default());
        let req = GptRequest {
            action: Some("poem".into()),
            g_news: json!([]),
        };
        let Json(body) = gpt_request(State(state), Json(req)).await.unwrap();
        assert_eq!(body, json!({ "result": { "error": "Invalid action" } }));
    }

    #[tokio::test]
    async fn test_gpt_request_carries_generation_limits() {
        let mut providers = TestProviders::default();
        providers
            .llm
            .expect_complete()
            .withf(|req| req.max_tokens == Some(512) && req.temperature == Some(0.5))
            .returning(|_| Ok(completion("번역")));
        let config = MarketConfig {
            generation: GenerationLimits {
                max_tokens: Some(512),
                temperature: Some(0.5),
            },
            ..MarketConfig::default()
        };
        let state = test_state_with(config, providers);

        let req = GptRequest {
            action: Some("translate".into()),
            g_news: json!("headline"),
        };
        let Json(body) = gpt_request(State(state), Json(req)).await.unwrap();
        assert_eq!(body, json!({ "result": "번역" }));
    }

    #[tokio::test]
    async fn test_gpt_summarize() {
        let mut providers = TestProviders::default();
        providers
            .llm
            .expect_complete()
            .returning(|_| Ok(completion("요약: 시장은 상승세")));
        let state = test_state(providers);

        let req = GptRequest {
            action: Some("summarize".into()),
            g_news: json!([{ "title": "Fed holds", "content": "Rates unchanged", "publishOn": "x" }]),
        };
        let Json(body) = gpt_request(State(state), Json(req)).await.unwrap();
        assert_eq!(body, json!({ "result": "요약: 시장은 상승세" }));
    }

    #[tokio::test]
    async fn test_gpt_llm_failure_degrades() {
        let mut providers = TestProviders::default();
        providers
            .llm
            .expect_complete()
            .returning(|_| Err(LLMError::RequestFailed("HTTP 500".into())));
        let state = test_state(providers);

        let req = GptRequest {
            action: Some("translate".into()),
            g_news: json!("[{\"title\": \"t\", \"content\": \"c\"}]"),
        };
        let Json(body) = gpt_request(State(state), Json(req)).await.unwrap();
        assert_eq!(body["result"], Value::Null);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_gpt_malformed_news_is_422() {
        let state = test_state(TestProviders::default());
        let req = GptRequest {
            action: Some("opinions".into()),
            g_news: json!({ "not": "a list" }),
        };
        let err = gpt_request(State(state), Json(req)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_seeking_news_passthrough() {
        let mut providers = TestProviders::default();
        providers
            .news
            .expect_seeking_news()
            .withf(|categories| categories.len() == 1 && categories[0] == "market-news::top-news")
            .returning(|_| {
                Ok(vec![SeekingNewsItem {
                    title: Some("Stocks rally".into()),
                    ..SeekingNewsItem::default()
                }])
            });
        let state = test_state(providers);

        let req = SeekingNewsRequest {
            categories: vec!["market-news::top-news".into()],
        };
        let Json(items) = seeking_news(State(state), Json(req)).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title.as_deref(), Some("Stocks rally"));
    }

    #[tokio::test]
    async fn test_calendar_provider_failure_is_502() {
        let mut providers = TestProviders::default();
        providers
            .news
            .expect_economic_calendar()
            .returning(|_, _| Err(MarketError::fetch("RapidAPI", "HTTP 429")));
        let state = test_state(providers);

        let err = calendar(State(state)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_both_charts() {
        let mut providers = TestProviders::default();
        providers.company.expect_eps_surprises().returning(|_, limit| {
            assert_eq!(limit, EPS_HISTORY_LIMIT);
            Ok(vec![EpsSurprise {
                period: "2023-09-30".into(),
                actual: Some(1.46),
                estimate: Some(1.39),
                surprise_percent: Some(5.04),
                year: Some(2023),
                quarter: Some(4),
            }])
        });
        providers.company.expect_recommendation_trends().returning(|_| {
            Ok(vec![RecommendationTrend {
                period: "2023-11-01".into(),
                strong_buy: 12,
                buy: 22,
                hold: 9,
                sell: 1,
                strong_sell: 0,
            }])
        });
        let state = test_state(providers);

        let Json(body) = both_charts(State(state), Path("aapl".into())).await.unwrap();
        assert!(body.earnings_chart.starts_with("iVBORw0KGgo"));
        assert!(body.recommendations_chart.starts_with("iVBORw0KGgo"));
    }

    #[tokio::test]
    async fn test_bad_ticker_is_400() {
        let state = test_state(TestProviders::default());
        let err = stockwave(State(state), Path("../etc".into())).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stockwave_without_history_is_422() {
        let mut providers = TestProviders::default();
        providers
            .prices
            .expect_price_history()
            .returning(|_, _, _| Ok(Vec::new()));
        let state = test_state(providers);

        let err = stockwave(State(state), Path("MSFT".into())).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_analysis_without_calendar_entry_is_422() {
        let mut providers = TestProviders::default();
        providers
            .company
            .expect_company_profile()
            .returning(|_| Ok(newbond_market::api::CompanyProfile::default()));
        providers
            .company
            .expect_earnings_calendar()
            .returning(|_, _, _| Ok(Vec::new()));
        let state = test_state(providers);

        let err = analysis(State(state), Path("AAPL".into())).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_indicators_table() {
        let mut providers = TestProviders::default();
        providers.economic.expect_fetch_series().returning(|id, _, _| {
            let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
            let points = (0..30u32)
                .map(|i| {
                    let date = start.checked_add_months(chrono::Months::new(i)).unwrap();
                    TimeSeriesPoint::new(date, Some(100.0 + f64::from(i)))
                })
                .collect();
            IndicatorSeries::new(id, Periodicity::Monthly, points)
        });
        let state = test_state(providers);

        let query = IndicatorQuery {
            start: Some("2020-01-01".into()),
        };
        let Json(table) = indicators(State(state), Query(query)).await.unwrap();
        assert_eq!(table.first_date(), NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(table.columns().len(), 6);
        assert!(table.is_contiguous());
    }
}
