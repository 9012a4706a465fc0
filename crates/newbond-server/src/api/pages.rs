use axum::{extract::State, response::Html};
use minijinja::context;
use newbond_market::charts::{render_base_rate, render_yield_overlay};
use std::sync::Arc;

use super::error::ApiError;
use super::handlers::render_blocking;
use super::state::{AppState, PAGE_TEMPLATE};

fn render_page(state: &AppState, ctx: minijinja::Value) -> Result<Html<String>, ApiError> {
    let html = state.pages.get_template(PAGE_TEMPLATE)?.render(ctx)?;
    Ok(Html(html))
}

/// GET / - Page shell without charts
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    render_page(&state, context! {})
}

/// POST /submit - Page with the base rate and treasury yield charts
pub async fn submit(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let (start, end) = (state.config.base_rate_start, state.config.base_rate_end);
    let (base_rate, (ten_year, two_year)) = tokio::try_join!(
        state.indicators.base_rate(start, end),
        state.indicators.treasury_yields(),
    )?;

    let style = state.style.clone();
    let base_rate_chart = render_blocking(move || render_base_rate(&base_rate, &style)).await?;
    let style = state.style.clone();
    let yield_chart =
        render_blocking(move || render_yield_overlay(&ten_year, &two_year, &style)).await?;

    render_page(
        &state,
        context! {
            base_rate_chart => base_rate_chart,
            yield_chart => yield_chart,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{TestProviders, test_state};
    use chrono::NaiveDate;
    use newbond_market::{IndicatorSeries, MarketError, Periodicity, TimeSeriesPoint};

    fn daily(id: &str, values: &[f64]) -> IndicatorSeries {
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        let points = values
            .iter()
            .zip(0u64..)
            .map(|(v, i)| TimeSeriesPoint::new(start + chrono::Days::new(i), Some(*v)))
            .collect();
        IndicatorSeries::new(id, Periodicity::Daily, points).unwrap()
    }

    #[tokio::test]
    async fn test_index_has_no_charts() {
        let state = test_state(TestProviders::default());
        let Html(html) = index(State(state)).await.unwrap();
        assert!(html.contains("<form"));
        assert!(!html.contains("id=\"base-rate-chart\""));
    }

    #[tokio::test]
    async fn test_submit_embeds_both_charts() {
        let mut providers = TestProviders::default();
        providers
            .economic
            .expect_fetch_series()
            .returning(|id, _, _| Ok(daily(id, &[4.1, 4.2, 4.3, 4.25])));
        let state = test_state(providers);

        let Html(html) = submit(State(state)).await.unwrap();
        assert_eq!(html.matches("src=\"data:image/png;base64,iVBORw0KGgo").count(), 2);
    }

    #[tokio::test]
    async fn test_submit_provider_failure() {
        let mut providers = TestProviders::default();
        providers
            .economic
            .expect_fetch_series()
            .returning(|_, _, _| Err(MarketError::fetch("FRED", "HTTP 400")));
        let state = test_state(providers);

        let err = submit(State(state)).await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_GATEWAY);
    }
}
