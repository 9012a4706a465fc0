//! Provider clients and the traits the pipelines depend on
//!
//! Each pipeline takes its providers as `Arc<dyn Trait>` so the real HTTP
//! clients are built once at start-up and tests can substitute mocks
//! (`Mock*` types, also exported with the `mock` feature).

pub mod finnhub;
pub mod fred;
pub mod rapidapi;
pub mod yahoo;

pub use finnhub::{
    CompanyNews, CompanyProfile, EarningsCalendarEntry, EpsSurprise, FinnhubClient,
    RecommendationTrend,
};
pub use fred::{FredClient, SeriesInfo};
pub use rapidapi::{RapidApiClient, SeekingNewsItem};
pub use yahoo::{PriceBar, YahooFinanceClient};

use crate::error::Result;
use crate::series::IndicatorSeries;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Macro statistics provider (FRED)
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait EconomicDataSource: Send + Sync {
    /// Observations of one series with its declared periodicity.
    ///
    /// Empty results are a `ProviderFetch` error.
    async fn fetch_series(
        &self,
        series_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<IndicatorSeries>;
}

/// Company fundamentals and news provider (Finnhub)
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait CompanyDataSource: Send + Sync {
    async fn company_profile(&self, ticker: &str) -> Result<CompanyProfile>;

    /// Calendar entries for `ticker` announced within `[from, to]`
    async fn earnings_calendar(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EarningsCalendarEntry>>;

    async fn company_news(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CompanyNews>>;

    /// Most recent `limit` quarterly EPS surprises
    async fn eps_surprises(&self, ticker: &str, limit: u32) -> Result<Vec<EpsSurprise>>;

    async fn recommendation_trends(&self, ticker: &str) -> Result<Vec<RecommendationTrend>>;
}

/// Daily price history provider (Yahoo Finance)
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Daily bars with `start <= date <= end`, oldest first. No trading days
    /// in the range yields an empty vector.
    async fn price_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>>;
}

/// Economic calendar and market news provider (RapidAPI)
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait MarketNewsSource: Send + Sync {
    /// Upstream calendar JSON, passed through untouched
    async fn economic_calendar(&self, country: &str, start: NaiveDate) -> Result<serde_json::Value>;

    async fn seeking_news(&self, categories: &[String]) -> Result<Vec<SeekingNewsItem>>;
}

/// Error text from a non-2xx response, truncated for logs
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    let status = response.status();
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > 300 {
        let mut cut = 300;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    format!("HTTP {status}: {body}")
}
