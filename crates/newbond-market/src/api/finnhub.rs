//! Finnhub API client: company profile, earnings calendar, company news,
//! historical EPS surprises and analyst recommendation trends.
//!
//! Rate Limit: 60 requests per minute on the free tier

use super::{CompanyDataSource, error_body};
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER: &str = "Finnhub";

/// Company profile from `stock/profile2`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ticker: String,
    /// IPO date as published (YYYY-MM-DD)
    #[serde(default)]
    pub ipo: String,
    #[serde(rename = "finnhubIndustry", default)]
    pub finnhub_industry: String,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(rename = "marketCapitalization", default)]
    pub market_capitalization: Option<f64>,
    #[serde(default)]
    pub weburl: Option<String>,
}

/// One row of `calendar/earnings`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EarningsCalendarEntry {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub symbol: String,
    #[serde(rename = "epsActual", default)]
    pub eps_actual: Option<f64>,
    #[serde(rename = "epsEstimate", default)]
    pub eps_estimate: Option<f64>,
    #[serde(rename = "revenueActual", default)]
    pub revenue_actual: Option<f64>,
    #[serde(rename = "revenueEstimate", default)]
    pub revenue_estimate: Option<f64>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub quarter: Option<u32>,
    /// `bmo` / `amc` / `dmh`
    #[serde(default)]
    pub hour: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EarningsCalendarResponse {
    #[serde(rename = "earningsCalendar", default)]
    earnings_calendar: Vec<EarningsCalendarEntry>,
}

/// Company news article
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyNews {
    #[serde(default)]
    pub category: String,
    /// Publish time (UNIX timestamp)
    #[serde(default)]
    pub datetime: i64,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub url: String,
}

/// Historical quarterly EPS from `stock/earnings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpsSurprise {
    /// Fiscal period end (YYYY-MM-DD)
    pub period: String,
    pub actual: Option<f64>,
    pub estimate: Option<f64>,
    #[serde(rename = "surprisePercent")]
    pub surprise_percent: Option<f64>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub quarter: Option<u32>,
}

/// Analyst recommendation counts for one month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationTrend {
    pub period: String,
    #[serde(rename = "strongBuy", default)]
    pub strong_buy: u32,
    #[serde(default)]
    pub buy: u32,
    #[serde(default)]
    pub hold: u32,
    #[serde(default)]
    pub sell: u32,
    #[serde(rename = "strongSell", default)]
    pub strong_sell: u32,
}

impl RecommendationTrend {
    pub fn total(&self) -> u32 {
        self.strong_buy + self.buy + self.hold + self.sell + self.strong_sell
    }
}

/// Finnhub client with rate limiting
pub struct FinnhubClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl FinnhubClient {
    /// * `rate_limit` - requests per minute (free tier: 60, premium: 300+)
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Result<Self> {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MarketError::Config(format!("failed to build Finnhub client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: FINNHUB_BASE_URL.to_string(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        self.rate_limiter.until_ready().await;
        debug!(path, "Finnhub request");

        let response = self
            .client
            .get(format!("{}/{path}", self.base_url))
            .query(query)
            .query(&[("token", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| MarketError::from_reqwest(PROVIDER, &e))?;

        if !response.status().is_success() {
            return Err(MarketError::fetch(PROVIDER, error_body(response).await));
        }

        response
            .json()
            .await
            .map_err(|e| MarketError::DataShape(format!("Finnhub {path} response: {e}")))
    }
}

fn ymd(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[async_trait]
impl CompanyDataSource for FinnhubClient {
    #[instrument(skip(self))]
    async fn company_profile(&self, ticker: &str) -> Result<CompanyProfile> {
        let profile: CompanyProfile = self
            .get_json("stock/profile2", &[("symbol", ticker.to_string())])
            .await?;

        // Unknown symbols come back as `{}`
        if profile.name.is_empty() {
            return Err(MarketError::fetch(
                PROVIDER,
                format!("empty company profile for {ticker}"),
            ));
        }
        Ok(profile)
    }

    #[instrument(skip(self))]
    async fn earnings_calendar(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EarningsCalendarEntry>> {
        let data: EarningsCalendarResponse = self
            .get_json(
                "calendar/earnings",
                &[
                    ("from", ymd(from)),
                    ("to", ymd(to)),
                    ("symbol", ticker.to_string()),
                    ("international", "false".to_string()),
                ],
            )
            .await?;
        Ok(data.earnings_calendar)
    }

    #[instrument(skip(self))]
    async fn company_news(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CompanyNews>> {
        self.get_json(
            "company-news",
            &[
                ("symbol", ticker.to_string()),
                ("from", ymd(from)),
                ("to", ymd(to)),
            ],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn eps_surprises(&self, ticker: &str, limit: u32) -> Result<Vec<EpsSurprise>> {
        self.get_json(
            "stock/earnings",
            &[("symbol", ticker.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn recommendation_trends(&self, ticker: &str) -> Result<Vec<RecommendationTrend>> {
        self.get_json("stock/recommendation", &[("symbol", ticker.to_string())])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profile() {
        let raw = r#"{
            "country": "US", "currency": "USD", "exchange": "NASDAQ NMS - GLOBAL MARKET",
            "ipo": "1980-12-12", "marketCapitalization": 2663000.5, "name": "Apple Inc",
            "ticker": "AAPL", "weburl": "https://www.apple.com/", "finnhubIndustry": "Technology"
        }"#;
        let profile: CompanyProfile = serde_json::from_str(raw).unwrap();
        assert_eq!(profile.name, "Apple Inc");
        assert_eq!(profile.finnhub_industry, "Technology");
        assert_eq!(profile.ipo, "1980-12-12");

        let empty: CompanyProfile = serde_json::from_str("{}").unwrap();
        assert!(empty.name.is_empty());
    }

    #[test]
    fn test_parse_calendar_pre_announcement() {
        let raw = r#"{"earningsCalendar": [{
            "date": "2024-01-25", "epsActual": null, "epsEstimate": 2.1, "hour": "amc",
            "quarter": 1, "revenueActual": null, "revenueEstimate": 117910000000,
            "symbol": "AAPL", "year": 2024
        }]}"#;
        let data: EarningsCalendarResponse = serde_json::from_str(raw).unwrap();
        let entry = &data.earnings_calendar[0];
        assert_eq!(entry.eps_actual, None);
        assert_eq!(entry.eps_estimate, Some(2.1));
        assert_eq!(entry.quarter, Some(1));

        let empty: EarningsCalendarResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.earnings_calendar.is_empty());
    }

    #[test]
    fn test_parse_eps_and_recommendations() {
        let eps: Vec<EpsSurprise> = serde_json::from_str(
            r#"[{"actual": 2.18, "estimate": 2.1, "period": "2023-12-31",
                 "quarter": 1, "surprise": 0.08, "surprisePercent": 3.8095,
                 "symbol": "AAPL", "year": 2024}]"#,
        )
        .unwrap();
        assert_eq!(eps[0].surprise_percent, Some(3.8095));

        let trends: Vec<RecommendationTrend> = serde_json::from_str(
            r#"[{"buy": 24, "hold": 7, "period": "2024-01-01", "sell": 0,
                 "strongBuy": 13, "strongSell": 0, "symbol": "AAPL"}]"#,
        )
        .unwrap();
        assert_eq!(trends[0].strong_buy, 13);
        assert_eq!(trends[0].total(), 44);
    }

    #[tokio::test]
    #[ignore = "requires FINNHUB_KEY and network access"]
    async fn test_live_company_profile() {
        let key = std::env::var("FINNHUB_KEY").unwrap();
        let client = FinnhubClient::new(key, 60, Duration::from_secs(10)).unwrap();
        let profile = client.company_profile("AAPL").await.unwrap();
        assert_eq!(profile.ticker, "AAPL");
    }
}
