//! Federal Reserve Economic Data (FRED) API client
//!
//! API Key: free registration at https://fred.stlouisfed.org/docs/api/api_key.html
//! Rate Limit: 120 requests per minute

use super::{EconomicDataSource, error_body};
use crate::error::{MarketError, Result};
use crate::series::{IndicatorSeries, Periodicity, TimeSeriesPoint};
use async_trait::async_trait;
use chrono::NaiveDate;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred";
const PROVIDER: &str = "FRED";

/// FRED series metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesInfo {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub frequency_short: String,
    #[serde(default)]
    pub units_short: String,
}

impl SeriesInfo {
    pub fn periodicity(&self) -> Result<Periodicity> {
        Periodicity::from_fred_code(&self.frequency_short).ok_or_else(|| {
            MarketError::DataShape(format!(
                "series {} has unsupported frequency '{}'",
                self.id, self.frequency_short
            ))
        })
    }
}

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    seriess: Vec<SeriesInfo>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

/// FRED API client
pub struct FredClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl FredClient {
    /// * `rate_limit` - requests per minute
    /// * `timeout` - per-request timeout
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Result<Self> {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MarketError::Config(format!("failed to build FRED client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: FRED_BASE_URL.to_string(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Point the client at another host (for a local replay server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Series metadata, used for the declared frequency
    #[instrument(skip(self))]
    pub async fn series_info(&self, series_id: &str) -> Result<SeriesInfo> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/series", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
            ])
            .send()
            .await
            .map_err(|e| MarketError::from_reqwest(PROVIDER, &e))?;

        if !response.status().is_success() {
            return Err(MarketError::fetch(PROVIDER, error_body(response).await));
        }

        let data: SeriesResponse = response
            .json()
            .await
            .map_err(|e| MarketError::DataShape(format!("FRED series response: {e}")))?;

        data.seriess
            .into_iter()
            .next()
            .ok_or_else(|| MarketError::fetch(PROVIDER, format!("series {series_id} not found")))
    }

    /// Raw observations in ascending date order
    #[instrument(skip(self))]
    pub async fn observations(
        &self,
        series_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<TimeSeriesPoint>> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/series/observations", self.base_url);
        let mut query = vec![
            ("series_id", series_id.to_string()),
            ("api_key", self.api_key.clone()),
            ("file_type", "json".to_string()),
            ("sort_order", "asc".to_string()),
        ];
        if let Some(start) = start {
            query.push(("observation_start", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = end {
            query.push(("observation_end", end.format("%Y-%m-%d").to_string()));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| MarketError::from_reqwest(PROVIDER, &e))?;

        if !response.status().is_success() {
            return Err(MarketError::fetch(PROVIDER, error_body(response).await));
        }

        let data: ObservationsResponse = response
            .json()
            .await
            .map_err(|e| MarketError::DataShape(format!("FRED observations response: {e}")))?;

        data.observations
            .iter()
            .map(|obs| TimeSeriesPoint::parse(&obs.date, &obs.value))
            .collect()
    }
}

#[async_trait]
impl EconomicDataSource for FredClient {
    async fn fetch_series(
        &self,
        series_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<IndicatorSeries> {
        let (info, points) = tokio::try_join!(
            self.series_info(series_id),
            self.observations(series_id, start, end)
        )?;

        if points.is_empty() {
            return Err(MarketError::fetch(
                PROVIDER,
                format!("series {series_id} returned no observations"),
            ));
        }
        debug!(series_id, observations = points.len(), frequency = %info.frequency_short, "Fetched FRED series");

        IndicatorSeries::new(series_id, info.periodicity()?, points)
    }
}
