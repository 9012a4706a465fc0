//! RapidAPI hosted feeds: trader economic calendar and Seeking Alpha news

use super::{MarketNewsSource, error_body};
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

const CALENDAR_HOST: &str = "trader-calendar.p.rapidapi.com";
const SEEKING_ALPHA_HOST: &str = "seeking-alpha.p.rapidapi.com";
const PROVIDER: &str = "RapidAPI";

/// News article reduced to the fields the front end renders
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeekingNewsItem {
    #[serde(rename = "publishOn")]
    pub publish_on: Option<String>,
    #[serde(rename = "gettyImageUrl")]
    pub getty_image_url: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

/// RapidAPI client; one key serves both hosts
pub struct RapidApiClient {
    client: Client,
    api_key: String,
    calendar_url: String,
    news_url: String,
}

impl RapidApiClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MarketError::Config(format!("failed to build RapidAPI client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            calendar_url: format!("https://{CALENDAR_HOST}/api/calendar"),
            news_url: format!("https://{SEEKING_ALPHA_HOST}/news/v2/list"),
        })
    }

    fn require_key(&self) -> Result<&str> {
        if self.api_key.trim().is_empty() {
            return Err(MarketError::Config("RAPID_API_KEY is not set".to_string()));
        }
        Ok(&self.api_key)
    }
}

/// Pull `data[].attributes` out of a Seeking Alpha news list
pub fn parse_seeking_news(body: &Value) -> Result<Vec<SeekingNewsItem>> {
    let data = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| MarketError::DataShape("news list has no `data` array".to_string()))?;

    Ok(data
        .iter()
        .map(|item| {
            let attr = item.get("attributes");
            let field = |name: &str| {
                attr.and_then(|a| a.get(name))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            };
            SeekingNewsItem {
                publish_on: field("publishOn"),
                getty_image_url: field("gettyImageUrl"),
                title: field("title"),
                content: field("content"),
            }
        })
        .collect())
}

#[async_trait]
impl MarketNewsSource for RapidApiClient {
    #[instrument(skip(self))]
    async fn economic_calendar(&self, country: &str, start: NaiveDate) -> Result<Value> {
        let key = self.require_key()?;
        let payload = serde_json::json!({
            "country": country,
            "start": start.format("%Y-%m-%d").to_string(),
        });

        let response = self
            .client
            .post(&self.calendar_url)
            .header("X-RapidAPI-Key", key)
            .header("X-RapidAPI-Host", CALENDAR_HOST)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MarketError::from_reqwest(PROVIDER, &e))?;

        if !response.status().is_success() {
            return Err(MarketError::fetch(PROVIDER, error_body(response).await));
        }

        response
            .json()
            .await
            .map_err(|e| MarketError::DataShape(format!("calendar response: {e}")))
    }

    #[instrument(skip(self))]
    async fn seeking_news(&self, categories: &[String]) -> Result<Vec<SeekingNewsItem>> {
        if categories.is_empty() {
            return Err(MarketError::InvalidInput(
                "at least one news category is required".to_string(),
            ));
        }
        let key = self.require_key()?;
        let category = categories.join("|");
        debug!(%category, "Seeking Alpha news request");

        let response = self
            .client
            .get(&self.news_url)
            .header("X-RapidAPI-Key", key)
            .header("X-RapidAPI-Host", SEEKING_ALPHA_HOST)
            .query(&[("category", category.as_str()), ("size", "10"), ("number", "1")])
            .send()
            .await
            .map_err(|e| MarketError::from_reqwest(PROVIDER, &e))?;

        if !response.status().is_success() {
            return Err(MarketError::fetch(PROVIDER, error_body(response).await));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| MarketError::DataShape(format!("news response: {e}")))?;
        parse_seeking_news(&body)
    }
}
