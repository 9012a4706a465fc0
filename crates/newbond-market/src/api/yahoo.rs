//! Yahoo Finance daily price history

use super::PriceSource;
use crate::error::{MarketError, Result};
use crate::series::next_day;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

const PROVIDER: &str = "Yahoo Finance";

/// One daily bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
    pub adjclose: f64,
    pub volume: u64,
}

/// Yahoo Finance client. A connector is created per call; the upstream
/// crate holds no state worth sharing.
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    timeout: Duration,
}

impl YahooFinanceClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

fn to_offset(date: NaiveDate) -> Result<OffsetDateTime> {
    let ts = date.and_time(NaiveTime::MIN).and_utc().timestamp();
    OffsetDateTime::from_unix_timestamp(ts)
        .map_err(|e| MarketError::InvalidInput(format!("date {date} out of range: {e}")))
}

fn to_bars(quotes: &[yahoo::Quote], start: NaiveDate, end: NaiveDate) -> Vec<PriceBar> {
    quotes
        .iter()
        .filter_map(|q| {
            let date = DateTime::from_timestamp(q.timestamp as i64, 0)?.date_naive();
            Some(PriceBar {
                date,
                close: q.close,
                adjclose: q.adjclose,
                volume: q.volume,
            })
        })
        .filter(|bar| bar.date >= start && bar.date <= end)
        .collect()
}

/// A range with no trading days answers without timestamps; any other
/// quote error is a provider failure
fn quotes_or_empty(
    quotes: std::result::Result<Vec<yahoo::Quote>, yahoo::YahooError>,
) -> Result<Vec<yahoo::Quote>> {
    match quotes {
        Err(yahoo::YahooError::NoQuotes) => Ok(Vec::new()),
        other => other.map_err(|e| MarketError::fetch(PROVIDER, e.to_string())),
    }
}

#[async_trait]
impl PriceSource for YahooFinanceClient {
    #[instrument(skip(self))]
    async fn price_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        let provider =
            yahoo::YahooConnector::new().map_err(|e| MarketError::fetch(PROVIDER, e.to_string()))?;

        // Upstream end bound is exclusive
        let (from, to) = (to_offset(start)?, to_offset(next_day(end))?);
        let response = tokio::time::timeout(self.timeout, provider.get_quote_history(ticker, from, to))
            .await
            .map_err(|_| MarketError::fetch(PROVIDER, format!("timed out after {:?}", self.timeout)))?
            .map_err(|e| MarketError::fetch(PROVIDER, e.to_string()))?;

        let quotes = quotes_or_empty(response.quotes())?;
        if quotes.is_empty() {
            debug!(ticker, %start, %end, "No quotes in range");
        }

        let mut bars = to_bars(&quotes, start, end);
        bars.sort_by_key(|b| b.date);
        debug!(ticker, bars = bars.len(), "Fetched price history");
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_offset() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let odt = to_offset(date).unwrap();
        assert_eq!(odt.unix_timestamp(), 1_704_153_600);
    }

    #[test]
    fn test_only_missing_quotes_count_as_empty() {
        assert!(quotes_or_empty(Err(yahoo::YahooError::NoQuotes)).unwrap().is_empty());

        for err in [yahoo::YahooError::DataInconsistency, yahoo::YahooError::NoResult] {
            assert!(matches!(
                quotes_or_empty(Err(err)),
                Err(MarketError::ProviderFetch { ref provider, .. }) if provider == PROVIDER
            ));
        }
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_live_price_history() {
        let client = YahooFinanceClient::default();
        let end = chrono::Local::now().date_naive();
        let start = end - chrono::Days::new(30);
        let bars = client.price_history("AAPL", start, end).await.unwrap();
        assert!(!bars.is_empty());
        assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
    }
}
