//! Market data pipelines behind the newbond web service
//!
//! This crate holds everything the HTTP layer calls into:
//!
//! - Provider clients for FRED, Finnhub, Yahoo Finance and RapidAPI
//! - Economic indicator aggregation into one daily table
//! - Earnings narrative prompts and their LLM analysis
//! - The news assistant (translate, opinions, summarize)
//! - PNG chart rendering
//!
//! # Architecture
//!
//! Providers sit behind the traits in [`api`] so pipelines can be driven by
//! mocks. Pipelines never talk HTTP themselves:
//! - [`IndicatorAggregator`]: six FRED series to one forward-filled table
//! - [`EarningsNarrativeBuilder`]: calendar, news and prices to a prompt
//! - [`EarningsAnalyst`]: the prompt sent to the analysis model
//! - [`NewsAssistant`]: news payloads sent to the news model
//!
//! # Example
//!
//! ```rust,ignore
//! use newbond_market::{IndicatorAggregator, MarketConfig};
//! use newbond_market::api::FredClient;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> newbond_market::Result<()> {
//!     let config = MarketConfig::from_env()?;
//!     let fred = FredClient::new(
//!         config.fred_api_key.clone(),
//!         config.fred_rate_limit,
//!         config.request_timeout,
//!     )?;
//!
//!     let table = IndicatorAggregator::new(Arc::new(fred))
//!         .aggregate(config.indicator_start)
//!         .await?;
//!     println!("{} rows from {:?}", table.len(), table.first_date());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod assistant;
pub mod charts;
pub mod config;
pub mod earnings;
pub mod error;
pub mod indicators;
pub mod prompts;
pub mod series;
pub mod ticker;

pub use assistant::{NewsAction, NewsAssistant, NewsReply};
pub use charts::ChartStyle;
pub use config::{GenerationLimits, MarketConfig, MarketConfigBuilder};
pub use earnings::{AnalysisReport, EarningsAnalyst, EarningsNarrativeBuilder, NewsSampling, PromptBundle};
pub use error::{MarketError, Result};
pub use indicators::{Indicator, IndicatorAggregator, IndicatorRow, IndicatorTable};
pub use prompts::prompt_registry;
pub use series::{IndicatorSeries, Periodicity, TimeSeriesPoint};
pub use ticker::normalize_ticker;

pub use newbond_prompt::Language;
