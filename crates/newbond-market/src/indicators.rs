//! Economic indicator aggregation
//!
//! Six FRED series are fetched concurrently, transformed (YoY or raw),
//! spread onto a daily calendar and merged into one wide table.

use crate::api::EconomicDataSource;
use crate::error::{MarketError, Result};
use crate::series::{IndicatorSeries, days_between, next_day};
use chrono::NaiveDate;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// FRED ids for the supplementary rate charts
pub mod series_ids {
    /// Effective federal funds rate (monthly)
    pub const FED_FUNDS: &str = "FEDFUNDS";
    pub const TREASURY_10Y: &str = "DGS10";
    pub const TREASURY_2Y: &str = "DGS2";
}

/// How an indicator's raw values become table values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    YoY,
    Raw,
}

/// The macro indicators shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    Cpi,
    Pce,
    Ppi,
    FedRate,
    HomePrice,
    GdpGrowth,
}

impl Indicator {
    /// Column order of the merged table
    pub const ALL: [Indicator; 6] = [
        Indicator::Cpi,
        Indicator::Pce,
        Indicator::Ppi,
        Indicator::FedRate,
        Indicator::HomePrice,
        Indicator::GdpGrowth,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Cpi => "CPI(YoY)",
            Self::Pce => "PCE(YoY)",
            Self::Ppi => "PPI(YoY)",
            Self::FedRate => "FED RATE",
            Self::HomePrice => "CS(YoY)",
            Self::GdpGrowth => "GDP RATE",
        }
    }

    pub fn fred_id(self) -> &'static str {
        match self {
            Self::Cpi => "CPIAUCSL",
            Self::Pce => "PCEPI",
            Self::Ppi => "PPIFID",
            Self::FedRate => "DFEDTARU",
            Self::HomePrice => "CSUSHPISA",
            Self::GdpGrowth => "A191RL1Q225SBEA",
        }
    }

    pub fn transform(self) -> Transform {
        match self {
            Self::FedRate | Self::GdpGrowth => Transform::Raw,
            _ => Transform::YoY,
        }
    }

    /// Apply the transform and rename to the column label
    pub fn prepare(self, raw: IndicatorSeries) -> Result<IndicatorSeries> {
        let transformed = match self.transform() {
            Transform::YoY => raw.yoy()?,
            Transform::Raw => raw,
        };
        Ok(transformed.with_name(self.label()))
    }
}

/// One day of the merged table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

/// Daily wide table, one column per indicator.
///
/// Rows are consecutive calendar days. A cell is missing only before its
/// indicator's first published value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndicatorTable {
    columns: Vec<String>,
    rows: Vec<IndicatorRow>,
}

impl IndicatorTable {
    /// Outer-merge daily series on date, then forward-fill every column
    /// across the merged span.
    pub fn merge(series: &[IndicatorSeries]) -> Self {
        let columns: Vec<String> = series.iter().map(|s| s.name().to_string()).collect();
        let span_start = series.iter().filter_map(IndicatorSeries::first_date).min();
        let span_end = series.iter().filter_map(IndicatorSeries::last_date).max();
        let (Some(span_start), Some(span_end)) = (span_start, span_end) else {
            return Self {
                columns,
                rows: Vec::new(),
            };
        };

        let days = days_between(span_start, span_end) + 1;
        let mut grid = vec![vec![None; series.len()]; days];
        for (col, s) in series.iter().enumerate() {
            for point in s.points() {
                grid[days_between(span_start, point.date)][col] = point.value;
            }
        }

        let mut carried: Vec<Option<f64>> = vec![None; series.len()];
        let mut rows = Vec::with_capacity(days);
        let mut date = span_start;
        for mut values in grid {
            for (cell, last) in values.iter_mut().zip(carried.iter_mut()) {
                match cell {
                    Some(v) => *last = Some(*v),
                    None => *cell = *last,
                }
            }
            rows.push(IndicatorRow { date, values });
            date = next_day(date);
        }

        Self { columns, rows }
    }

    /// Rows with `date >= start`
    pub fn truncate_from(mut self, start: NaiveDate) -> Self {
        self.rows.retain(|row| row.date >= start);
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    /// One column as `(date, value)` pairs
    pub fn column(&self, label: &str) -> Option<Vec<(NaiveDate, Option<f64>)>> {
        let idx = self.columns.iter().position(|c| c == label)?;
        Some(self.rows.iter().map(|r| (r.date, r.values[idx])).collect())
    }

    /// Cell lookup; `None` when the date, the column or the value is absent
    pub fn value(&self, date: NaiveDate, label: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == label)?;
        let first = self.first_date()?;
        if date < first {
            return None;
        }
        self.rows
            .get(days_between(first, date))
            .filter(|row| row.date == date)
            .and_then(|row| row.values[idx])
    }

    /// True when consecutive rows are exactly one day apart
    pub fn is_contiguous(&self) -> bool {
        self.rows
            .windows(2)
            .all(|w| (w[1].date - w[0].date).num_days() == 1)
    }
}

/// Builds the merged indicator table from an [`EconomicDataSource`]
pub struct IndicatorAggregator {
    source: Arc<dyn EconomicDataSource>,
}

impl IndicatorAggregator {
    pub fn new(source: Arc<dyn EconomicDataSource>) -> Self {
        Self { source }
    }

    /// Fetch all six indicators and merge them from `start` onwards.
    ///
    /// Any single failure aborts the aggregation.
    #[instrument(skip(self))]
    pub async fn aggregate(&self, start: NaiveDate) -> Result<IndicatorTable> {
        let fetches = Indicator::ALL.into_iter().map(|indicator| async move {
            let raw = self
                .source
                .fetch_series(indicator.fred_id(), None, None)
                .await?;
            debug!(indicator = indicator.label(), points = raw.len(), "fetched");
            Ok::<_, MarketError>((indicator, raw))
        });
        let raw = try_join_all(fetches).await?;

        let table = Self::assemble(raw, start)?;
        info!(
            rows = table.len(),
            first = ?table.first_date(),
            last = ?table.last_date(),
            "indicator table assembled"
        );
        Ok(table)
    }

    /// Transform, resample, merge and truncate already-fetched series
    pub fn assemble(
        raw: Vec<(Indicator, IndicatorSeries)>,
        start: NaiveDate,
    ) -> Result<IndicatorTable> {
        let daily = raw
            .into_iter()
            .map(|(indicator, series)| Ok(indicator.prepare(series)?.resample_daily()))
            .collect::<Result<Vec<_>>>()?;

        Ok(IndicatorTable::merge(&daily).truncate_from(start))
    }

    /// FEDFUNDS between two dates, for the base-rate chart
    pub async fn base_rate(&self, start: NaiveDate, end: NaiveDate) -> Result<IndicatorSeries> {
        let series = self
            .source
            .fetch_series(series_ids::FED_FUNDS, Some(start), Some(end))
            .await?;
        Ok(series.between(start, end).with_name("Fed Funds Rate"))
    }

    /// 10Y and 2Y treasury yields, full history
    pub async fn treasury_yields(&self) -> Result<(IndicatorSeries, IndicatorSeries)> {
        let (ten, two) = tokio::try_join!(
            self.source.fetch_series(series_ids::TREASURY_10Y, None, None),
            self.source.fetch_series(series_ids::TREASURY_2Y, None, None),
        )?;
        Ok((ten.with_name("10Y"), two.with_name("2Y")))
    }
}
