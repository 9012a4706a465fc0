//! Time series primitives for macro indicators
//!
//! Observations arrive at their native frequency (monthly CPI, quarterly GDP,
//! daily rates). The aggregator transforms them here before they are laid out
//! on a shared daily calendar.

use crate::error::{MarketError, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// One observation; `value` is `None` when the provider published a
/// placeholder (FRED uses `"."`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl TimeSeriesPoint {
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self { date, value }
    }

    /// Parse a provider row. A bad date is a shape error; a non-numeric value
    /// is just missing.
    pub fn parse(date: &str, value: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|e| MarketError::DataShape(format!("invalid observation date '{date}': {e}")))?;
        let value = value.trim().parse::<f64>().ok().filter(|v| v.is_finite());
        Ok(Self { date, value })
    }
}

/// Declared sampling frequency of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Periodicity {
    Daily,
    Weekly,
    BiWeekly,
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl Periodicity {
    /// Parse FRED's `frequency_short` code
    pub fn from_fred_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "D" => Some(Self::Daily),
            "W" => Some(Self::Weekly),
            "BW" => Some(Self::BiWeekly),
            "M" => Some(Self::Monthly),
            "Q" => Some(Self::Quarterly),
            "SA" => Some(Self::SemiAnnual),
            "A" => Some(Self::Annual),
            _ => None,
        }
    }

    /// Row offset that points one year back. Daily data has none: trading
    /// calendars make a fixed daily lag meaningless.
    pub fn periods_per_year(self) -> Option<usize> {
        match self {
            Self::Daily => None,
            Self::Weekly => Some(52),
            Self::BiWeekly => Some(26),
            Self::Monthly => Some(12),
            Self::Quarterly => Some(4),
            Self::SemiAnnual => Some(2),
            Self::Annual => Some(1),
        }
    }
}

/// A named, date-ordered series with its declared periodicity.
///
/// Dates are strictly increasing; construction sorts the input and rejects
/// duplicate dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    name: String,
    periodicity: Periodicity,
    points: Vec<TimeSeriesPoint>,
}

impl IndicatorSeries {
    pub fn new(
        name: impl Into<String>,
        periodicity: Periodicity,
        mut points: Vec<TimeSeriesPoint>,
    ) -> Result<Self> {
        let name = name.into();
        points.sort_by_key(|p| p.date);
        if let Some(pair) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(MarketError::DataShape(format!(
                "series {name} has duplicate observations on {}",
                pair[0].date
            )));
        }
        Ok(Self {
            name,
            periodicity,
            points,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn periodicity(&self) -> Periodicity {
        self.periodicity
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Points with a value, as `(date, value)` pairs
    pub fn values(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.value.map(|v| (p.date, v)))
    }

    /// Keep points with `start <= date <= end`
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            name: self.name.clone(),
            periodicity: self.periodicity,
            points: self
                .points
                .iter()
                .filter(|p| p.date >= start && p.date <= end)
                .copied()
                .collect(),
        }
    }

    /// Year-over-year percentage change.
    ///
    /// `yoy[t] = (raw[t] - raw[t-L]) / raw[t-L] * 100` with `L` the row offset
    /// from [`Periodicity::periods_per_year`]. The first `L` points, points
    /// with a missing operand and points whose base is zero come out missing.
    pub fn yoy(&self) -> Result<Self> {
        let lag = self.periodicity.periods_per_year().ok_or_else(|| {
            MarketError::DataShape(format!(
                "series {} is {:?}; year-over-year needs a periodic series",
                self.name, self.periodicity
            ))
        })?;

        let points = self
            .points
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let value = i
                    .checked_sub(lag)
                    .and_then(|j| match (point.value, self.points[j].value) {
                        (Some(now), Some(base)) if base != 0.0 => Some((now - base) / base * 100.0),
                        _ => None,
                    });
                TimeSeriesPoint::new(point.date, value)
            })
            .collect();

        Ok(Self {
            name: self.name.clone(),
            periodicity: self.periodicity,
            points,
        })
    }

    /// Spread the series over every calendar day from its first to its last
    /// observation. Each day carries the latest non-missing value at or
    /// before it; days before the first real value stay missing.
    pub fn resample_daily(&self) -> Self {
        let (Some(first), Some(last)) = (self.first_date(), self.last_date()) else {
            return Self {
                name: self.name.clone(),
                periodicity: Periodicity::Daily,
                points: Vec::new(),
            };
        };

        let mut points = Vec::with_capacity(days_between(first, last) + 1);
        let mut source = self.points.iter().peekable();
        let mut carried = None;
        let mut day = first;
        loop {
            while let Some(p) = source.next_if(|p| p.date <= day) {
                if p.value.is_some() {
                    carried = p.value;
                }
            }
            points.push(TimeSeriesPoint::new(day, carried));
            if day >= last {
                break;
            }
            day = next_day(day);
        }

        Self {
            name: self.name.clone(),
            periodicity: Periodicity::Daily,
            points,
        }
    }
}

pub(crate) fn next_day(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(date)
}

pub(crate) fn days_between(start: NaiveDate, end: NaiveDate) -> usize {
    usize::try_from((end - start).num_days()).unwrap_or(0)
}
