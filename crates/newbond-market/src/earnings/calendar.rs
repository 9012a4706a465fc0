//! Earnings calendar selection

use crate::api::EarningsCalendarEntry;
use crate::error::{MarketError, Result};
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

/// Days searched before and after today for the announcement
pub const CALENDAR_LOOKBACK_DAYS: u64 = 90;
pub const CALENDAR_LOOKAHEAD_DAYS: u64 = 30;

/// Whether the selected quarter has reported yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EarningsPhase {
    PreAnnouncement,
    PostAnnouncement,
}

/// The calendar entry the narrative is built around
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarningsWindow {
    pub announcement_date: NaiveDate,
    pub eps_actual: Option<f64>,
    pub eps_estimate: f64,
    pub revenue_actual: Option<f64>,
    pub revenue_estimate: f64,
    pub fiscal_year: i32,
    pub fiscal_quarter: u32,
}

impl EarningsWindow {
    pub fn from_entry(entry: &EarningsCalendarEntry) -> Result<Self> {
        let missing = |field: &str| {
            MarketError::DataShape(format!(
                "earnings calendar entry for {} has no {field}",
                entry.symbol
            ))
        };

        let announcement_date = entry
            .date
            .as_deref()
            .ok_or_else(|| missing("date"))
            .and_then(|d| {
                NaiveDate::parse_from_str(d, "%Y-%m-%d")
                    .map_err(|e| MarketError::DataShape(format!("invalid announcement date '{d}': {e}")))
            })?;

        Ok(Self {
            announcement_date,
            eps_actual: entry.eps_actual,
            eps_estimate: entry.eps_estimate.ok_or_else(|| missing("epsEstimate"))?,
            revenue_actual: entry.revenue_actual,
            revenue_estimate: entry.revenue_estimate.ok_or_else(|| missing("revenueEstimate"))?,
            // Without Finnhub's fiscal labels, fall back to the calendar quarter
            fiscal_year: entry.year.unwrap_or_else(|| announcement_date.year()),
            fiscal_quarter: entry.quarter.unwrap_or_else(|| announcement_date.month0() / 3 + 1),
        })
    }

    pub fn phase(&self) -> EarningsPhase {
        if self.eps_actual.is_some() {
            EarningsPhase::PostAnnouncement
        } else {
            EarningsPhase::PreAnnouncement
        }
    }
}

/// `[today - 90d, today + 30d]`
pub fn calendar_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (
        today
            .checked_sub_days(Days::new(CALENDAR_LOOKBACK_DAYS))
            .unwrap_or(today),
        today
            .checked_add_days(Days::new(CALENDAR_LOOKAHEAD_DAYS))
            .unwrap_or(today),
    )
}

/// Entry whose date is nearest to `today`; ties go to the later date.
/// Entries without a parseable date are skipped.
pub fn select_nearest(entries: &[EarningsCalendarEntry], today: NaiveDate) -> Result<&EarningsCalendarEntry> {
    entries
        .iter()
        .filter_map(|entry| {
            let date = NaiveDate::parse_from_str(entry.date.as_deref()?, "%Y-%m-%d").ok()?;
            Some((entry, date))
        })
        .min_by_key(|(_, date)| ((*date - today).num_days().abs(), std::cmp::Reverse(*date)))
        .map(|(entry, _)| entry)
        .ok_or_else(|| MarketError::DataShape("no earnings calendar entry in range".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(date: &str, eps_actual: Option<f64>) -> EarningsCalendarEntry {
        EarningsCalendarEntry {
            date: Some(date.to_string()),
            symbol: "AAPL".into(),
            eps_actual,
            eps_estimate: Some(2.1),
            revenue_actual: None,
            revenue_estimate: Some(117_910_000_000.0),
            year: Some(2024),
            quarter: Some(1),
            hour: None,
        }
    }

    #[test]
    fn test_select_nearest_prefers_later_on_tie() {
        let today = date(2024, 3, 1);
        let entries = vec![
            entry("2024-02-20", Some(2.0)),
            entry("2024-03-11", None),
            entry("2024-02-29", Some(2.2)),
            entry("2024-03-02", None),
        ];
        let picked = select_nearest(&entries, today).unwrap();
        assert_eq!(picked.date.as_deref(), Some("2024-03-02"));
    }

    #[test]
    fn test_select_nearest_skips_undated() {
        let mut undated = entry("2024-03-01", None);
        undated.date = None;
        assert!(matches!(
            select_nearest(&[undated], date(2024, 3, 1)),
            Err(MarketError::DataShape(_))
        ));
        assert!(select_nearest(&[], date(2024, 3, 1)).is_err());
    }

    #[test]
    fn test_phase_from_eps_actual() {
        let pre = EarningsWindow::from_entry(&entry("2024-02-01", None)).unwrap();
        assert_eq!(pre.phase(), EarningsPhase::PreAnnouncement);

        let post = EarningsWindow::from_entry(&entry("2024-02-01", Some(2.18))).unwrap();
        assert_eq!(post.phase(), EarningsPhase::PostAnnouncement);
        assert_eq!(post.announcement_date, date(2024, 2, 1));
    }

    #[test]
    fn test_missing_estimate_is_shape_error() {
        let mut e = entry("2024-02-01", None);
        e.eps_estimate = None;
        let err = EarningsWindow::from_entry(&e).unwrap_err();
        assert!(err.to_string().contains("epsEstimate"));

        let mut e = entry("2024-02-01", None);
        e.revenue_estimate = None;
        assert!(matches!(EarningsWindow::from_entry(&e), Err(MarketError::DataShape(_))));
    }

    #[test]
    fn test_missing_fiscal_period_uses_announcement_date() {
        let mut e = entry("2024-05-02", Some(1.53));
        e.year = None;
        e.quarter = None;
        let window = EarningsWindow::from_entry(&e).unwrap();
        assert_eq!((window.fiscal_year, window.fiscal_quarter), (2024, 2));

        let mut e = entry("2023-12-28", None);
        e.quarter = None;
        let window = EarningsWindow::from_entry(&e).unwrap();
        assert_eq!((window.fiscal_year, window.fiscal_quarter), (2024, 4));
    }

    #[test]
    fn test_calendar_range() {
        let (from, to) = calendar_range(date(2024, 3, 1));
        assert_eq!(from, date(2023, 12, 2));
        assert_eq!(to, date(2024, 3, 31));
    }
}
