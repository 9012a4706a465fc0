//! News and price windows around the announcement

use chrono::{Days, NaiveDate};
use serde::Serialize;

const RECENT_DAYS: u64 = 21;
const REACTION_DAYS: u64 = 7;

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

fn minus(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days)).unwrap_or(date)
}

fn plus(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(date)
}

/// Last three weeks: `[today - 21d, today]`
pub fn recent_window(today: NaiveDate) -> DateWindow {
    DateWindow::new(minus(today, RECENT_DAYS), today)
}

/// Windows used once results are out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PostAnnouncementWindows {
    /// `[ann - 21d, ann - 1d]`
    pub before: DateWindow,
    /// `[ann, min(ann + 7d, today)]`
    pub after: DateWindow,
    /// `[ann + 7d, today]`, only once more than a week has passed
    pub after_seven: Option<DateWindow>,
}

impl PostAnnouncementWindows {
    pub fn new(announced: NaiveDate, today: NaiveDate) -> Self {
        let week_after = plus(announced, REACTION_DAYS);
        Self {
            before: DateWindow::new(minus(announced, RECENT_DAYS), minus(announced, 1)),
            after: DateWindow::new(announced, week_after.min(today).max(announced)),
            after_seven: (today > week_after).then(|| DateWindow::new(week_after, today)),
        }
    }
}
