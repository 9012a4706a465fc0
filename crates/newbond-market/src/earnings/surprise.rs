//! Actual-vs-consensus comparison for a reported quarter

use super::EarningsWindow;
use serde::Serialize;

/// `|actual / estimate - 1| * 100` rounded to one decimal.
/// `None` when the estimate is zero.
pub fn surprise_percent(actual: f64, estimate: f64) -> Option<f64> {
    if estimate == 0.0 {
        return None;
    }
    let pct = ((actual / estimate) - 1.0).abs() * 100.0;
    Some((pct * 10.0).round() / 10.0)
}

/// `"10.0%"`, or `"N/A"` when not computable
pub fn format_surprise(pct: Option<f64>) -> String {
    pct.map_or_else(|| "N/A".to_string(), |p| format!("{p:.1}%"))
}

/// Dollars to whole millions
pub fn to_millions(value: f64) -> i64 {
    (value / 1_000_000.0).round() as i64
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpsComparison {
    pub actual: f64,
    pub estimate: f64,
    pub surprise: String,
    pub beat: bool,
}

/// Revenue in rounded millions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueComparison {
    pub actual: i64,
    pub estimate: i64,
    pub surprise: String,
    pub above: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarningsSurprise {
    pub eps: EpsComparison,
    pub revenue: Option<RevenueComparison>,
}

impl EarningsSurprise {
    /// `None` before the quarter is reported
    pub fn from_window(window: &EarningsWindow) -> Option<Self> {
        let eps_actual = window.eps_actual?;
        let eps = EpsComparison {
            actual: eps_actual,
            estimate: window.eps_estimate,
            surprise: format_surprise(surprise_percent(eps_actual, window.eps_estimate)),
            beat: eps_actual > window.eps_estimate,
        };

        let revenue = window.revenue_actual.map(|actual| {
            let (actual, estimate) = (to_millions(actual), to_millions(window.revenue_estimate));
            RevenueComparison {
                actual,
                estimate,
                surprise: format_surprise(surprise_percent(actual as f64, estimate as f64)),
                above: actual > estimate,
            }
        });

        Some(Self { eps, revenue })
    }
}
