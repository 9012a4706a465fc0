//! Price movement over a news window

use crate::api::PriceBar;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceDirection {
    Up,
    Down,
    Flat,
}

impl PriceDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Flat => "flat",
        }
    }
}

/// First and last adjusted close of a window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceMove {
    pub first: f64,
    pub last: f64,
    pub direction: PriceDirection,
}

impl PriceMove {
    /// `None` for a window without trading days
    pub fn from_bars(bars: &[PriceBar]) -> Option<Self> {
        let (first, last) = (bars.first()?.adjclose, bars.last()?.adjclose);
        let direction = if last > first {
            PriceDirection::Up
        } else if last < first {
            PriceDirection::Down
        } else {
            PriceDirection::Flat
        };
        Some(Self {
            first,
            last,
            direction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u32, adjclose: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            close: adjclose,
            adjclose,
            volume: 1_000,
        }
    }

    #[test]
    fn test_direction() {
        let up = PriceMove::from_bars(&[bar(2, 185.64), bar(3, 184.25), bar(4, 193.89)]).unwrap();
        assert_eq!(up.direction, PriceDirection::Up);
        assert_eq!(up.first, 185.64);

        let down = PriceMove::from_bars(&[bar(2, 190.0), bar(3, 180.0)]).unwrap();
        assert_eq!(down.direction, PriceDirection::Down);

        let flat = PriceMove::from_bars(&[bar(2, 190.0)]).unwrap();
        assert_eq!(flat.direction.as_str(), "flat");

        assert!(PriceMove::from_bars(&[]).is_none());
    }
}
