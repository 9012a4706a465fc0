//! Date-indexed line charts: base rate, treasury yields, macro indicators

use super::{ChartStyle, chart_err, date_to_x, fonts_available, padded_range, render_png, x_to_label};
use crate::error::{MarketError, Result};
use crate::indicators::IndicatorTable;
use crate::series::IndicatorSeries;
use chrono::NaiveDate;
use plotters::prelude::*;

pub const BASE_RATE_TITLE: &str = "US Federal Funds Rate";
pub const YIELDS_TITLE: &str = "US Treasury Yields (10Y / 2Y)";
pub const INDICATORS_TITLE: &str = "Key Global Economic Indicators";

/// One named line
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeriesData {
    pub label: String,
    pub points: Vec<(NaiveDate, f64)>,
}

impl LineSeriesData {
    pub fn new(label: impl Into<String>, points: Vec<(NaiveDate, f64)>) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }

    /// Non-missing points of `series`, labelled with its name
    pub fn from_series(series: &IndicatorSeries) -> Self {
        Self::new(series.name(), series.values().collect())
    }
}

/// Lines over a shared date axis; a legend is drawn for two or more series
pub fn render_line_chart(
    title: &str,
    y_desc: &str,
    series: &[LineSeriesData],
    style: &ChartStyle,
) -> Result<Vec<u8>> {
    let points = || series.iter().flat_map(|s| s.points.iter());
    let (x0, x1) = points()
        .map(|(d, _)| date_to_x(*d))
        .fold(None, |acc: Option<(f64, f64)>, x| match acc {
            None => Some((x, x)),
            Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
        })
        .map(|(lo, hi)| if hi > lo { (lo, hi) } else { (lo - 1.0, hi + 1.0) })
        .ok_or_else(|| MarketError::DataShape(format!("{title}: nothing to plot")))?;
    let (y0, y1) = padded_range(points().map(|(_, v)| *v))
        .ok_or_else(|| MarketError::DataShape(format!("{title}: nothing to plot")))?;

    let text = fonts_available();
    render_png(style.width, style.height, |root| {
        let mut builder = ChartBuilder::on(root);
        builder.margin(15);
        if text {
            builder
                .caption(title, style.title_font())
                .x_label_area_size(40)
                .y_label_area_size(55);
        }
        let mut chart = builder
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(chart_err)?;

        if text {
            chart
                .configure_mesh()
                .x_labels(8)
                .x_label_formatter(&|x| x_to_label(*x))
                .x_desc("Date")
                .y_desc(y_desc)
                .label_style(style.label_font())
                .draw()
                .map_err(chart_err)?;
        }

        for (i, line) in series.iter().enumerate() {
            let color = style.series_color(i);
            chart
                .draw_series(LineSeries::new(
                    line.points.iter().map(|(d, v)| (date_to_x(*d), *v)),
                    color.stroke_width(2),
                ))
                .map_err(chart_err)?
                .label(line.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }

        if text && series.len() > 1 {
            chart
                .configure_series_labels()
                .label_font(style.label_font())
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(chart_err)?;
        }
        Ok(())
    })
}

pub fn render_base_rate(series: &IndicatorSeries, style: &ChartStyle) -> Result<Vec<u8>> {
    render_line_chart(
        BASE_RATE_TITLE,
        "Rate (%)",
        &[LineSeriesData::from_series(series)],
        style,
    )
}

pub fn render_yield_overlay(
    ten_year: &IndicatorSeries,
    two_year: &IndicatorSeries,
    style: &ChartStyle,
) -> Result<Vec<u8>> {
    render_line_chart(
        YIELDS_TITLE,
        "Yield (%)",
        &[
            LineSeriesData::from_series(ten_year),
            LineSeriesData::from_series(two_year),
        ],
        style,
    )
}

/// One line per table column
pub fn render_indicators(table: &IndicatorTable, style: &ChartStyle) -> Result<Vec<u8>> {
    let series: Vec<LineSeriesData> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let points = table
                .rows()
                .iter()
                .filter_map(|row| row.values.get(i).copied().flatten().map(|v| (row.date, v)))
                .collect();
            LineSeriesData::new(label.clone(), points)
        })
        .collect();

    render_line_chart(INDICATORS_TITLE, "Value", &series, style)
}
