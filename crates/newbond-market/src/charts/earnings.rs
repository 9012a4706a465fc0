//! Finnhub-backed company charts: EPS surprise history and analyst trend

use super::{ChartStyle, chart_err, fonts_available, padded_range, render_png};
use crate::api::{EpsSurprise, RecommendationTrend};
use crate::error::{MarketError, Result};
use plotters::prelude::*;

/// Category axis spanning `count` slots centred on 0..count
fn category_range(count: usize) -> std::ops::Range<f64> {
    -0.5..count as f64 - 0.5
}

fn category_label(labels: &[String], x: f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

/// Actual and estimated EPS per period, annotated with the surprise
pub fn render_eps_surprise(
    ticker: &str,
    surprises: &[EpsSurprise],
    style: &ChartStyle,
) -> Result<Vec<u8>> {
    let mut rows: Vec<&EpsSurprise> = surprises.iter().collect();
    rows.sort_by(|a, b| a.period.cmp(&b.period));
    let periods: Vec<String> = rows.iter().map(|r| r.period.clone()).collect();

    let (y0, y1) = padded_range(rows.iter().flat_map(|r| [r.actual, r.estimate]).flatten())
        .ok_or_else(|| MarketError::DataShape(format!("no EPS history for {ticker}")))?;
    let title = format!("{ticker} - Historical eps Surprise");
    let text = fonts_available();

    render_png(style.width, style.height, |root| {
        let mut builder = ChartBuilder::on(root);
        builder.margin(20);
        if text {
            builder
                .caption(&title, style.title_font())
                .x_label_area_size(40)
                .y_label_area_size(50);
        }
        let mut chart = builder
            .build_cartesian_2d(category_range(rows.len()), y0..y1)
            .map_err(chart_err)?;

        if text {
            let formatter = |x: &f64| category_label(&periods, *x);
            chart
                .configure_mesh()
                .x_labels(rows.len())
                .x_label_formatter(&formatter)
                .x_desc("announcement date")
                .y_desc("eps")
                .label_style(style.label_font())
                .draw()
                .map_err(chart_err)?;
        }

        let series = [
            ("actual", style.actual_color, rows.iter().map(|r| r.actual).collect::<Vec<_>>()),
            ("estimate", style.estimate_color, rows.iter().map(|r| r.estimate).collect()),
        ];
        for (label, color, values) in series {
            let fill = color.mix(style.marker_alpha).filled();
            let size = style.marker_size;
            chart
                .draw_series(
                    values
                        .iter()
                        .enumerate()
                        .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
                        .map(move |point| Circle::new(point, size, fill)),
                )
                .map_err(chart_err)?
                .label(label)
                .legend(move |(x, y)| Circle::new((x, y), 5, fill));
        }

        if text {
            let notes = rows.iter().enumerate().filter_map(|(i, r)| {
                let (actual, pct) = (r.actual?, r.surprise_percent?);
                let (verb, color) = if pct < 0.0 {
                    ("Missed by", &style.missed_color)
                } else {
                    ("Beat by", &style.beat_color)
                };
                let font = TextStyle::from(style.label_font()).color(color);
                Some(Text::new(format!("{verb} {pct:.2}%"), (i as f64, actual), font))
            });
            chart.draw_series(notes).map_err(chart_err)?;

            chart
                .configure_series_labels()
                .label_font(style.label_font())
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(chart_err)?;
        }
        Ok(())
    })
}

/// Stacked bars of analyst ratings per month, strong sell at the bottom
pub fn render_recommendations(
    ticker: &str,
    trends: &[RecommendationTrend],
    style: &ChartStyle,
) -> Result<Vec<u8>> {
    if trends.is_empty() {
        return Err(MarketError::DataShape(format!(
            "no recommendation trend for {ticker}"
        )));
    }
    let mut rows: Vec<&RecommendationTrend> = trends.iter().collect();
    rows.sort_by(|a, b| a.period.cmp(&b.period));
    let periods: Vec<String> = rows.iter().map(|r| r.period.clone()).collect();

    let layers: [(&str, fn(&RecommendationTrend) -> u32); 5] = [
        ("strong Sell", |r| r.strong_sell),
        ("Sell", |r| r.sell),
        ("Hold", |r| r.hold),
        ("Buy", |r| r.buy),
        ("strong Buy", |r| r.strong_buy),
    ];
    let top = rows.iter().map(|r| r.total()).max().unwrap_or(0).max(1);
    let title = format!("{ticker} recommendation trend");
    let text = fonts_available();

    render_png(style.width, style.height, |root| {
        let mut builder = ChartBuilder::on(root);
        builder.margin(20);
        if text {
            builder
                .caption(&title, style.title_font())
                .x_label_area_size(40)
                .y_label_area_size(50);
        }
        let mut chart = builder
            .build_cartesian_2d(category_range(rows.len()), 0f64..f64::from(top) * 1.1)
            .map_err(chart_err)?;

        if text {
            let formatter = |x: &f64| category_label(&periods, *x);
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(rows.len())
                .x_label_formatter(&formatter)
                .y_desc("Number of analysts")
                .label_style(style.label_font())
                .draw()
                .map_err(chart_err)?;
        }

        let half = 0.3;
        let mut bottoms = vec![0u32; rows.len()];
        for (&(label, count), color) in layers.iter().zip(style.recommendation_colors) {
            let bars: Vec<(f64, u32, u32)> = rows
                .iter()
                .zip(bottoms.iter_mut())
                .enumerate()
                .map(|(i, (row, bottom))| {
                    let base = *bottom;
                    *bottom += count(row);
                    (i as f64, base, *bottom)
                })
                .collect();

            chart
                .draw_series(bars.iter().map(|&(x, lo, hi)| {
                    Rectangle::new(
                        [(x - half, f64::from(lo)), (x + half, f64::from(hi))],
                        color.filled(),
                    )
                }))
                .map_err(chart_err)?
                .label(label)
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

            if text {
                let counts = bars.iter().filter(|(_, lo, hi)| hi > lo).map(|&(x, lo, hi)| {
                    let middle = f64::from(lo + hi) / 2.0;
                    Text::new((hi - lo).to_string(), (x, middle), style.label_font())
                });
                chart.draw_series(counts).map_err(chart_err)?;
            }
        }

        if text {
            chart
                .configure_series_labels()
                .label_font(style.label_font())
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(chart_err)?;
        }
        Ok(())
    })
}
