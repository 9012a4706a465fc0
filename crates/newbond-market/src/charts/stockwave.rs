//! Adjusted close line over daily volume bars

use super::{ChartStyle, chart_err, date_to_x, fonts_available, padded_range, render_png, x_to_label};
use crate::api::PriceBar;
use crate::error::{MarketError, Result};
use plotters::prelude::*;

pub fn render_stockwave(ticker: &str, bars: &[PriceBar], style: &ChartStyle) -> Result<Vec<u8>> {
    let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
        return Err(MarketError::DataShape(format!("no price history for {ticker}")));
    };
    let (x0, x1) = (date_to_x(first.date) - 1.0, date_to_x(last.date) + 1.0);
    let (p0, p1) = padded_range(bars.iter().map(|b| b.adjclose))
        .ok_or_else(|| MarketError::DataShape(format!("no usable prices for {ticker}")))?;
    let peak_volume = bars.iter().map(|b| b.volume).max().unwrap_or(0).max(1) as f64;

    let title = format!("{ticker} Stock price and Volume Chart (recent 1 year)");
    let text = fonts_available();

    render_png(style.wide_width, style.wide_height, |root| {
        let mut builder = ChartBuilder::on(root);
        builder.margin(15);
        if text {
            builder
                .caption(&title, style.title_font())
                .x_label_area_size(40)
                .y_label_area_size(60)
                .right_y_label_area_size(80);
        }
        let mut chart = builder
            .build_cartesian_2d(x0..x1, p0..p1)
            .map_err(chart_err)?
            .set_secondary_coord(x0..x1, 0f64..peak_volume * 1.05);

        if text {
            chart
                .configure_mesh()
                .x_labels(10)
                .x_label_formatter(&|x| x_to_label(*x))
                .x_desc("date")
                .y_desc("Price(USD)")
                .label_style(style.label_font())
                .axis_desc_style(TextStyle::from(style.label_font()).color(&style.price_color))
                .draw()
                .map_err(chart_err)?;
            chart
                .configure_secondary_axes()
                .y_desc("Volume")
                .label_style(style.label_font())
                .axis_desc_style(TextStyle::from(style.label_font()).color(&style.volume_color))
                .draw()
                .map_err(chart_err)?;
        }

        let volume_fill = style.volume_color.mix(style.volume_alpha).filled();
        chart
            .draw_secondary_series(bars.iter().map(|b| {
                let x = date_to_x(b.date);
                Rectangle::new([(x - 0.4, 0.0), (x + 0.4, b.volume as f64)], volume_fill)
            }))
            .map_err(chart_err)?;

        chart
            .draw_series(LineSeries::new(
                bars.iter().map(|b| (date_to_x(b.date), b.adjclose)),
                style.price_color.stroke_width(2),
            ))
            .map_err(chart_err)?;
        Ok(())
    })
}
