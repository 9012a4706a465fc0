//! PNG chart rendering
//!
//! Every `render_*` function is pure: data and a [`ChartStyle`] in, PNG bytes
//! out. Text (captions, tick labels, legends) uses the bundled DejaVu Sans
//! unless [`install_font`] registered another face first.

mod earnings;
mod lines;
mod stockwave;

pub use earnings::{render_eps_surprise, render_recommendations};
pub use lines::{LineSeriesData, render_base_rate, render_indicators, render_line_chart, render_yield_overlay};
pub use stockwave::render_stockwave;

use crate::error::{MarketError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{Datelike, NaiveDate};
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

static FONT_READY: AtomicBool = AtomicBool::new(false);
static DEFAULT_FONT: Once = Once::new();

/// DejaVu Sans, Bitstream Vera license (see `assets/DejaVuSans-LICENSE`)
static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Register the TTF/OTF file at `path` as the chart font family, replacing
/// the bundled face
pub fn install_font(path: &Path) -> Result<()> {
    let bytes = std::fs::read(path)
        .map_err(|e| MarketError::Config(format!("cannot read chart font {}: {e}", path.display())))?;
    // Plotters keeps font data for the life of the process
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes)
        .map_err(|_| MarketError::Config(format!("{} is not a usable font", path.display())))?;

    FONT_READY.store(true, Ordering::Release);
    info!(path = %path.display(), "Chart font installed");
    Ok(())
}

fn register_bundled_font() {
    DEFAULT_FONT.call_once(|| {
        if FONT_READY.load(Ordering::Acquire) {
            return;
        }
        match plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, BUNDLED_FONT) {
            Ok(()) => FONT_READY.store(true, Ordering::Release),
            Err(_) => warn!("Bundled chart font rejected; charts carry no text"),
        }
    });
}

/// Whether chart text can be drawn, registering the bundled font on first use
pub fn fonts_available() -> bool {
    register_bundled_font();
    FONT_READY.load(Ordering::Acquire)
}

const FONT_FAMILY: &str = "sans-serif";

/// Sizes and colours shared by all charts
#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    /// Stock wave chart is wider than the rest
    pub wide_width: u32,
    pub wide_height: u32,
    pub title_size: u32,
    pub label_size: u32,
    /// Line colours, cycled per series
    pub palette: Vec<RGBColor>,
    pub actual_color: RGBColor,
    pub estimate_color: RGBColor,
    pub beat_color: RGBColor,
    pub missed_color: RGBColor,
    pub marker_size: u32,
    pub marker_alpha: f64,
    /// strongSell, sell, hold, buy, strongBuy
    pub recommendation_colors: [RGBColor; 5],
    pub price_color: RGBColor,
    pub volume_color: RGBColor,
    pub volume_alpha: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 500,
            wide_width: 1400,
            wide_height: 500,
            title_size: 22,
            label_size: 14,
            palette: vec![
                RGBColor(31, 119, 180),
                RGBColor(255, 127, 14),
                RGBColor(44, 160, 44),
                RGBColor(214, 39, 40),
                RGBColor(148, 103, 189),
                RGBColor(140, 86, 75),
            ],
            actual_color: GREEN,
            estimate_color: BLUE,
            beat_color: RED,
            missed_color: BLACK,
            marker_size: 12,
            marker_alpha: 0.3,
            recommendation_colors: [
                RED,
                RGBColor(255, 165, 0),
                RGBColor(128, 128, 128),
                RGBColor(135, 206, 235),
                BLUE,
            ],
            price_color: BLUE,
            volume_color: GREEN,
            volume_alpha: 0.2,
        }
    }
}

impl ChartStyle {
    pub(crate) fn series_color(&self, index: usize) -> RGBColor {
        self.palette
            .get(index % self.palette.len().max(1))
            .copied()
            .unwrap_or(BLUE)
    }

    pub(crate) fn title_font(&self) -> (&'static str, u32) {
        (FONT_FAMILY, self.title_size)
    }

    pub(crate) fn label_font(&self) -> (&'static str, u32) {
        (FONT_FAMILY, self.label_size)
    }
}

pub(crate) fn chart_err<E: std::fmt::Display>(err: E) -> MarketError {
    MarketError::Chart(err.to_string())
}

/// Draw onto an RGB canvas and return it PNG-encoded
pub(crate) fn render_png<F>(width: u32, height: u32, draw: F) -> Result<Vec<u8>>
where
    F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> Result<()>,
{
    let mut canvas = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut canvas, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;
        draw(&root)?;
        root.present().map_err(chart_err)?;
    }
    encode_png(&canvas, width, height)
}

pub fn encode_png(rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(rgb, width, height, image::ColorType::Rgb8)
        .map_err(chart_err)?;
    Ok(png)
}

pub fn to_base64(png: &[u8]) -> String {
    STANDARD.encode(png)
}

pub(crate) fn date_to_x(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

pub(crate) fn x_to_label(x: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Min/max of `values` padded by 5%; a flat range is widened by one unit
pub(crate) fn padded_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;
    if hi - lo < f64::EPSILON {
        return Some((lo - 1.0, hi + 1.0));
    }
    let pad = (hi - lo) * 0.05;
    Some((lo - pad, hi + pad))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[test]
    fn test_encode_png_and_base64() {
        let png = encode_png(&[255u8; 2 * 2 * 3], 2, 2).unwrap();
        assert!(png.starts_with(PNG_MAGIC));
        assert!(to_base64(&png).starts_with("iVBORw0KGgo"));
    }

    #[test]
    fn test_padded_range() {
        let (lo, hi) = padded_range([1.0, 3.0]).unwrap();
        assert!((lo - 0.9).abs() < 1e-9 && (hi - 3.1).abs() < 1e-9);
        assert_eq!(padded_range([2.0]), Some((1.0, 3.0)));
        assert_eq!(padded_range([f64::NAN]), None);
        assert_eq!(padded_range(Vec::new()), None);
    }

    #[test]
    fn test_date_axis_round_trip() {
        let date = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
        assert_eq!(x_to_label(date_to_x(date)), "2023-02-01");
    }

    #[test]
    fn test_bundled_font_available() {
        assert!(fonts_available());
        assert!(fonts_available());
    }

    #[test]
    fn test_default_style() {
        let style = ChartStyle::default();
        assert_eq!((style.width, style.height), (800, 500));
        assert_eq!(style.wide_width, 1400);
        assert_eq!(style.series_color(7), style.palette[1]);
    }
}
