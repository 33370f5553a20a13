//! PNG bar chart backend built on the `image` crate.

use std::path::Path;

use image::{ImageFormat, Rgb as Pixel, RgbImage};
use tracing::{debug, instrument};

use eksreview_shared::RenderError;

use crate::ChartRenderer;
use crate::data::{ChartData, bar_geometry, plot_area};

const BACKGROUND: Pixel<u8> = Pixel([255, 255, 255]);
const AXIS: Pixel<u8> = Pixel([68, 68, 68]);
const GRID: Pixel<u8> = Pixel([229, 236, 246]);
const OUTLINE: Pixel<u8> = Pixel([90, 90, 90]);

/// Horizontal grid lines drawn across the plot area.
const GRID_LINES: u32 = 5;

/// Draws the risk distribution as a PNG image.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterChartRenderer;

impl ChartRenderer for RasterChartRenderer {
    #[instrument(skip(self, data, dest), fields(dest = %dest.display()))]
    fn render(
        &self,
        data: &ChartData,
        width: u32,
        height: u32,
        dest: &Path,
    ) -> Result<(), RenderError> {
        let img = draw(data, width, height)?;
        img.save_with_format(dest, ImageFormat::Png)
            .map_err(|e| RenderError::Backend(format!("PNG encode failed: {e}")))?;
        debug!("chart image written");
        Ok(())
    }
}

/// Rasterize the chart into an in-memory image.
pub fn draw(data: &ChartData, width: u32, height: u32) -> Result<RgbImage, RenderError> {
    let (x0, y0, x1, y1) = plot_area(width, height).ok_or_else(|| {
        RenderError::InvalidInput(format!("canvas {width}x{height} too small for a chart"))
    })?;

    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);

    for i in 1..=GRID_LINES {
        let y = y1 - (y1 - y0) * i / GRID_LINES;
        hline(&mut img, x0, x1, y, GRID);
    }

    for (bar, rect) in data.bars.iter().zip(bar_geometry(data, width, height)) {
        let fill = Pixel([bar.color.r, bar.color.g, bar.color.b]);
        fill_rect(&mut img, rect.x, rect.y, rect.width, rect.height, fill);
        if rect.height > 0 {
            outline_rect(&mut img, rect.x, rect.y, rect.width, rect.height, OUTLINE);
        }
    }

    hline(&mut img, x0, x1, y1, AXIS);
    vline(&mut img, x0, y0, y1, AXIS);

    Ok(img)
}

fn hline(img: &mut RgbImage, x0: u32, x1: u32, y: u32, color: Pixel<u8>) {
    if y >= img.height() {
        return;
    }
    for x in x0..=x1.min(img.width() - 1) {
        img.put_pixel(x, y, color);
    }
}

fn vline(img: &mut RgbImage, x: u32, y0: u32, y1: u32, color: Pixel<u8>) {
    if x >= img.width() {
        return;
    }
    for y in y0..=y1.min(img.height() - 1) {
        img.put_pixel(x, y, color);
    }
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Pixel<u8>) {
    for py in y..(y + h).min(img.height()) {
        for px in x..(x + w).min(img.width()) {
            img.put_pixel(px, py, color);
        }
    }
}

fn outline_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Pixel<u8>) {
    let right = x + w.saturating_sub(1);
    let bottom = y + h.saturating_sub(1);
    hline(img, x, right, y, color);
    hline(img, x, right, bottom, color);
    vline(img, x, y, bottom, color);
    vline(img, right, y, bottom, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use eksreview_shared::{RiskSummary, SeverityLevel};

    #[test]
    fn bars_are_painted_in_severity_colors() {
        let summary = RiskSummary::new()
            .with(SeverityLevel::Critical, 2)
            .with(SeverityLevel::High, 3)
            .with(SeverityLevel::Medium, 4)
            .with(SeverityLevel::Low, 5);
        let data = ChartData::from_summary(&summary);
        let img = draw(&data, 700, 400).unwrap();

        for (bar, rect) in data.bars.iter().zip(bar_geometry(&data, 700, 400)) {
            let center = img.get_pixel(rect.x + rect.width / 2, rect.y + rect.height / 2);
            assert_eq!(center.0, [bar.color.r, bar.color.g, bar.color.b]);
        }
    }

    #[test]
    fn zero_summary_draws_without_error() {
        let data = ChartData::from_summary(&RiskSummary::new());
        let img = draw(&data, 700, 400).unwrap();
        assert_eq!(img.dimensions(), (700, 400));
    }

    #[test]
    fn too_small_canvas_is_invalid() {
        let data = ChartData::from_summary(&RiskSummary::new());
        assert!(matches!(
            draw(&data, 10, 10),
            Err(RenderError::InvalidInput(_))
        ));
    }

    #[test]
    fn render_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("chart.png");
        let data = ChartData::from_summary(&RiskSummary::new().with(SeverityLevel::High, 1));

        RasterChartRenderer.render(&data, 320, 200, &dest).unwrap();

        let decoded = image::open(&dest).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (320, 200));
    }
}
