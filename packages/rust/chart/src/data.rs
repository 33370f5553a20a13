//! Chart data derived from a [`RiskSummary`].

use eksreview_shared::{Rgb, RiskSummary, SeverityLevel};

/// One bar of the risk distribution chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartBar {
    pub level: SeverityLevel,
    pub count: u64,
    pub color: Rgb,
}

/// Everything a backend needs to draw the risk distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Always Critical, High, Medium, Low (left to right).
    pub bars: Vec<ChartBar>,
}

impl ChartData {
    pub fn from_summary(summary: &RiskSummary) -> Self {
        let bars = summary
            .ordered()
            .into_iter()
            .map(|(level, count)| ChartBar {
                level,
                count,
                color: level.color(),
            })
            .collect();

        Self {
            title: "Risk Distribution".into(),
            x_label: "Risk Level".into(),
            y_label: "Number of Findings".into(),
            bars,
        }
    }

    /// Largest bar value (0 when every bar is empty).
    pub fn max_count(&self) -> u64 {
        self.bars.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

/// A bar's pixel rectangle, origin at the top-left of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Plot area margins in pixels.
pub(crate) const MARGIN_LEFT: u32 = 60;
pub(crate) const MARGIN_RIGHT: u32 = 30;
pub(crate) const MARGIN_TOP: u32 = 40;
pub(crate) const MARGIN_BOTTOM: u32 = 50;

/// The plot area `(x0, y0, x1, y1)` for a canvas, or `None` if it's too small.
pub(crate) fn plot_area(width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let x1 = width.checked_sub(MARGIN_RIGHT)?;
    let y1 = height.checked_sub(MARGIN_BOTTOM)?;
    if x1 <= MARGIN_LEFT || y1 <= MARGIN_TOP {
        return None;
    }
    Some((MARGIN_LEFT, MARGIN_TOP, x1, y1))
}

/// Lay the bars out over the plot area. Zero counts give zero-height bars.
pub fn bar_geometry(data: &ChartData, width: u32, height: u32) -> Vec<BarRect> {
    let Some((x0, y0, x1, y1)) = plot_area(width, height) else {
        return Vec::new();
    };
    if data.bars.is_empty() {
        return Vec::new();
    }

    let slot = (x1 - x0) / data.bars.len() as u32;
    let bar_width = (slot * 3 / 5).max(1);
    let plot_height = u128::from(y1 - y0);
    let max = u128::from(data.max_count().max(1));

    data.bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let bar_height = (u128::from(bar.count) * plot_height / max) as u32;
            BarRect {
                x: x0 + i as u32 * slot + (slot - bar_width) / 2,
                y: y1 - bar_height,
                width: bar_width,
                height: bar_height,
            }
        })
        .collect()
}
