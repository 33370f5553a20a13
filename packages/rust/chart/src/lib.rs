//! Risk chart builder.
//!
//! Turns a [`RiskSummary`] into [`ChartData`], renders it through a
//! [`ChartRenderer`] into a temporary PNG, and hands back a [`ChartAsset`]
//! that owns the file until the caller has embedded it.

mod asset;
mod data;
mod raster;

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use eksreview_shared::{ChartConfig, RenderError, RiskSummary};

pub use asset::{CHART_FILE_PREFIX, ChartAsset};
pub use data::{BarRect, ChartBar, ChartData, bar_geometry};
pub use raster::{RasterChartRenderer, draw};

/// A backend that can draw chart data into an image file.
pub trait ChartRenderer {
    /// Write an image of `width`×`height` pixels to `dest`.
    fn render(
        &self,
        data: &ChartData,
        width: u32,
        height: u32,
        dest: &Path,
    ) -> Result<(), RenderError>;
}

/// Size and location of the rendered chart.
#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub width_px: u32,
    pub height_px: u32,
    pub temp_dir: PathBuf,
}

impl From<&ChartConfig> for ChartOptions {
    fn from(config: &ChartConfig) -> Self {
        Self {
            width_px: config.width_px,
            height_px: config.height_px,
            temp_dir: config.temp_dir(),
        }
    }
}

/// A rendered chart: the data it shows plus the image on disk.
#[derive(Debug)]
pub struct RenderedChart {
    pub data: ChartData,
    pub asset: ChartAsset,
}

/// Render the risk distribution for `summary`.
///
/// On failure the reserved temp file is already gone when this returns.
#[instrument(skip_all, fields(total = summary.total(), width = opts.width_px, height = opts.height_px))]
pub fn build_chart(
    summary: &RiskSummary,
    renderer: &dyn ChartRenderer,
    opts: &ChartOptions,
) -> Result<RenderedChart, RenderError> {
    if opts.width_px == 0 || opts.height_px == 0 {
        return Err(RenderError::InvalidInput(format!(
            "chart size must be non-zero, got {}x{}",
            opts.width_px, opts.height_px
        )));
    }

    let data = ChartData::from_summary(summary);
    let asset = ChartAsset::create(&opts.temp_dir)?;

    if let Err(e) = renderer.render(&data, opts.width_px, opts.height_px, asset.path()) {
        warn!(error = %e, "chart backend failed");
        if let Err(cleanup) = asset.release() {
            warn!(error = %cleanup, "failed to remove chart asset");
        }
        return Err(e);
    }

    info!(path = %asset.path().display(), "risk chart rendered");
    Ok(RenderedChart { data, asset })
}

#[cfg(test)]
mod tests {
    use super::*;
    use eksreview_shared::SeverityLevel;

    struct FailingRenderer;

    impl ChartRenderer for FailingRenderer {
        fn render(&self, _: &ChartData, _: u32, _: u32, _: &Path) -> Result<(), RenderError> {
            Err(RenderError::Backend("kaleido not installed".into()))
        }
    }

    fn opts(dir: &Path) -> ChartOptions {
        ChartOptions {
            width_px: 700,
            height_px: 400,
            temp_dir: dir.to_path_buf(),
        }
    }

    fn dir_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[test]
    fn build_chart_writes_asset() {
        let dir = tempfile::tempdir().unwrap();
        let summary = RiskSummary::new().with(SeverityLevel::Medium, 4);

        let chart = build_chart(&summary, &RasterChartRenderer, &opts(dir.path())).unwrap();
        assert!(chart.asset.path().exists());
        assert_eq!(chart.data.bars[2].count, 4);

        chart.asset.release().unwrap();
        assert!(dir_is_empty(dir.path()));
    }

    #[test]
    fn failed_render_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_chart(&RiskSummary::new(), &FailingRenderer, &opts(dir.path())).unwrap_err();

        assert!(err.to_string().contains("kaleido"));
        assert!(dir_is_empty(dir.path()));
    }

    #[test]
    fn zero_size_is_rejected_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut o = opts(dir.path());
        o.height_px = 0;
        let err = build_chart(&RiskSummary::new(), &RasterChartRenderer, &o).unwrap_err();
        assert!(matches!(err, RenderError::InvalidInput(_)));
        assert!(dir_is_empty(dir.path()));
    }
}
