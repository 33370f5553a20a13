//! Scoped ownership of the temporary chart image.
//!
//! A [`ChartAsset`] reserves a uniquely named file in the chart temp dir.
//! The file is deleted by [`ChartAsset::release`] or, on any early exit,
//! when the asset is dropped.

use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::debug;

use eksreview_shared::RenderError;

/// File name prefix of chart images.
pub const CHART_FILE_PREFIX: &str = "risk_chart";

/// A temporary chart image on disk, deleted when released or dropped.
#[derive(Debug)]
pub struct ChartAsset {
    path: TempPath,
}

impl ChartAsset {
    /// Reserve a new `risk_chart*.png` file in `dir`.
    pub fn create(dir: &Path) -> Result<Self, RenderError> {
        let file = tempfile::Builder::new()
            .prefix(CHART_FILE_PREFIX)
            .suffix(".png")
            .tempfile_in(dir)
            .map_err(|source| RenderError::Io {
                path: dir.to_path_buf(),
                source,
            })?;

        let path = file.into_temp_path();
        debug!(path = %path.display(), "reserved chart asset");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now and report whether that worked.
    pub fn release(self) -> Result<(), RenderError> {
        let path: PathBuf = self.path.to_path_buf();
        self.path
            .close()
            .map_err(|source| RenderError::Io {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), "released chart asset");
        Ok(())
    }
}
