//! Application configuration for the review compiler.
//!
//! User config lives at `~/.eksreview/eksreview.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::DEFAULT_TITLE;
use crate::error::{EksReviewError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "eksreview.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".eksreview";

// ---------------------------------------------------------------------------
// Config structs (matching eksreview.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Output document settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Risk chart rendering.
    #[serde(default)]
    pub chart: ChartConfig,

    /// Reference list handling.
    #[serde(default)]
    pub references: ReferencesConfig,
}

/// `[report]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Title printed on the first page.
    #[serde(default = "default_title")]
    pub title: String,

    /// Directory the finished document is written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Fixed output file name.
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            output_dir: default_output_dir(),
            file_name: default_file_name(),
        }
    }
}

impl ReportConfig {
    /// Resolved output path (`output_dir/file_name`).
    pub fn output_path(&self) -> PathBuf {
        Path::new(&self.output_dir).join(&self.file_name)
    }
}

fn default_title() -> String {
    DEFAULT_TITLE.into()
}
fn default_output_dir() -> String {
    ".".into()
}
fn default_file_name() -> String {
    "eks_review_report.pdf".into()
}

/// `[chart]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Raster width in pixels.
    #[serde(default = "default_chart_width")]
    pub width_px: u32,

    /// Raster height in pixels.
    #[serde(default = "default_chart_height")]
    pub height_px: u32,

    /// Where the temporary chart image is written. `None` = OS temp dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width_px: default_chart_width(),
            height_px: default_chart_height(),
            temp_dir: None,
        }
    }
}

impl ChartConfig {
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir)
    }
}

fn default_chart_width() -> u32 {
    700
}
fn default_chart_height() -> u32 {
    400
}

/// `[references]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferencesConfig {
    /// Link shown for search results that carry only a title.
    #[serde(default = "default_placeholder_link")]
    pub placeholder_link: String,
}

impl Default for ReferencesConfig {
    fn default() -> Self {
        Self {
            placeholder_link: default_placeholder_link(),
        }
    }
}

fn default_placeholder_link() -> String {
    "#".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.eksreview/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| EksReviewError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.eksreview/eksreview.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| EksReviewError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| EksReviewError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    init_config_in(&dir)
}

/// Write a default config file into `dir`.
pub fn init_config_in(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| EksReviewError::io(dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| EksReviewError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| EksReviewError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check the config values that would make generation impossible.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.report.file_name.trim().is_empty() {
        return Err(EksReviewError::config("report.file_name must not be empty"));
    }
    if config.chart.width_px == 0 || config.chart.height_px == 0 {
        return Err(EksReviewError::config(format!(
            "chart size must be non-zero, got {}x{}",
            config.chart.width_px, config.chart.height_px
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("eks_review_report.pdf"));
        assert!(toml_str.contains("width_px"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.chart.width_px, 700);
        assert_eq!(parsed.report.title, DEFAULT_TITLE);
        assert_eq!(parsed.references.placeholder_link, "#");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[report]
output_dir = "/tmp/reviews"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.report.output_dir, "/tmp/reviews");
        assert_eq!(config.report.file_name, "eks_review_report.pdf");
        assert_eq!(
            config.report.output_path(),
            PathBuf::from("/tmp/reviews/eks_review_report.pdf")
        );
        assert_eq!(config.chart.height_px, 400);
    }

    #[test]
    fn init_and_load_from_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let path = init_config_in(tmp.path()).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.report.file_name, "eks_review_report.pdf");
    }

    #[test]
    fn validation_rejects_zero_chart() {
        let mut config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        config.chart.width_px = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("chart size"));
    }
}
