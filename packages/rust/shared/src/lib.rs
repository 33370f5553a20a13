//! Shared types, error model, catalogs and configuration for the EKS review compiler.
//!
//! This crate is the foundation depended on by all other eksreview crates.
//! It provides:
//! - [`EksReviewError`] / [`RenderError`]: the error model
//! - The severity model ([`SeverityLevel`], [`Rgb`])
//! - Domain types ([`AssessmentSnapshot`], [`RiskSummary`], [`Recommendation`], ...)
//! - The fixed catalogs ([`ReportCatalog`])
//! - Configuration ([`AppConfig`], config loading)

pub mod catalog;
pub mod config;
pub mod error;
pub mod severity;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use catalog::{DEFAULT_TITLE, EXECUTIVE_SUMMARY, ReportCatalog};
pub use config::{
    AppConfig, ChartConfig, ReferencesConfig, ReportConfig, config_dir, config_file_path,
    init_config, init_config_in, load_config, load_config_from, validate_config,
};
pub use error::{EksReviewError, RenderError, Result};
pub use severity::{Rgb, SeverityLevel};
pub use types::{
    AssessmentSnapshot, PillarSpec, Recommendation, ReferenceEntry, ReferenceItem, ReportInput,
    RiskSummary, ScheduledRecommendation, Timeframe, normalize_key,
};
