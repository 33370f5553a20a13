//! End-to-end `generate` pipeline: input → chart → layout → PDF artifact.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};
use tracing::{info, instrument, warn};

use eksreview_artifacts::ArtifactMeta;
use eksreview_chart::{ChartOptions, ChartRenderer};
use eksreview_layout::Document;
use eksreview_shared::{
    AppConfig, AssessmentSnapshot, ReportCatalog, ReportInput, Result, RiskSummary,
    validate_config,
};

use crate::assembler::{Assembler, AssemblyInput, ChartOutcome, ChartStage};
use crate::references::normalize_references;

/// One compile request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub snapshot: AssessmentSnapshot,
    pub risk: RiskSummary,
    /// Raw documentation search items; malformed ones are skipped.
    pub search_results: Vec<serde_json::Value>,
    /// Where the artifact is written.
    pub output: PathBuf,
    /// Timestamp printed on the title page.
    pub generated_at: NaiveDateTime,
}

impl GenerateRequest {
    /// A request for `input`, stamped with the current local time.
    pub fn new(input: ReportInput, output: impl Into<PathBuf>) -> Self {
        Self {
            snapshot: input.findings,
            risk: input.risk_summary,
            search_results: input.references,
            output: output.into(),
            generated_at: Local::now().naive_local(),
        }
    }

    pub fn with_generated_at(mut self, at: NaiveDateTime) -> Self {
        self.generated_at = at;
        self
    }
}

/// Result of a successful `generate`.
#[derive(Debug)]
pub struct GenerateOutput {
    pub artifact: ArtifactMeta,
    pub chart: ChartOutcome,
    /// Search items dropped as malformed.
    pub skipped_references: usize,
    /// The laid-out document that was written.
    pub document: Document,
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when part of the document falls back to a degraded form.
    fn degraded(&self, what: &str);
    /// Called when the pipeline completes.
    fn done(&self, output: &GenerateOutput);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn degraded(&self, _what: &str) {}
    fn done(&self, _output: &GenerateOutput) {}
}

/// Compile `request` into a PDF at `request.output`.
///
/// 1. Validate config, build the catalog
/// 2. Normalize search results
/// 3. Assemble all sections (chart failures degrade to a placeholder)
/// 4. Write the artifact atomically
///
/// On error nothing is left at the output path and the chart temp file is
/// gone.
#[instrument(skip_all, fields(output = %request.output.display(), risk_total = request.risk.total()))]
pub fn generate(
    request: &GenerateRequest,
    config: &AppConfig,
    renderer: &dyn ChartRenderer,
    progress: &dyn ProgressReporter,
) -> Result<GenerateOutput> {
    let start = Instant::now();
    validate_config(config)?;

    // --- Phase 1: Catalog ---
    progress.phase("Preparing catalog");
    let catalog = ReportCatalog::builtin().with_title(config.report.title.clone());
    for (pillar, field) in catalog.unmatched_keys(&request.snapshot) {
        warn!(%pillar, %field, "ignoring finding with unknown pillar/field");
    }
    for pillar in request.snapshot.empty_pillar_keys() {
        if catalog.pillar(pillar).is_none() {
            warn!(%pillar, "ignoring unknown pillar");
        }
    }

    // --- Phase 2: References ---
    progress.phase("Normalizing references");
    let references =
        normalize_references(&request.search_results, &config.references.placeholder_link);
    if references.skipped > 0 {
        progress.degraded(&format!("skipped {} malformed reference(s)", references.skipped));
    }

    // --- Phase 3: Assemble + write ---
    let chart_options = ChartOptions::from(&config.chart);
    let input = AssemblyInput {
        catalog: &catalog,
        snapshot: &request.snapshot,
        risk: &request.risk,
        search_results: &references.entries,
        generated_at: request.generated_at,
    };
    let stage = ChartStage {
        renderer,
        options: &chart_options,
    };
    let assembled = Assembler::new(input, stage, progress).run(&request.output)?;

    let output = GenerateOutput {
        document: assembled.document,
        artifact: assembled.artifact,
        chart: assembled.chart,
        skipped_references: references.skipped,
        elapsed: start.elapsed(),
    };

    info!(
        path = %output.artifact.path.display(),
        pages = output.artifact.page_count,
        elapsed_ms = output.elapsed.as_millis() as u64,
        "generate complete"
    );
    progress.done(&output);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eksreview_chart::RasterChartRenderer;
    use eksreview_shared::EksReviewError;

    fn config(temp: &std::path::Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.chart.temp_dir = Some(temp.display().to_string());
        config
    }

    #[test]
    fn invalid_config_fails_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.chart.width_px = 0;
        let out = dir.path().join("report.pdf");
        let request = GenerateRequest::new(ReportInput::default(), &out);

        let err = generate(&request, &cfg, &RasterChartRenderer, &SilentProgress).unwrap_err();
        assert!(matches!(err, EksReviewError::Config { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn configured_title_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.report.title = "Prod Cluster Review".into();
        let request = GenerateRequest::new(ReportInput::default(), dir.path().join("r.pdf"));

        let output = generate(&request, &cfg, &RasterChartRenderer, &SilentProgress).unwrap();
        assert!(output.document.text_content().starts_with("Prod Cluster Review\n"));
    }

    #[test]
    fn malformed_references_are_counted() {
        let dir = tempfile::tempdir().unwrap();
        let input = ReportInput {
            references: vec![serde_json::json!("Karpenter"), serde_json::json!(7)],
            ..ReportInput::default()
        };
        let request = GenerateRequest::new(input, dir.path().join("r.pdf"));

        let output =
            generate(&request, &config(dir.path()), &RasterChartRenderer, &SilentProgress).unwrap();
        assert_eq!(output.skipped_references, 1);
        assert!(output.document.text_content().contains("Karpenter"));
    }
}
