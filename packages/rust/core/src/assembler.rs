//! Document assembler: sequences the report sections onto pages.
//!
//! The assembler is a small state machine:
//!
//! `Idle → TitlePage → Summary → RiskChart → PillarSection(0..N) →
//! References → Recommendations → Finalized`
//!
//! Transitions are unconditional. The risk chart degrades to a placeholder
//! note when the chart backend fails; anything else that fails moves the
//! machine to `Failed` and the error is returned without an artifact.

use std::fmt;
use std::path::Path;

use chrono::NaiveDateTime;
use tracing::{debug, error, info, instrument, warn};

use eksreview_artifacts::{ArtifactMeta, write_pdf};
use eksreview_chart::{ChartOptions, ChartRenderer, build_chart};
use eksreview_layout::{Document, LabelSize, LayoutEngine, TextSize};
use eksreview_shared::{
    AssessmentSnapshot, ReferenceEntry, ReportCatalog, Result, Rgb, RiskSummary,
};

use crate::pipeline::ProgressReporter;
use crate::scheduler::schedule;

/// Width of the embedded chart in millimetres.
pub const CHART_WIDTH_MM: f32 = 190.0;

pub const SUMMARY_TITLE: &str = "Executive Summary";
pub const RISK_TITLE: &str = "Risk Assessment Overview";
pub const REFERENCES_TITLE: &str = "Best Practices & References";
pub const RECOMMENDATIONS_TITLE: &str = "Recommendations";

/// Prefix of the note shown in place of a chart that failed to render.
pub const CHART_PLACEHOLDER: &str = "Risk chart unavailable";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyState {
    Idle,
    TitlePage,
    Summary,
    RiskChart,
    PillarSection(usize),
    References,
    Recommendations,
    Finalized,
    Failed,
}

impl AssemblyState {
    /// The state after this one, given the number of pillars.
    pub fn next(self, pillars: usize) -> Self {
        match self {
            Self::Idle => Self::TitlePage,
            Self::TitlePage => Self::Summary,
            Self::Summary => Self::RiskChart,
            Self::RiskChart if pillars > 0 => Self::PillarSection(0),
            Self::RiskChart => Self::References,
            Self::PillarSection(i) if i + 1 < pillars => Self::PillarSection(i + 1),
            Self::PillarSection(_) => Self::References,
            Self::References => Self::Recommendations,
            Self::Recommendations | Self::Finalized => Self::Finalized,
            Self::Failed => Self::Failed,
        }
    }
}

impl fmt::Display for AssemblyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::TitlePage => f.write_str("title page"),
            Self::Summary => f.write_str("executive summary"),
            Self::RiskChart => f.write_str("risk chart"),
            Self::PillarSection(i) => write!(f, "pillar section {}", i + 1),
            Self::References => f.write_str("references"),
            Self::Recommendations => f.write_str("recommendations"),
            Self::Finalized => f.write_str("finalize"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// Everything the assembler reads. Nothing here is mutated.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyInput<'a> {
    pub catalog: &'a ReportCatalog,
    pub snapshot: &'a AssessmentSnapshot,
    pub risk: &'a RiskSummary,
    /// Normalized search results, listed after the curated references.
    pub search_results: &'a [ReferenceEntry],
    pub generated_at: NaiveDateTime,
}

/// How the chart backend and its temp files are set up.
#[derive(Clone, Copy)]
pub struct ChartStage<'a> {
    pub renderer: &'a dyn ChartRenderer,
    pub options: &'a ChartOptions,
}

/// What ended up in the risk section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartOutcome {
    Embedded,
    /// The backend failed; the reason is shown in the document.
    Placeholder(String),
}

#[derive(Debug)]
pub struct AssemblyOutput {
    pub document: Document,
    pub artifact: ArtifactMeta,
    pub chart: ChartOutcome,
}

// ---------------------------------------------------------------------------
// Assembler
// ---------------------------------------------------------------------------

pub struct Assembler<'a> {
    input: AssemblyInput<'a>,
    chart: ChartStage<'a>,
    progress: &'a dyn ProgressReporter,
    engine: LayoutEngine,
    chart_outcome: ChartOutcome,
}

impl<'a> Assembler<'a> {
    pub fn new(
        input: AssemblyInput<'a>,
        chart: ChartStage<'a>,
        progress: &'a dyn ProgressReporter,
    ) -> Self {
        Self {
            engine: LayoutEngine::new(input.catalog.title.clone()),
            input,
            chart,
            progress,
            chart_outcome: ChartOutcome::Embedded,
        }
    }

    /// Build every section and write the document to `dest`.
    #[instrument(skip_all, fields(dest = %dest.display(), pillars = self.input.catalog.pillars.len()))]
    pub fn run(mut self, dest: &Path) -> Result<AssemblyOutput> {
        let pillars = self.input.catalog.pillars.len();
        let mut state = AssemblyState::Idle;

        loop {
            state = state.next(pillars);
            debug!(%state, "assembler transition");
            self.progress.phase(&state.to_string());

            let step = match state {
                AssemblyState::Finalized => {
                    return self.finish(dest).inspect_err(|e| fail(state, e));
                }
                _ => self.build(state),
            };
            if let Err(e) = step {
                fail(state, &e);
                return Err(e);
            }
        }
    }

    fn build(&mut self, state: AssemblyState) -> Result<()> {
        match state {
            AssemblyState::TitlePage => self.title_page(),
            AssemblyState::Summary => self.summary(),
            AssemblyState::RiskChart => return self.risk_chart(),
            AssemblyState::PillarSection(i) => self.pillar_section(i),
            AssemblyState::References => self.references(),
            AssemblyState::Recommendations => self.recommendations(),
            AssemblyState::Idle | AssemblyState::Finalized | AssemblyState::Failed => {}
        }
        Ok(())
    }

    fn title_page(&mut self) {
        let input = self.input;
        self.engine.start_page();
        self.engine.banner(&input.catalog.title);
        self.engine.space(10.0);
        self.engine.paragraph(&format!(
            "Generated on: {}",
            input.generated_at.format(TIMESTAMP_FORMAT)
        ));
        self.engine.space(5.0);
    }

    fn summary(&mut self) {
        self.engine.section_header(SUMMARY_TITLE);
        self.engine.paragraph(&self.input.catalog.executive_summary);
        self.engine.space(5.0);
    }

    fn risk_chart(&mut self) -> Result<()> {
        let risk = self.input.risk;
        self.engine.start_page();
        self.engine.section_header(RISK_TITLE);

        match build_chart(risk, self.chart.renderer, self.chart.options) {
            Ok(rendered) => {
                let embedded = self.engine.embed_image(rendered.asset.path(), CHART_WIDTH_MM);
                if let Err(e) = rendered.asset.release() {
                    warn!(error = %e, "failed to remove chart asset");
                }
                embedded?;
                self.chart_outcome = ChartOutcome::Embedded;
            }
            Err(e) => {
                warn!(error = %e, "risk chart degraded to placeholder");
                self.progress.degraded(&format!("risk chart: {e}"));
                self.engine.paragraph(&format!("{CHART_PLACEHOLDER}: {e}"));
                self.chart_outcome = ChartOutcome::Placeholder(e.to_string());
            }
        }

        self.engine.space(10.0);
        for (level, count) in risk.ordered() {
            self.engine.text(
                &format!("{level}: {count} finding(s)"),
                TextSize::Compact,
                level.color(),
            );
        }
        self.engine.text(
            &format!("Total: {} finding(s)", risk.total()),
            TextSize::Compact,
            Rgb::BLACK,
        );
        Ok(())
    }

    fn pillar_section(&mut self, index: usize) {
        let input = self.input;
        let Some(pillar) = input.catalog.pillars.get(index) else {
            return;
        };

        self.engine.start_page();
        self.engine.section_header(&pillar.name);

        let mut placed = 0usize;
        for field in &pillar.fields {
            let body = input.snapshot.finding(&pillar.name, field);
            if self.engine.labeled_block(field, body) {
                self.engine.space(5.0);
                placed += 1;
            }
        }
        if placed == 0 {
            debug!(pillar = %pillar.name, "no findings; section has header only");
        }
    }

    fn references(&mut self) {
        let input = self.input;
        self.engine.start_page();
        self.engine.section_header(REFERENCES_TITLE);

        for entry in input.catalog.references.iter().chain(input.search_results) {
            self.engine.label(&entry.category, LabelSize::Small);
            self.engine.link(&entry.link, &entry.link);
            if !entry.description.trim().is_empty() {
                self.engine.paragraph(&entry.description);
            }
            self.engine.space(5.0);
        }
    }

    fn recommendations(&mut self) {
        let input = self.input;
        self.engine.start_page();
        self.engine.section_header(RECOMMENDATIONS_TITLE);

        for bucket in schedule(&input.catalog.recommendations) {
            self.engine.label(bucket.timeframe.label(), LabelSize::Large);
            for rec in &bucket.recommendations {
                self.engine.colored_line(&rec.display_line(), rec.priority.color());
            }
            self.engine.space(5.0);
        }
    }

    fn finish(self, dest: &Path) -> Result<AssemblyOutput> {
        let document = self.engine.finalize();
        let artifact = write_pdf(&document, dest)?;
        info!(pages = document.page_count(), "document assembled");
        Ok(AssemblyOutput {
            document,
            artifact,
            chart: self.chart_outcome,
        })
    }
}

fn fail(at: AssemblyState, e: &eksreview_shared::EksReviewError) {
    error!(at = %at, next = %AssemblyState::Failed, error = %e, "assembly failed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_run_in_document_order() {
        let mut state = AssemblyState::Idle;
        let mut seen = Vec::new();
        while state != AssemblyState::Finalized {
            state = state.next(2);
            seen.push(state);
        }
        assert_eq!(
            seen,
            vec![
                AssemblyState::TitlePage,
                AssemblyState::Summary,
                AssemblyState::RiskChart,
                AssemblyState::PillarSection(0),
                AssemblyState::PillarSection(1),
                AssemblyState::References,
                AssemblyState::Recommendations,
                AssemblyState::Finalized,
            ]
        );
    }

    #[test]
    fn no_pillars_skips_straight_to_references() {
        assert_eq!(AssemblyState::RiskChart.next(0), AssemblyState::References);
    }

    #[test]
    fn terminal_states_stay_put() {
        assert_eq!(AssemblyState::Finalized.next(6), AssemblyState::Finalized);
        assert_eq!(AssemblyState::Failed.next(6), AssemblyState::Failed);
    }
}
