//! End-to-end tests for `generate`: page layout, cleanup and degradation.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use eksreview_chart::{
    CHART_FILE_PREFIX, ChartData, ChartOptions, ChartRenderer, RasterChartRenderer,
};
use eksreview_core::assembler::{
    Assembler, AssemblyInput, CHART_PLACEHOLDER, ChartStage, RECOMMENDATIONS_TITLE, RISK_TITLE,
};
use eksreview_core::{ChartOutcome, GenerateRequest, SilentProgress, generate};
use eksreview_layout::{BlockKind, Document};
use eksreview_shared::{
    AppConfig, AssessmentSnapshot, EksReviewError, RenderError, ReportCatalog, ReportInput,
    RiskSummary, SeverityLevel,
};

struct BrokenBackend;

impl ChartRenderer for BrokenBackend {
    fn render(&self, _: &ChartData, _: u32, _: u32, _: &Path) -> Result<(), RenderError> {
        Err(RenderError::Backend("image export engine not available".into()))
    }
}

struct CorruptImageBackend;

impl ChartRenderer for CorruptImageBackend {
    fn render(&self, _: &ChartData, _: u32, _: u32, dest: &Path) -> Result<(), RenderError> {
        std::fs::write(dest, b"not a png").map_err(|e| RenderError::Backend(e.to_string()))
    }
}

fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn config_with_temp(temp: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.chart.temp_dir = Some(temp.display().to_string());
    config
}

fn sample_risk() -> RiskSummary {
    RiskSummary::new()
        .with(SeverityLevel::Critical, 2)
        .with(SeverityLevel::High, 3)
        .with(SeverityLevel::Medium, 4)
        .with(SeverityLevel::Low, 5)
}

fn request(snapshot: AssessmentSnapshot, risk: RiskSummary, out: &Path) -> GenerateRequest {
    let input = ReportInput {
        findings: snapshot,
        risk_summary: risk,
        references: Vec::new(),
    };
    GenerateRequest::new(input, out).with_generated_at(fixed_time())
}

fn chart_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(CHART_FILE_PREFIX))
        .collect()
}

fn labels(doc: &Document, section: &str) -> Vec<String> {
    doc.section_blocks(section)
        .into_iter()
        .filter_map(|b| match &b.kind {
            BlockKind::Label(run) => Some(run.text()),
            _ => None,
        })
        .collect()
}

#[test]
fn default_snapshot_produces_ten_pages() {
    let temp = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let out = out_dir.path().join("eks_review_report.pdf");

    let output = generate(
        &request(AssessmentSnapshot::defaults(), sample_risk(), &out),
        &config_with_temp(temp.path()),
        &RasterChartRenderer,
        &SilentProgress,
    )
    .unwrap();

    assert_eq!(output.artifact.page_count, 10);
    assert_eq!(output.chart, ChartOutcome::Embedded);

    let bytes = std::fs::read(&out).unwrap();
    assert_eq!(bytes.len(), output.artifact.size_bytes);
    let pdf = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(pdf.get_pages().len(), 10);

    let titles = output.document.section_titles();
    assert_eq!(
        titles,
        vec![
            "EKS Operational Review Report",
            "Executive Summary",
            RISK_TITLE,
            "Cluster Health",
            "Cost Optimization",
            "Security",
            "Monitoring",
            "CI/CD",
            "Others",
            "Best Practices & References",
            RECOMMENDATIONS_TITLE,
        ]
    );

    let text = output.document.text_content();
    assert!(text.contains("Generated on: 2024-03-01 09:30:00"));
    assert!(text.contains("Page 1/10"));
    assert!(text.contains("Page 10/10"));
    assert!(text.contains("Critical: 2 finding(s)"));
    assert!(text.contains("Total: 14 finding(s)"));
}

#[test]
fn chart_asset_is_removed_after_success() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path().join("report.pdf");

    generate(
        &request(AssessmentSnapshot::defaults(), sample_risk(), &out),
        &config_with_temp(temp.path()),
        &RasterChartRenderer,
        &SilentProgress,
    )
    .unwrap();

    assert!(chart_files(temp.path()).is_empty());
    assert!(out.exists());
}

#[test]
fn chart_failure_degrades_to_placeholder() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path().join("report.pdf");

    let output = generate(
        &request(AssessmentSnapshot::defaults(), sample_risk(), &out),
        &config_with_temp(temp.path()),
        &BrokenBackend,
        &SilentProgress,
    )
    .unwrap();

    assert!(matches!(output.chart, ChartOutcome::Placeholder(ref why) if why.contains("not available")));
    assert!(chart_files(temp.path()).is_empty());
    assert!(out.exists());
    assert_eq!(output.artifact.page_count, 10);

    let risk_blocks = output.document.section_blocks(RISK_TITLE);
    assert!(!risk_blocks.iter().any(|b| matches!(b.kind, BlockKind::Image(_))));
    assert!(
        risk_blocks
            .iter()
            .filter_map(|b| b.kind.text())
            .any(|t| t.starts_with(CHART_PLACEHOLDER))
    );
    assert_eq!(labels(&output.document, "Security").len(), 3);
}

#[test]
fn all_empty_snapshot_gives_header_only_pillars() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path().join("report.pdf");

    let output = generate(
        &request(AssessmentSnapshot::new(), RiskSummary::new(), &out),
        &config_with_temp(temp.path()),
        &RasterChartRenderer,
        &SilentProgress,
    )
    .unwrap();

    for pillar in &ReportCatalog::builtin().pillars {
        let blocks = output.document.section_blocks(&pillar.name);
        assert_eq!(blocks.len(), 1, "{} should only have its header", pillar.name);
        assert!(matches!(blocks[0].kind, BlockKind::Header { .. }));
    }
    assert_eq!(output.artifact.page_count, 10);
}

#[test]
fn security_scenario_has_one_labeled_block() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path().join("report.pdf");
    let snapshot = AssessmentSnapshot::new()
        .with("Security", "IAM Configuration", "ok")
        .with("Security", "Secret Management", "")
        .with("Security", "Network Policies", "");

    let output = generate(
        &request(snapshot, sample_risk(), &out),
        &config_with_temp(temp.path()),
        &RasterChartRenderer,
        &SilentProgress,
    )
    .unwrap();

    assert_eq!(labels(&output.document, "Security"), vec!["IAM Configuration:"]);
    let paragraphs: Vec<_> = output
        .document
        .section_blocks("Security")
        .into_iter()
        .filter(|b| matches!(b.kind, BlockKind::Paragraph(_)))
        .filter_map(|b| b.kind.text())
        .collect();
    assert_eq!(paragraphs, vec!["ok"]);
}

#[test]
fn zero_risk_summary_renders_flat_chart() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path().join("report.pdf");

    let output = generate(
        &request(AssessmentSnapshot::defaults(), RiskSummary::new(), &out),
        &config_with_temp(temp.path()),
        &RasterChartRenderer,
        &SilentProgress,
    )
    .unwrap();

    assert_eq!(output.chart, ChartOutcome::Embedded);
    let text = output.document.text_content();
    for level in SeverityLevel::ALL {
        assert!(text.contains(&format!("{level}: 0 finding(s)")));
    }
    assert!(text.contains("Total: 0 finding(s)"));
}

#[test]
fn saturated_risk_counts_still_render() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path().join("report.pdf");
    let risk = RiskSummary::new()
        .with(SeverityLevel::Critical, u64::MAX)
        .with(SeverityLevel::Low, 1);

    let output = generate(
        &request(AssessmentSnapshot::defaults(), risk, &out),
        &config_with_temp(temp.path()),
        &RasterChartRenderer,
        &SilentProgress,
    )
    .unwrap();

    assert_eq!(output.chart, ChartOutcome::Embedded);
    let text = output.document.text_content();
    assert!(text.contains(&format!("Critical: {} finding(s)", u64::MAX)));
    assert!(text.contains(&format!("Total: {} finding(s)", u64::MAX)));
}

#[test]
fn unembeddable_chart_is_fatal_and_clean() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path().join("report.pdf");

    let err = generate(
        &request(AssessmentSnapshot::defaults(), sample_risk(), &out),
        &config_with_temp(temp.path()),
        &CorruptImageBackend,
        &SilentProgress,
    )
    .unwrap_err();

    assert!(matches!(err, EksReviewError::Assembly { .. }));
    assert!(!out.exists());
    assert!(chart_files(temp.path()).is_empty());
}

#[test]
fn regeneration_is_deterministic() {
    let temp = tempfile::tempdir().unwrap();
    let config = config_with_temp(temp.path());

    let run = |name: &str, at: NaiveDateTime| {
        let out = temp.path().join(name);
        let req = request(AssessmentSnapshot::defaults(), sample_risk(), &out).with_generated_at(at);
        generate(&req, &config, &RasterChartRenderer, &SilentProgress)
            .unwrap()
            .document
            .text_content()
    };

    let first = run("a.pdf", fixed_time());
    let second = run("b.pdf", fixed_time());
    assert_eq!(first, second);

    let later = fixed_time() + chrono::Duration::hours(1);
    let third = run("c.pdf", later);
    let strip = |t: &str| {
        t.lines()
            .filter(|l| !l.starts_with("Generated on:"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    assert_ne!(first, third);
    assert_eq!(strip(&first), strip(&third));
}

#[test]
fn unwritable_destination_is_fatal_and_clean() {
    let temp = tempfile::tempdir().unwrap();
    let blocker = temp.path().join("not-a-dir");
    std::fs::write(&blocker, b"x").unwrap();
    let out = blocker.join("report.pdf");

    let err = generate(
        &request(AssessmentSnapshot::defaults(), sample_risk(), &out),
        &config_with_temp(temp.path()),
        &RasterChartRenderer,
        &SilentProgress,
    )
    .unwrap_err();

    assert!(matches!(err, EksReviewError::Assembly { .. }));
    assert!(!out.exists());
    assert!(chart_files(temp.path()).is_empty());
}

#[test]
fn overlong_finding_spills_onto_extra_page() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path().join("report.pdf");
    let long = vec!["- node group ng-1 has pods pending on insufficient memory"; 60].join("\n");
    let snapshot = AssessmentSnapshot::defaults().with("Cluster Health", "Node Health", long);

    let output = generate(
        &request(snapshot, sample_risk(), &out),
        &config_with_temp(temp.path()),
        &RasterChartRenderer,
        &SilentProgress,
    )
    .unwrap();

    let pages = output.artifact.page_count;
    assert!(pages > 10);
    let text = output.document.text_content();
    assert!(text.contains(&format!("Page {pages}/{pages}")));

    // The continuation carries no second header.
    let headers = output
        .document
        .section_blocks("Cluster Health")
        .into_iter()
        .filter(|b| matches!(b.kind, BlockKind::Header { .. }))
        .count();
    assert_eq!(headers, 1);
}

#[test]
fn priority_change_only_recolors_recommendation() {
    let temp = tempfile::tempdir().unwrap();
    let options = ChartOptions {
        width_px: 700,
        height_px: 400,
        temp_dir: temp.path().to_path_buf(),
    };
    let snapshot = AssessmentSnapshot::defaults();
    let risk = sample_risk();

    let lines = |catalog: &ReportCatalog, out: &str| {
        let input = AssemblyInput {
            catalog,
            snapshot: &snapshot,
            risk: &risk,
            search_results: &[],
            generated_at: fixed_time(),
        };
        let stage = ChartStage {
            renderer: &RasterChartRenderer,
            options: &options,
        };
        let output = Assembler::new(input, stage, &SilentProgress)
            .run(&temp.path().join(out))
            .unwrap();
        output
            .document
            .section_blocks(RECOMMENDATIONS_TITLE)
            .into_iter()
            .filter_map(|b| match &b.kind {
                BlockKind::ColoredLine(run) => Some((run.text(), run.color, b.frame.y)),
                _ => None,
            })
            .collect::<Vec<_>>()
    };

    let base = ReportCatalog::builtin();
    let mut changed = base.clone();
    changed.recommendations[0].recommendation.priority = SeverityLevel::Low;

    let before = lines(&base, "before.pdf");
    let after = lines(&changed, "after.pdf");

    assert_eq!(before.len(), 9);
    assert_eq!(before.len(), after.len());
    assert_eq!(before[0].1, SeverityLevel::High.color());
    assert_eq!(after[0].1, SeverityLevel::Low.color());
    assert_eq!(before[0].2, after[0].2);
    assert!(after[0].0.ends_with("Implement automated node health checks"));
    assert_eq!(before[1..], after[1..]);
}
