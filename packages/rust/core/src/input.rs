//! Loading review input and search-result files, and writing templates.

use std::path::Path;

use tracing::debug;

use eksreview_shared::{
    AssessmentSnapshot, EksReviewError, ReportInput, Result, RiskSummary, SeverityLevel,
};

/// Serialization format of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Toml,
}

impl InputFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => Err(EksReviewError::validation(format!(
                "unsupported input file {}: expected .json or .toml",
                path.display()
            ))),
        }
    }
}

/// Read a review input file (findings, risk summary, search results).
pub fn load_input(path: &Path) -> Result<ReportInput> {
    let format = InputFormat::from_path(path)?;
    let text = std::fs::read_to_string(path).map_err(|e| EksReviewError::io(path, e))?;
    let input: ReportInput = match format {
        InputFormat::Json => serde_json::from_str(&text).map_err(|e| {
            EksReviewError::validation(format!("invalid input {}: {e}", path.display()))
        })?,
        InputFormat::Toml => toml::from_str(&text).map_err(|e| {
            EksReviewError::validation(format!("invalid input {}: {e}", path.display()))
        })?,
    };
    debug!(
        path = %path.display(),
        findings = input.findings.keys().count(),
        references = input.references.len(),
        "input loaded"
    );
    Ok(input)
}

/// Read a search-results file: either a bare list of items or a table with
/// a `references` list.
///
/// Every failure is a [`EksReviewError::Lookup`]; callers treat it as
/// optional enrichment.
pub fn load_references(path: &Path) -> Result<Vec<serde_json::Value>> {
    let lookup = |msg: String| EksReviewError::Lookup(format!("{}: {msg}", path.display()));

    let format = InputFormat::from_path(path).map_err(|e| lookup(e.to_string()))?;
    let text = std::fs::read_to_string(path).map_err(|e| lookup(e.to_string()))?;
    let value: serde_json::Value = match format {
        InputFormat::Json => serde_json::from_str(&text).map_err(|e| lookup(e.to_string()))?,
        InputFormat::Toml => toml::from_str(&text).map_err(|e| lookup(e.to_string()))?,
    };

    match value {
        serde_json::Value::Array(items) => Ok(items),
        serde_json::Value::Object(mut map) => match map.remove("references") {
            Some(serde_json::Value::Array(items)) => Ok(items),
            _ => Err(lookup("expected a `references` list".into())),
        },
        _ => Err(lookup("expected a list of references".into())),
    }
}

/// A starter input: the default findings and a sample risk summary.
pub fn template_input() -> ReportInput {
    ReportInput {
        findings: AssessmentSnapshot::defaults(),
        risk_summary: RiskSummary::new()
            .with(SeverityLevel::Critical, 2)
            .with(SeverityLevel::High, 3)
            .with(SeverityLevel::Medium, 4)
            .with(SeverityLevel::Low, 5),
        references: Vec::new(),
    }
}

/// Serialize the starter input.
pub fn render_template(format: InputFormat) -> Result<String> {
    let input = template_input();
    match format {
        InputFormat::Json => serde_json::to_string_pretty(&input)
            .map_err(|e| EksReviewError::Serialization(e.to_string())),
        InputFormat::Toml => {
            toml::to_string_pretty(&input).map_err(|e| EksReviewError::Serialization(e.to_string()))
        }
    }
}
