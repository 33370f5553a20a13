//! Core domain types for an operational review.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EksReviewError, Result};
use crate::severity::SeverityLevel;

// ---------------------------------------------------------------------------
// Pillars and fields
// ---------------------------------------------------------------------------

/// A named assessment category and its ordered sub-topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PillarSpec {
    /// Display name (also the section title).
    pub name: String,
    /// One-line description of what the pillar covers.
    pub description: String,
    /// Ordered field names.
    pub fields: Vec<String>,
}

/// Strip decorative prefixes ("💡 Cluster Health" → "Cluster Health").
pub fn normalize_key(key: &str) -> &str {
    key.trim_start_matches(|c: char| !c.is_alphanumeric()).trim()
}

// ---------------------------------------------------------------------------
// AssessmentSnapshot
// ---------------------------------------------------------------------------

/// Free-text findings keyed by pillar, then field.
///
/// Owned by the caller; read-only to the compiler. Missing entries read as
/// empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentSnapshot {
    pillars: BTreeMap<String, BTreeMap<String, String>>,
}

impl AssessmentSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the finding for a (pillar, field) pair, replacing any previous text.
    pub fn set(&mut self, pillar: &str, field: &str, text: impl Into<String>) {
        self.pillars
            .entry(normalize_key(pillar).to_string())
            .or_default()
            .insert(normalize_key(field).to_string(), text.into());
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, pillar: &str, field: &str, text: impl Into<String>) -> Self {
        self.set(pillar, field, text);
        self
    }

    /// The finding for a (pillar, field) pair, or `""` when absent.
    pub fn finding(&self, pillar: &str, field: &str) -> &str {
        self.pillars
            .iter()
            .find(|(k, _)| normalize_key(k) == pillar)
            .and_then(|(_, fields)| {
                fields
                    .iter()
                    .find(|(k, _)| normalize_key(k) == field)
                    .map(|(_, v)| v.as_str())
            })
            .unwrap_or("")
    }

    /// Raw `(pillar, field)` keys present in the snapshot.
    pub fn keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pillars.iter().flat_map(|(p, fields)| {
            fields.keys().map(move |f| (p.as_str(), f.as_str()))
        })
    }

    /// Raw pillar keys that have no fields at all.
    pub fn empty_pillar_keys(&self) -> impl Iterator<Item = &str> {
        self.pillars
            .iter()
            .filter(|(_, fields)| fields.is_empty())
            .map(|(p, _)| p.as_str())
    }
}

// ---------------------------------------------------------------------------
// RiskSummary
// ---------------------------------------------------------------------------

/// Count of findings per severity level. Absent levels count 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, u64>", into = "BTreeMap<String, u64>")]
pub struct RiskSummary {
    counts: BTreeMap<SeverityLevel, u64>,
}

impl RiskSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, level: SeverityLevel, count: u64) -> Self {
        self.set(level, count);
        self
    }

    pub fn set(&mut self, level: SeverityLevel, count: u64) {
        self.counts.insert(level, count);
    }

    pub fn count(&self, level: SeverityLevel) -> u64 {
        self.counts.get(&level).copied().unwrap_or(0)
    }

    /// Sum of all counts, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.counts.values().fold(0u64, |acc, n| acc.saturating_add(*n))
    }

    /// All four levels in rank order, zero-filled.
    pub fn ordered(&self) -> [(SeverityLevel, u64); 4] {
        SeverityLevel::ALL.map(|level| (level, self.count(level)))
    }
}

impl FromIterator<(SeverityLevel, u64)> for RiskSummary {
    fn from_iter<I: IntoIterator<Item = (SeverityLevel, u64)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

impl TryFrom<BTreeMap<String, u64>> for RiskSummary {
    type Error = EksReviewError;

    fn try_from(raw: BTreeMap<String, u64>) -> Result<Self> {
        raw.into_iter()
            .map(|(k, v)| Ok((k.parse::<SeverityLevel>()?, v)))
            .collect()
    }
}

impl From<RiskSummary> for BTreeMap<String, u64> {
    fn from(summary: RiskSummary) -> Self {
        summary
            .ordered()
            .into_iter()
            .map(|(level, count)| (level.to_string(), count))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

/// Scheduling horizon bucket, in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl Timeframe {
    pub const ALL: [Timeframe; 3] = [Self::ShortTerm, Self::MediumTerm, Self::LongTerm];

    pub fn label(self) -> &'static str {
        match self {
            Self::ShortTerm => "Short Term (3 months)",
            Self::MediumTerm => "Medium Term (6 months)",
            Self::LongTerm => "Long Term (>6 months)",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A recommendation and its priority. Priority only drives display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub text: String,
    pub priority: SeverityLevel,
}

impl Recommendation {
    pub fn new(text: impl Into<String>, priority: SeverityLevel) -> Self {
        Self {
            text: text.into(),
            priority,
        }
    }

    /// Display form: `[Priority] - text`.
    pub fn display_line(&self) -> String {
        format!("[{}] - {}", self.priority, self.text)
    }
}

/// A recommendation placed in a timeframe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledRecommendation {
    pub timeframe: Timeframe,
    #[serde(flatten)]
    pub recommendation: Recommendation,
}

// ---------------------------------------------------------------------------
// References
// ---------------------------------------------------------------------------

/// A rendered reference: category (bold), link (colored), description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub category: String,
    pub link: String,
    pub description: String,
}

/// A documentation search result as delivered by the lookup boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceItem {
    /// Bare title; rendered with the placeholder link.
    PlainTitle(String),
    /// Title with a URL.
    TitledLink { title: String, url: String },
}

impl ReferenceItem {
    /// Interpret one raw search item. Returns `None` for shapes that are
    /// neither a string nor an object with string `title` and `url`.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(Self::PlainTitle(s.clone())),
            serde_json::Value::Object(map) => {
                let title = map.get("title")?.as_str()?;
                let url = map.get("url")?.as_str()?;
                Some(Self::TitledLink {
                    title: title.to_string(),
                    url: url.to_string(),
                })
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ReportInput
// ---------------------------------------------------------------------------

/// The complete input file: findings, risk counts and search results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportInput {
    #[serde(default)]
    pub findings: AssessmentSnapshot,
    #[serde(default)]
    pub risk_summary: RiskSummary,
    /// Raw search items; malformed entries are skipped later, not here.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_key_strips_decoration() {
        assert_eq!(normalize_key("💡 Cluster Health"), "Cluster Health");
        assert_eq!(normalize_key("⚙️ CI/CD"), "CI/CD");
        assert_eq!(normalize_key("Security"), "Security");
    }

    #[test]
    fn missing_findings_read_empty() {
        let snap = AssessmentSnapshot::new().with("Security", "IAM Configuration", "ok");
        assert_eq!(snap.finding("Security", "IAM Configuration"), "ok");
        assert_eq!(snap.finding("Security", "Network Policies"), "");
        assert_eq!(snap.finding("Monitoring", "Metric Collection"), "");
    }

    #[test]
    fn decorated_keys_match() {
        let json = r#"{ "🔐 Security": { "IAM Configuration": "irsa partial" } }"#;
        let snap: AssessmentSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.finding("Security", "IAM Configuration"), "irsa partial");
    }

    #[test]
    fn risk_summary_zero_fills_in_rank_order() {
        let json = r#"{ "low": 5, "Critical": 2 }"#;
        let summary: RiskSummary = serde_json::from_str(json).unwrap();
        let ordered = summary.ordered();
        assert_eq!(ordered[0], (SeverityLevel::Critical, 2));
        assert_eq!(ordered[1], (SeverityLevel::High, 0));
        assert_eq!(ordered[2], (SeverityLevel::Medium, 0));
        assert_eq!(ordered[3], (SeverityLevel::Low, 5));
        assert_eq!(summary.total(), 7);
    }

    #[test]
    fn risk_summary_total_saturates() {
        let summary = RiskSummary::new()
            .with(SeverityLevel::Critical, u64::MAX)
            .with(SeverityLevel::Low, 1);
        assert_eq!(summary.total(), u64::MAX);
    }

    #[test]
    fn risk_summary_rejects_bad_input() {
        assert!(serde_json::from_str::<RiskSummary>(r#"{ "Severe": 1 }"#).is_err());
        assert!(serde_json::from_str::<RiskSummary>(r#"{ "High": -1 }"#).is_err());
    }

    #[test]
    fn recommendation_display_line() {
        let rec = Recommendation::new("Implement service mesh", SeverityLevel::Low);
        assert_eq!(rec.display_line(), "[Low] - Implement service mesh");
    }

    #[test]
    fn reference_item_shapes() {
        let plain = serde_json::json!("EKS Best Practices");
        let linked = serde_json::json!({ "title": "Docs", "url": "https://example.com" });
        let malformed = serde_json::json!({ "title": "no url" });

        assert_eq!(
            ReferenceItem::from_value(&plain),
            Some(ReferenceItem::PlainTitle("EKS Best Practices".into()))
        );
        assert!(matches!(
            ReferenceItem::from_value(&linked),
            Some(ReferenceItem::TitledLink { .. })
        ));
        assert_eq!(ReferenceItem::from_value(&malformed), None);
        assert_eq!(ReferenceItem::from_value(&serde_json::json!(42)), None);
    }

    #[test]
    fn report_input_defaults_when_sections_missing() {
        let input: ReportInput = toml::from_str("[findings.Security]\n\"IAM Configuration\" = \"ok\"\n").unwrap();
        assert_eq!(input.findings.finding("Security", "IAM Configuration"), "ok");
        assert_eq!(input.risk_summary.total(), 0);
        assert!(input.references.is_empty());
    }
}
