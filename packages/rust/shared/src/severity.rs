//! Severity model: the fixed ordering and color of severity/priority levels.
//!
//! Shared by the risk chart and the recommendation list so a level always
//! means the same thing (and the same color) across the whole document.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EksReviewError;

/// An RGB color (0 to 255 per channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Default text color.
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    /// Link text color.
    pub const LINK_BLUE: Rgb = Rgb::new(0, 0, 255);
    /// Fill behind the title banner.
    pub const BANNER_FILL: Rgb = Rgb::new(240, 240, 240);
    /// Fill behind section headers.
    pub const HEADER_FILL: Rgb = Rgb::new(230, 230, 230);

    /// Channels scaled to `0.0..=1.0` (PDF color operands).
    pub fn unit(&self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }
}

/// Severity / priority level, ordered from most to least severe.
///
/// The derived `Ord` follows declaration order, so sorting (or a
/// `BTreeMap` keyed by level) always yields Critical, High, Medium, Low.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SeverityLevel {
    #[serde(alias = "critical", alias = "CRITICAL")]
    Critical,
    #[serde(alias = "high", alias = "HIGH")]
    High,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "low", alias = "LOW")]
    Low,
}

impl SeverityLevel {
    /// All levels in rank order.
    pub const ALL: [SeverityLevel; 4] = [
        SeverityLevel::Critical,
        SeverityLevel::High,
        SeverityLevel::Medium,
        SeverityLevel::Low,
    ];

    /// 0 = most severe.
    pub fn rank(self) -> usize {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }

    /// Fixed display color.
    pub fn color(self) -> Rgb {
        match self {
            Self::Critical => Rgb::new(255, 0, 0),
            Self::High => Rgb::new(255, 165, 0),
            Self::Medium => Rgb::new(255, 255, 0),
            Self::Low => Rgb::new(0, 255, 0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeverityLevel {
    type Err = EksReviewError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(EksReviewError::validation(format!(
                "unknown severity level '{other}': expected critical, high, medium or low"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_matches_declaration_order() {
        for (i, level) in SeverityLevel::ALL.iter().enumerate() {
            assert_eq!(level.rank(), i);
        }
        let mut shuffled = vec![
            SeverityLevel::Low,
            SeverityLevel::Critical,
            SeverityLevel::Medium,
            SeverityLevel::High,
        ];
        shuffled.sort();
        assert_eq!(shuffled, SeverityLevel::ALL.to_vec());
    }

    #[test]
    fn colors_are_fixed() {
        assert_eq!(SeverityLevel::Critical.color(), Rgb::new(255, 0, 0));
        assert_eq!(SeverityLevel::High.color(), Rgb::new(255, 165, 0));
        assert_eq!(SeverityLevel::Medium.color(), Rgb::new(255, 255, 0));
        assert_eq!(SeverityLevel::Low.color(), Rgb::new(0, 255, 0));
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("HIGH".parse::<SeverityLevel>().unwrap(), SeverityLevel::High);
        assert_eq!(" low ".parse::<SeverityLevel>().unwrap(), SeverityLevel::Low);
        assert!("severe".parse::<SeverityLevel>().is_err());
    }

    #[test]
    fn deserializes_lowercase_alias() {
        let level: SeverityLevel = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(level, SeverityLevel::Critical);
    }
}
