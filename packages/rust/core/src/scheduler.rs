//! Recommendation scheduler: timeframe buckets in catalog order.

use eksreview_shared::{Recommendation, ScheduledRecommendation, Timeframe};

/// One timeframe and its recommendations, in the order they were listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeframeBucket {
    pub timeframe: Timeframe,
    pub recommendations: Vec<Recommendation>,
}

/// Group `entries` by timeframe, chronologically.
///
/// Within a bucket the input order is kept as-is; priorities never reorder
/// entries. Timeframes with nothing scheduled are left out.
pub fn schedule(entries: &[ScheduledRecommendation]) -> Vec<TimeframeBucket> {
    Timeframe::ALL
        .into_iter()
        .map(|timeframe| TimeframeBucket {
            timeframe,
            recommendations: entries
                .iter()
                .filter(|e| e.timeframe == timeframe)
                .map(|e| e.recommendation.clone())
                .collect(),
        })
        .filter(|bucket| !bucket.recommendations.is_empty())
        .collect()
}
