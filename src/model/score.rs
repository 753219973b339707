use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::performance::EventPerformance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn label(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

/// Five component scores (each 0..=100), their weighted contributions, the
/// blended composite, and a confidence grade over the sample size.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub percentile_score: f64,
    pub consistency_score: f64,
    pub recent_performance_score: f64,
    pub event_coverage_score: f64,
    pub purchase_success_score: f64,
    pub percentile_weighted: f64,
    pub consistency_weighted: f64,
    pub recent_performance_weighted: f64,
    pub event_coverage_weighted: f64,
    pub purchase_success_weighted: f64,
    pub composite_score: f64,
    pub confidence: Confidence,
    pub confidence_reason: String,
}

/// Per-account aggregate over all of its event performances. Recomputed
/// fresh on every run; numeric fields are rounded to one decimal.
#[derive(Debug, Clone, Serialize)]
pub struct AccountScore {
    pub account_id: String,
    pub email: String,
    pub events_entered: usize,
    pub avg_percentile: f64,
    pub weighted_percentile: f64,
    pub best_percentile: f64,
    pub worst_percentile: f64,
    pub percentile_range: f64,
    pub percentile_std_dev: f64,
    pub consistency_score: f64,
    pub recent_avg_percentile: f64,
    pub improvement_score: f64,
    pub has_purchased: bool,
    pub last_tested_at: Option<DateTime<Utc>>,
    pub breakdown: ScoreBreakdown,
    pub performances: Vec<EventPerformance>,
}

pub fn clamp100(x: f64) -> f64 {
    if x < 0.0 {
        0.0
    } else if x > 100.0 {
        100.0
    } else {
        x
    }
}

/// Round to one decimal, half away from zero. `f64::round` rounds halves
/// away from zero on every platform, which keeps outputs reproducible.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
