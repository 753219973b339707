/// Ranking criteria. Percentile-family criteria rank better-first in
/// ascending order (lower percentile = better); the rest rank better-first
/// in descending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortCriteria {
    Percentile,
    WeightedPercentile,
    Consistency,
    EventsEntered,
    RecentPerformance,
    Improvement,
    CompositeScore,
}

impl SortCriteria {
    /// Parse a user-supplied criterion name. Unknown names fall back to
    /// `Percentile` instead of failing; the fallback is part of the ranking
    /// contract, not an accident of a default match arm.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "percentile" => SortCriteria::Percentile,
            "weighted" | "weighted_percentile" => SortCriteria::WeightedPercentile,
            "consistency" => SortCriteria::Consistency,
            "events" | "events_entered" => SortCriteria::EventsEntered,
            "recent" | "recent_performance" => SortCriteria::RecentPerformance,
            "improvement" => SortCriteria::Improvement,
            "composite" | "composite_score" => SortCriteria::CompositeScore,
            _ => SortCriteria::Percentile,
        }
    }

    /// Whether ascending key order puts better accounts first.
    pub fn better_first_ascending(&self) -> bool {
        matches!(
            self,
            SortCriteria::Percentile
                | SortCriteria::WeightedPercentile
                | SortCriteria::RecentPerformance
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortCriteria::Percentile => "percentile",
            SortCriteria::WeightedPercentile => "weighted_percentile",
            SortCriteria::Consistency => "consistency",
            SortCriteria::EventsEntered => "events_entered",
            SortCriteria::RecentPerformance => "recent_performance",
            SortCriteria::Improvement => "improvement",
            SortCriteria::CompositeScore => "composite_score",
        }
    }
}
