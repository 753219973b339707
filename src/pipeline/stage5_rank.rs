use std::cmp::Ordering;

use serde::Serialize;

use crate::model::criteria::SortCriteria;
use crate::model::score::AccountScore;

#[derive(Debug, Clone, Serialize)]
pub struct RankedAccount {
    pub rank: usize,
    #[serde(flatten)]
    pub score: AccountScore,
}

/// Stable sort by the given criterion. `ascending` orders by the raw key;
/// ties keep their input order, which pagination and the reroll views rely
/// on.
pub fn sort_scores(
    mut scores: Vec<AccountScore>,
    criteria: SortCriteria,
    ascending: bool,
) -> Vec<AccountScore> {
    scores.sort_by(|a, b| compare(a, b, criteria, ascending));
    scores
}

/// Assigns 1-based contiguous ranks after sorting by the canonical
/// criterion: composite score, best first.
pub fn rank(scores: Vec<AccountScore>) -> Vec<RankedAccount> {
    let sorted = sort_scores(scores, SortCriteria::CompositeScore, false);
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, score)| RankedAccount { rank: i + 1, score })
        .collect()
}

/// Reorders already-ranked accounts by another criterion; ranks stay what
/// the canonical sort assigned.
pub fn sort_ranked(
    mut ranked: Vec<RankedAccount>,
    criteria: SortCriteria,
    ascending: bool,
) -> Vec<RankedAccount> {
    ranked.sort_by(|a, b| compare(&a.score, &b.score, criteria, ascending));
    ranked
}

fn compare(a: &AccountScore, b: &AccountScore, criteria: SortCriteria, ascending: bool) -> Ordering {
    let ord = match criteria {
        SortCriteria::EventsEntered => a.events_entered.cmp(&b.events_entered),
        _ => key(a, criteria).total_cmp(&key(b, criteria)),
    };
    if ascending { ord } else { ord.reverse() }
}

fn key(score: &AccountScore, criteria: SortCriteria) -> f64 {
    match criteria {
        SortCriteria::Percentile => score.avg_percentile,
        SortCriteria::WeightedPercentile => score.weighted_percentile,
        SortCriteria::Consistency => score.consistency_score,
        SortCriteria::EventsEntered => score.events_entered as f64,
        SortCriteria::RecentPerformance => score.recent_avg_percentile,
        SortCriteria::Improvement => score.improvement_score,
        SortCriteria::CompositeScore => score.breakdown.composite_score,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_rank.rs"]
mod tests;
