use chrono::{DateTime, Utc};

use crate::model::reroll::{ChangeType, RerollAnalysis};
use crate::model::score::{AccountScore, round1};
use crate::model::weights::RerollParams;

/// Compares each account's mean percentile before and after `cutoff`.
/// Accounts with fewer than `min_events_each_side` tests on either side are
/// left out of the result entirely; absence means insufficient data.
pub fn run_stage6(
    scores: &[AccountScore],
    cutoff: DateTime<Utc>,
    params: &RerollParams,
) -> Vec<RerollAnalysis> {
    let mut out = Vec::new();

    for score in scores {
        let mut before = Vec::new();
        let mut after = Vec::new();
        for perf in &score.performances {
            if perf.tested_at < cutoff {
                before.push(perf.percentile);
            } else {
                after.push(perf.percentile);
            }
        }
        if before.len() < params.min_events_each_side || after.len() < params.min_events_each_side {
            continue;
        }

        let before_percentile = mean(&before);
        let after_percentile = mean(&after);
        // Classified on the rounded value so the reported change and its
        // label always agree. Strict inequalities: a change exactly at the
        // threshold is stable.
        let change = round1(after_percentile - before_percentile);
        let change_type = if change < -params.significant_change_threshold {
            ChangeType::Improved
        } else if change > params.significant_change_threshold {
            ChangeType::Declined
        } else {
            ChangeType::Stable
        };

        out.push(RerollAnalysis {
            account_id: score.account_id.clone(),
            email: score.email.clone(),
            before_percentile: round1(before_percentile),
            after_percentile: round1(after_percentile),
            events_before_cutoff: before.len(),
            events_after_cutoff: after.len(),
            change,
            change_type,
        });
    }

    out
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_reroll.rs"]
mod tests;
