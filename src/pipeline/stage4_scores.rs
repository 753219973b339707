use std::collections::BTreeMap;

use crate::input::accounts::AccountProfile;
use crate::model::performance::EventPerformance;
use crate::model::score::{AccountScore, Confidence, ScoreBreakdown, clamp100, round1};
use crate::model::weights::{ScoreWeights, ScoringParams};

/// A standard deviation of 25 percentile points is defined as fully
/// inconsistent (score 0); zero deviation scores 100.
pub const CONSISTENCY_SD_CEILING: f64 = 25.0;

/// Fixed baseline composites for accounts with no queue data. These are
/// design constants (baseline credit for unverified trust), not weighted
/// sums; callers must not read them as measured scores.
pub const BASELINE_COMPOSITE_PURCHASED: f64 = 35.0;
pub const BASELINE_COMPOSITE_UNVERIFIED: f64 = 25.0;

pub fn run_stage4(
    profiles: &BTreeMap<String, AccountProfile>,
    mut performances: BTreeMap<String, Vec<EventPerformance>>,
    params: &ScoringParams,
) -> Vec<AccountScore> {
    let mut scores = Vec::with_capacity(profiles.len());
    for (account_id, profile) in profiles {
        let perfs = performances.remove(account_id).unwrap_or_default();
        scores.push(account_score(
            account_id,
            &profile.email,
            perfs,
            profile.has_purchased,
            params,
        ));
    }
    // Accounts that somehow appear only in the performance map still get a
    // score under a self-identifying profile.
    for (account_id, perfs) in performances {
        let email = account_id.clone();
        scores.push(account_score(&account_id, &email, perfs, false, params));
    }
    scores
}

pub fn account_score(
    account_id: &str,
    email: &str,
    performances: Vec<EventPerformance>,
    has_purchased: bool,
    params: &ScoringParams,
) -> AccountScore {
    if performances.is_empty() {
        return baseline_score(account_id, email, has_purchased, &params.weights);
    }

    let pcts: Vec<f64> = performances.iter().map(|p| p.percentile).collect();
    let avg = mean(&pcts);

    let total_weight: f64 = performances
        .iter()
        .map(|p| p.total_participants as f64)
        .sum();
    let weighted = if total_weight > 0.0 {
        performances
            .iter()
            .map(|p| p.percentile * p.total_participants as f64)
            .sum::<f64>()
            / total_weight
    } else {
        avg
    };

    let best = pcts.iter().copied().fold(f64::INFINITY, f64::min);
    let worst = pcts.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let std_dev = population_std_dev(&pcts, avg);
    let consistency = clamp100(100.0 * (1.0 - std_dev / CONSISTENCY_SD_CEILING));

    // Most recent first; the stable sort keeps input order for equal
    // timestamps.
    let mut recent_order: Vec<&EventPerformance> = performances.iter().collect();
    recent_order.sort_by(|a, b| b.tested_at.cmp(&a.tested_at));
    let recent: Vec<f64> = recent_order
        .iter()
        .take(params.recent_event_count)
        .map(|p| p.percentile)
        .collect();
    let older: Vec<f64> = recent_order
        .iter()
        .skip(params.recent_event_count)
        .map(|p| p.percentile)
        .collect();
    let recent_avg = mean(&recent);
    let improvement = if performances.len() >= 2 && !older.is_empty() {
        // Positive = recent tests land lower (better) than the older ones.
        mean(&older) - recent_avg
    } else {
        0.0
    };
    let last_tested_at = recent_order.first().map(|p| p.tested_at);

    let avg = round1(avg);
    let consistency = round1(consistency);
    let recent_avg = round1(recent_avg);

    let breakdown = score_breakdown(
        avg,
        consistency,
        recent_avg,
        performances.len(),
        has_purchased,
        params.max_events_for_norm,
        &params.weights,
    );

    AccountScore {
        account_id: account_id.to_string(),
        email: email.to_string(),
        events_entered: performances.len(),
        avg_percentile: avg,
        weighted_percentile: round1(weighted),
        best_percentile: round1(best),
        worst_percentile: round1(worst),
        percentile_range: round1(worst - best),
        percentile_std_dev: round1(std_dev),
        consistency_score: consistency,
        recent_avg_percentile: recent_avg,
        improvement_score: round1(improvement),
        has_purchased,
        last_tested_at,
        breakdown,
        performances,
    }
}

pub fn score_breakdown(
    avg_percentile: f64,
    consistency_score: f64,
    recent_avg_percentile: f64,
    events_entered: usize,
    has_purchased: bool,
    max_events_for_norm: usize,
    weights: &ScoreWeights,
) -> ScoreBreakdown {
    let percentile_score = clamp100(100.0 - avg_percentile);
    let consistency_score = clamp100(consistency_score);
    let recent_performance_score = clamp100(100.0 - recent_avg_percentile);
    let event_coverage_score =
        clamp100(events_entered as f64 / max_events_for_norm as f64 * 100.0);
    let purchase_success_score = if has_purchased { 100.0 } else { 0.0 };

    let percentile_weighted = percentile_score * weights.percentile;
    let consistency_weighted = consistency_score * weights.consistency;
    let recent_performance_weighted = recent_performance_score * weights.recent_performance;
    let event_coverage_weighted = event_coverage_score * weights.event_coverage;
    let purchase_success_weighted = purchase_success_score * weights.purchase_success;

    let composite = clamp100(
        percentile_weighted
            + consistency_weighted
            + recent_performance_weighted
            + event_coverage_weighted
            + purchase_success_weighted,
    );

    let (confidence, confidence_reason) = confidence_tier(events_entered);

    ScoreBreakdown {
        percentile_score: round1(percentile_score),
        consistency_score: round1(consistency_score),
        recent_performance_score: round1(recent_performance_score),
        event_coverage_score: round1(event_coverage_score),
        purchase_success_score: round1(purchase_success_score),
        percentile_weighted: round1(percentile_weighted),
        consistency_weighted: round1(consistency_weighted),
        recent_performance_weighted: round1(recent_performance_weighted),
        event_coverage_weighted: round1(event_coverage_weighted),
        purchase_success_weighted: round1(purchase_success_weighted),
        composite_score: round1(composite),
        confidence,
        confidence_reason,
    }
}

fn confidence_tier(events_entered: usize) -> (Confidence, String) {
    match events_entered {
        0 => (Confidence::Low, "No queue data available".to_string()),
        1 => (
            Confidence::Low,
            "Based on only 1 queue test".to_string(),
        ),
        2..=3 => (
            Confidence::Medium,
            format!("Based on {} queue tests", events_entered),
        ),
        _ => (
            Confidence::High,
            format!(
                "Based on {} queue tests across multiple events",
                events_entered
            ),
        ),
    }
}

fn baseline_score(
    account_id: &str,
    email: &str,
    has_purchased: bool,
    weights: &ScoreWeights,
) -> AccountScore {
    let purchase_success_score = if has_purchased { 100.0 } else { 0.0 };
    let composite = if has_purchased {
        BASELINE_COMPOSITE_PURCHASED
    } else {
        BASELINE_COMPOSITE_UNVERIFIED
    };
    let (confidence, confidence_reason) = confidence_tier(0);

    let breakdown = ScoreBreakdown {
        percentile_score: 0.0,
        // No variance observed; defined as maximally consistent.
        consistency_score: 100.0,
        recent_performance_score: 0.0,
        event_coverage_score: 0.0,
        purchase_success_score,
        percentile_weighted: 0.0,
        consistency_weighted: round1(100.0 * weights.consistency),
        recent_performance_weighted: 0.0,
        event_coverage_weighted: 0.0,
        purchase_success_weighted: round1(purchase_success_score * weights.purchase_success),
        composite_score: composite,
        confidence,
        confidence_reason,
    };

    AccountScore {
        account_id: account_id.to_string(),
        email: email.to_string(),
        events_entered: 0,
        avg_percentile: 0.0,
        weighted_percentile: 0.0,
        best_percentile: 0.0,
        worst_percentile: 0.0,
        percentile_range: 0.0,
        percentile_std_dev: 0.0,
        consistency_score: 100.0,
        recent_avg_percentile: 0.0,
        improvement_score: 0.0,
        has_purchased,
        last_tested_at: None,
        breakdown,
        performances: Vec::new(),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_scores.rs"]
mod tests;
