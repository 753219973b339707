use super::*;
use chrono::{DateTime, TimeZone, Utc};

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
}

fn perf(event: &str, pct: f64, d: u32, total: usize) -> EventPerformance {
    EventPerformance {
        event_id: event.to_string(),
        position: 1,
        percentile: pct,
        total_participants: total,
        tested_at: day(d),
    }
}

#[test]
fn test_baseline_unpurchased() {
    let params = ScoringParams::default_v1();
    let score = account_score("a1", "a1@example.com", vec![], false, &params);
    assert_eq!(score.events_entered, 0);
    assert_eq!(score.avg_percentile, 0.0);
    assert_eq!(score.consistency_score, 100.0);
    assert_eq!(score.breakdown.composite_score, 25.0);
    assert_eq!(score.breakdown.confidence, Confidence::Low);
    assert_eq!(score.breakdown.confidence_reason, "No queue data available");
    assert!(score.last_tested_at.is_none());
}

#[test]
fn test_baseline_purchased() {
    let params = ScoringParams::default_v1();
    let score = account_score("a1", "a1@example.com", vec![], true, &params);
    assert_eq!(score.breakdown.composite_score, 35.0);
    assert_eq!(score.breakdown.purchase_success_score, 100.0);
    assert_eq!(score.breakdown.confidence, Confidence::Low);
}

#[test]
fn test_three_tens_scenario() {
    let params = ScoringParams::default_v1();
    let perfs = vec![
        perf("e1", 10.0, 1, 50),
        perf("e2", 10.0, 2, 50),
        perf("e3", 10.0, 3, 50),
    ];
    let score = account_score("a1", "a1@example.com", perfs, false, &params);

    assert_eq!(score.avg_percentile, 10.0);
    assert_eq!(score.percentile_std_dev, 0.0);
    assert_eq!(score.consistency_score, 100.0);
    assert_eq!(score.recent_avg_percentile, 10.0);

    let b = &score.breakdown;
    assert_eq!(b.percentile_score, 90.0);
    assert_eq!(b.consistency_score, 100.0);
    assert_eq!(b.recent_performance_score, 90.0);
    assert_eq!(b.event_coverage_score, 30.0);
    assert_eq!(b.purchase_success_score, 0.0);
    // 90*0.40 + 100*0.25 + 90*0.15 + 30*0.10 + 0*0.10
    assert!((b.composite_score - 77.5).abs() < 1e-9);
    assert_eq!(b.confidence, Confidence::Medium);
    assert_eq!(b.confidence_reason, "Based on 3 queue tests");
}

#[test]
fn test_confidence_tiers_monotonic_in_sample_size() {
    let params = ScoringParams::default_v1();
    let expected = [
        (1, Confidence::Low),
        (2, Confidence::Medium),
        (3, Confidence::Medium),
        (4, Confidence::High),
        (9, Confidence::High),
    ];
    for (n, tier) in expected {
        let perfs = (0..n).map(|i| perf("e", 50.0, i + 1, 10)).collect();
        let score = account_score("a1", "a1", perfs, false, &params);
        assert_eq!(score.breakdown.confidence, tier, "events_entered={}", n);
    }
}

#[test]
fn test_weighted_percentile_favors_large_events() {
    let params = ScoringParams::default_v1();
    let perfs = vec![perf("big", 10.0, 1, 100), perf("small", 90.0, 2, 10)];
    let score = account_score("a1", "a1", perfs, false, &params);
    assert_eq!(score.avg_percentile, 50.0);
    // (10*100 + 90*10) / 110 = 17.27...
    assert_eq!(score.weighted_percentile, 17.3);
    assert_eq!(score.best_percentile, 10.0);
    assert_eq!(score.worst_percentile, 90.0);
    assert_eq!(score.percentile_range, 80.0);
}

#[test]
fn test_improvement_from_older_window() {
    let params = ScoringParams::default_v1();
    let perfs = vec![
        perf("e1", 80.0, 1, 10),
        perf("e2", 60.0, 2, 10),
        perf("e3", 30.0, 3, 10),
        perf("e4", 20.0, 4, 10),
        perf("e5", 10.0, 5, 10),
    ];
    let score = account_score("a1", "a1", perfs, false, &params);
    // recent = days 5,4,3 -> mean 20; older = days 2,1 -> mean 70
    assert_eq!(score.recent_avg_percentile, 20.0);
    assert_eq!(score.improvement_score, 50.0);
    assert_eq!(score.last_tested_at, Some(day(5)));
}

#[test]
fn test_improvement_zero_without_older_window() {
    let params = ScoringParams::default_v1();
    let perfs = vec![perf("e1", 80.0, 1, 10), perf("e2", 10.0, 2, 10)];
    let score = account_score("a1", "a1", perfs, false, &params);
    assert_eq!(score.improvement_score, 0.0);
}

#[test]
fn test_recent_window_ties_keep_input_order() {
    let params = ScoringParams {
        recent_event_count: 2,
        ..ScoringParams::default_v1()
    };
    // All same timestamp: the stable sort keeps input order, so the recent
    // window is the first two performances.
    let perfs = vec![
        perf("e1", 10.0, 1, 10),
        perf("e2", 20.0, 1, 10),
        perf("e3", 90.0, 1, 10),
    ];
    let score = account_score("a1", "a1", perfs, false, &params);
    assert_eq!(score.recent_avg_percentile, 15.0);
}

#[test]
fn test_consistency_saturation() {
    let params = ScoringParams::default_v1();
    let perfs = vec![
        perf("e1", 42.5, 1, 10),
        perf("e2", 42.5, 2, 10),
        perf("e3", 42.5, 3, 10),
        perf("e4", 42.5, 4, 10),
    ];
    let score = account_score("a1", "a1", perfs, false, &params);
    assert_eq!(score.percentile_std_dev, 0.0);
    assert_eq!(score.consistency_score, 100.0);
}

#[test]
fn test_consistency_floor_at_high_spread() {
    let params = ScoringParams::default_v1();
    // sd of [0, 50, 100] is ~40.8, past the 25-point calibration ceiling.
    let perfs = vec![
        perf("e1", 0.0, 1, 10),
        perf("e2", 50.0, 2, 10),
        perf("e3", 100.0, 3, 10),
    ];
    let score = account_score("a1", "a1", perfs, false, &params);
    assert_eq!(score.consistency_score, 0.0);
}

#[test]
fn test_event_coverage_saturates() {
    let params = ScoringParams::default_v1();
    let perfs = (0..12).map(|i| perf("e", 50.0, i + 1, 10)).collect();
    let score = account_score("a1", "a1", perfs, false, &params);
    assert_eq!(score.breakdown.event_coverage_score, 100.0);
}

#[test]
fn test_outputs_rounded_to_one_decimal() {
    let params = ScoringParams::default_v1();
    let perfs = vec![perf("e1", 33.25, 1, 10), perf("e2", 33.25, 2, 10)];
    let score = account_score("a1", "a1", perfs, false, &params);
    // Half away from zero: 33.25 -> 33.3.
    assert_eq!(score.avg_percentile, 33.3);
}

#[test]
fn test_component_scores_within_bounds() {
    let params = ScoringParams::default_v1();
    let perfs = vec![
        perf("e1", 0.0, 1, 1000),
        perf("e2", 100.0, 2, 1),
        perf("e3", 55.5, 3, 77),
    ];
    let score = account_score("a1", "a1", perfs, true, &params);
    let b = &score.breakdown;
    for value in [
        b.percentile_score,
        b.consistency_score,
        b.recent_performance_score,
        b.event_coverage_score,
        b.purchase_success_score,
        b.composite_score,
    ] {
        assert!((0.0..=100.0).contains(&value));
    }
}

#[test]
fn test_run_stage4_covers_profile_only_accounts() {
    let params = ScoringParams::default_v1();
    let mut profiles = BTreeMap::new();
    profiles.insert(
        "a1".to_string(),
        AccountProfile {
            email: "a1@example.com".to_string(),
            has_purchased: true,
        },
    );
    let performances = BTreeMap::new();
    let scores = run_stage4(&profiles, performances, &params);
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].breakdown.composite_score, 35.0);
}

#[test]
fn test_run_stage4_covers_performance_only_accounts() {
    let params = ScoringParams::default_v1();
    let profiles = BTreeMap::new();
    let mut performances = BTreeMap::new();
    performances.insert("ghost".to_string(), vec![perf("e1", 10.0, 1, 10)]);
    let scores = run_stage4(&profiles, performances, &params);
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].email, "ghost");
    assert!(!scores[0].has_purchased);
}

#[test]
fn test_determinism_bits() {
    let params = ScoringParams::default_v1();
    let perfs = vec![
        perf("e1", 12.3, 1, 321),
        perf("e2", 45.6, 2, 77),
        perf("e3", 78.9, 3, 1042),
    ];
    let a = account_score("a1", "a1", perfs.clone(), true, &params);
    let b = account_score("a1", "a1", perfs, true, &params);
    assert_eq!(
        a.breakdown.composite_score.to_bits(),
        b.breakdown.composite_score.to_bits()
    );
    assert_eq!(a.weighted_percentile.to_bits(), b.weighted_percentile.to_bits());
    assert_eq!(a.percentile_std_dev.to_bits(), b.percentile_std_dev.to_bits());
}
