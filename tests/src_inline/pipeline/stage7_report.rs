use super::*;
use chrono::TimeZone;

use crate::model::performance::EventPerformance;
use crate::model::reroll::ChangeType;
use crate::model::weights::ScoringParams;
use crate::pipeline::stage4_scores::account_score;
use crate::pipeline::stage5_rank::rank;

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, d, 0, 0, 0).unwrap()
}

fn perf(event: &str, pct: f64, d: u32) -> EventPerformance {
    EventPerformance {
        event_id: event.to_string(),
        position: 1,
        percentile: pct,
        total_participants: 25,
        tested_at: day(d),
    }
}

fn ranked_fixture() -> Vec<RankedAccount> {
    let params = ScoringParams::default_v1();
    let scores = vec![
        account_score(
            "a1",
            "first@example.com",
            vec![perf("e1", 12.5, 1), perf("e2", 37.5, 2), perf("e3", 25.0, 3)],
            true,
            &params,
        ),
        account_score("a2", "second@example.com", vec![], false, &params),
    ];
    rank(scores)
}

#[test]
fn test_header_matches_export_contract() {
    let fields: Vec<&str> = RANKINGS_HEADER.split(',').collect();
    assert_eq!(
        fields,
        vec![
            "rank",
            "email",
            "events_entered",
            "composite_score",
            "confidence",
            "avg_percentile",
            "weighted_percentile",
            "best_percentile",
            "worst_percentile",
            "percentile_range",
            "consistency_score",
            "recent_avg_percentile",
            "improvement_score",
            "has_purchased",
            "last_tested_at",
            "performances",
        ]
    );
}

#[test]
fn test_row_round_trips_within_rounding_tolerance() {
    let ranked = ranked_fixture();
    let entry = &ranked[0];
    let row = rankings_row(entry);
    let fields: Vec<&str> = row.split(',').collect();
    assert_eq!(fields.len(), RANKINGS_HEADER.split(',').count());

    assert_eq!(fields[0].parse::<usize>().unwrap(), entry.rank);
    assert_eq!(fields[1], entry.score.email);
    assert_eq!(
        fields[2].parse::<usize>().unwrap(),
        entry.score.events_entered
    );

    let numeric = [
        (fields[3], entry.score.breakdown.composite_score),
        (fields[5], entry.score.avg_percentile),
        (fields[6], entry.score.weighted_percentile),
        (fields[7], entry.score.best_percentile),
        (fields[8], entry.score.worst_percentile),
        (fields[9], entry.score.percentile_range),
        (fields[10], entry.score.consistency_score),
        (fields[11], entry.score.recent_avg_percentile),
        (fields[12], entry.score.improvement_score),
    ];
    for (text, expected) in numeric {
        let parsed: f64 = text.parse().unwrap();
        assert!(
            (parsed - expected).abs() <= 0.1,
            "{} not within 0.1 of {}",
            parsed,
            expected
        );
    }

    assert_eq!(fields[4], entry.score.breakdown.confidence.label());
    assert_eq!(
        fields[13].parse::<bool>().unwrap(),
        entry.score.has_purchased
    );
    assert_eq!(fields[14], "2024-02-03T00:00:00Z");
    assert_eq!(fields[15], "e1:12.5|e2:37.5|e3:25.0");
}

#[test]
fn test_zero_data_row_has_empty_tail_fields() {
    let ranked = ranked_fixture();
    let row = rankings_row(&ranked[1]);
    let fields: Vec<&str> = row.split(',').collect();
    assert_eq!(fields[2], "0");
    assert_eq!(fields[3], "25.0");
    assert_eq!(fields[4], "low");
    assert_eq!(fields[14], "");
    assert_eq!(fields[15], "");
}

#[test]
fn test_write_reports_outputs_deterministic_files() {
    let ranked = ranked_fixture();
    let reroll = vec![
        RerollAnalysis {
            account_id: "a1".to_string(),
            email: "first@example.com".to_string(),
            before_percentile: 50.0,
            after_percentile: 45.0,
            events_before_cutoff: 2,
            events_after_cutoff: 2,
            change: -5.0,
            change_type: ChangeType::Stable,
        },
        RerollAnalysis {
            account_id: "a3".to_string(),
            email: "third@example.com".to_string(),
            before_percentile: 60.0,
            after_percentile: 20.0,
            events_before_cutoff: 3,
            events_after_cutoff: 2,
            change: -40.0,
            change_type: ChangeType::Improved,
        },
    ];
    let input = Stage7Input {
        ranked: &ranked,
        reroll: Some(&reroll),
        reroll_cutoff: Some(day(2)),
        n_events: 3,
        n_observations: 3,
        n_excluded: 0,
        sort_criteria: SortCriteria::CompositeScore,
        tool_name: "queuerank".to_string(),
        tool_version: "0.0.0-test".to_string(),
    };

    let out_dir = std::env::temp_dir().join(format!("queuerank-report-{}", std::process::id()));
    write_reports(&input, &out_dir, ReportMode::Account).unwrap();

    let rankings = fs::read_to_string(out_dir.join("rankings.csv")).unwrap();
    let mut lines = rankings.lines();
    assert_eq!(lines.next().unwrap(), RANKINGS_HEADER);
    let data: Vec<&str> = lines.collect();
    assert_eq!(data.len(), 2);
    assert!(data[0].starts_with("1,first@example.com"));

    // Largest absolute shift first.
    let reroll_csv = fs::read_to_string(out_dir.join("reroll.csv")).unwrap();
    let data_lines: Vec<&str> = reroll_csv.lines().skip(1).collect();
    assert!(data_lines[0].starts_with("a3,"));
    assert!(data_lines[1].starts_with("a1,"));

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["n_accounts"], 2);
    assert_eq!(summary["reroll"]["analyzed"], 2);
    assert_eq!(summary["reroll"]["improved"], 1);

    let report = fs::read_to_string(out_dir.join("report.txt")).unwrap();
    assert!(report.contains("Queue Position & Account Trust Report"));

    // Identical inputs must produce byte-identical files.
    let again_dir =
        std::env::temp_dir().join(format!("queuerank-report-again-{}", std::process::id()));
    write_reports(&input, &again_dir, ReportMode::Account).unwrap();
    assert_eq!(
        rankings,
        fs::read_to_string(again_dir.join("rankings.csv")).unwrap()
    );

    fs::remove_dir_all(&out_dir).unwrap();
    fs::remove_dir_all(&again_dir).unwrap();
}

#[test]
fn test_summary_mode_skips_rankings_csv() {
    let ranked = ranked_fixture();
    let input = Stage7Input {
        ranked: &ranked,
        reroll: None,
        reroll_cutoff: None,
        n_events: 3,
        n_observations: 3,
        n_excluded: 0,
        sort_criteria: SortCriteria::Percentile,
        tool_name: "queuerank".to_string(),
        tool_version: "0.0.0-test".to_string(),
    };
    let out_dir = std::env::temp_dir().join(format!("queuerank-summary-{}", std::process::id()));
    write_reports(&input, &out_dir, ReportMode::Summary).unwrap();
    assert!(!out_dir.join("rankings.csv").exists());
    assert!(!out_dir.join("reroll.csv").exists());
    assert!(out_dir.join("summary.json").exists());
    fs::remove_dir_all(&out_dir).unwrap();
}
