use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::info;

use crate::model::criteria::SortCriteria;
use crate::model::reroll::RerollAnalysis;
use crate::model::score::{AccountScore, Confidence};
use crate::pipeline::stage5_rank::RankedAccount;
use crate::report::text::render_report_text;
use crate::report::{
    ConfidenceCounts, ReportContext, RerollSummary, SummaryData, TopAccount, bool_fraction,
    dist_stats, format_f1,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    Account,
    Summary,
}

#[derive(Debug, Clone)]
pub struct Stage7Input<'a> {
    pub ranked: &'a [RankedAccount],
    pub reroll: Option<&'a [RerollAnalysis]>,
    pub reroll_cutoff: Option<DateTime<Utc>>,

    pub n_events: usize,
    pub n_observations: usize,
    pub n_excluded: usize,
    pub sort_criteria: SortCriteria,

    pub tool_name: String,
    pub tool_version: String,
}

pub fn write_reports(
    input: &Stage7Input<'_>,
    out_dir: &Path,
    mode: ReportMode,
) -> std::io::Result<()> {
    fs::create_dir_all(out_dir)?;

    if mode == ReportMode::Account {
        let rankings_path = out_dir.join("rankings.csv");
        write_rankings_csv(input.ranked, &rankings_path)?;
        info!("wrote {}", rankings_path.display());
    }

    let summary_path = out_dir.join("summary.json");
    let summary = build_summary(input);
    let json = serde_json::to_string_pretty(&summary)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    write_text(&summary_path, &json)?;
    info!("wrote {}", summary_path.display());

    let report_path = out_dir.join("report.txt");
    let report_ctx = build_report_context(input, &summary);
    write_text(&report_path, &render_report_text(&report_ctx))?;
    info!("wrote {}", report_path.display());

    if let Some(reroll) = input.reroll {
        let reroll_path = out_dir.join("reroll.csv");
        write_reroll_csv(reroll, &reroll_path)?;
        info!("wrote {}", reroll_path.display());
    }

    Ok(())
}

pub const RANKINGS_HEADER: &str = "rank,email,events_entered,composite_score,confidence,\
avg_percentile,weighted_percentile,best_percentile,worst_percentile,percentile_range,\
consistency_score,recent_avg_percentile,improvement_score,has_purchased,last_tested_at,\
performances";

fn write_rankings_csv(ranked: &[RankedAccount], path: &Path) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "{}", RANKINGS_HEADER)?;
    for entry in ranked {
        writeln!(w, "{}", rankings_row(entry))?;
    }
    Ok(())
}

pub fn rankings_row(entry: &RankedAccount) -> String {
    let score = &entry.score;
    [
        entry.rank.to_string(),
        score.email.clone(),
        score.events_entered.to_string(),
        format_f1(score.breakdown.composite_score),
        score.breakdown.confidence.label().to_string(),
        format_f1(score.avg_percentile),
        format_f1(score.weighted_percentile),
        format_f1(score.best_percentile),
        format_f1(score.worst_percentile),
        format_f1(score.percentile_range),
        format_f1(score.consistency_score),
        format_f1(score.recent_avg_percentile),
        format_f1(score.improvement_score),
        score.has_purchased.to_string(),
        score
            .last_tested_at
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default(),
        performances_summary(score),
    ]
    .join(",")
}

/// `eventId:percentile` pairs joined with `|`, in the account's own
/// performance order.
fn performances_summary(score: &AccountScore) -> String {
    score
        .performances
        .iter()
        .map(|p| format!("{}:{}", p.event_id, format_f1(p.percentile)))
        .collect::<Vec<_>>()
        .join("|")
}

fn write_reroll_csv(reroll: &[RerollAnalysis], path: &Path) -> std::io::Result<()> {
    // Presentation order: largest absolute shift first, stable ties.
    let mut rows: Vec<&RerollAnalysis> = reroll.iter().collect();
    rows.sort_by(|a, b| b.change.abs().total_cmp(&a.change.abs()));

    let mut w = BufWriter::new(File::create(path)?);
    writeln!(
        w,
        "account_id,email,events_before,events_after,before_percentile,after_percentile,change,change_type"
    )?;
    for row in rows {
        writeln!(
            w,
            "{},{},{},{},{},{},{},{}",
            row.account_id,
            row.email,
            row.events_before_cutoff,
            row.events_after_cutoff,
            format_f1(row.before_percentile),
            format_f1(row.after_percentile),
            format_f1(row.change),
            row.change_type.label()
        )?;
    }
    Ok(())
}

fn build_summary(input: &Stage7Input<'_>) -> SummaryData {
    let composites: Vec<f64> = input
        .ranked
        .iter()
        .map(|r| r.score.breakdown.composite_score)
        .collect();
    let avg_percentiles: Vec<f64> = input
        .ranked
        .iter()
        .map(|r| r.score.avg_percentile)
        .collect();
    let purchased: Vec<bool> = input.ranked.iter().map(|r| r.score.has_purchased).collect();

    let mut confidence = ConfidenceCounts {
        low: 0,
        medium: 0,
        high: 0,
    };
    for entry in input.ranked {
        match entry.score.breakdown.confidence {
            Confidence::Low => confidence.low += 1,
            Confidence::Medium => confidence.medium += 1,
            Confidence::High => confidence.high += 1,
        }
    }

    let reroll = input.reroll.map(|analyses| {
        let mut summary = RerollSummary {
            cutoff: input
                .reroll_cutoff
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_default(),
            analyzed: analyses.len(),
            improved: 0,
            declined: 0,
            stable: 0,
        };
        for analysis in analyses {
            match analysis.change_type {
                crate::model::reroll::ChangeType::Improved => summary.improved += 1,
                crate::model::reroll::ChangeType::Declined => summary.declined += 1,
                crate::model::reroll::ChangeType::Stable => summary.stable += 1,
            }
        }
        summary
    });

    SummaryData {
        tool_name: input.tool_name.clone(),
        tool_version: input.tool_version.clone(),
        n_accounts: input.ranked.len(),
        n_events: input.n_events,
        n_observations: input.n_observations,
        n_excluded: input.n_excluded,
        sort_criteria: input.sort_criteria.label().to_string(),
        composite: dist_stats(&composites),
        avg_percentile: dist_stats(&avg_percentiles),
        confidence,
        purchased_fraction: bool_fraction(&purchased),
        reroll,
    }
}

fn build_report_context(input: &Stage7Input<'_>, summary: &SummaryData) -> ReportContext {
    let top = input
        .ranked
        .iter()
        .take(5)
        .map(|entry| TopAccount {
            rank: entry.rank,
            email: entry.score.email.clone(),
            composite_score: entry.score.breakdown.composite_score,
            avg_percentile: entry.score.avg_percentile,
        })
        .collect();

    ReportContext {
        n_accounts: summary.n_accounts,
        n_events: summary.n_events,
        n_observations: summary.n_observations,
        n_excluded: summary.n_excluded,
        composite_median: summary.composite.median,
        avg_percentile_median: summary.avg_percentile.median,
        confidence: summary.confidence.clone(),
        purchased_fraction: summary.purchased_fraction,
        sort_label: summary.sort_criteria.clone(),
        top,
        reroll: summary.reroll.clone(),
    }
}

fn write_text(path: &Path, content: &str) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(content.as_bytes())?;
    if !content.ends_with('\n') {
        w.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage7_report.rs"]
mod tests;
