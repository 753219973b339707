use serde::Serialize;

pub mod text;

#[derive(Debug, Clone, Serialize)]
pub struct DistStats {
    pub median: f64,
    pub p90: f64,
    pub p99: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfidenceCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RerollSummary {
    pub cutoff: String,
    pub analyzed: usize,
    pub improved: usize,
    pub declined: usize,
    pub stable: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub tool_name: String,
    pub tool_version: String,
    pub n_accounts: usize,
    pub n_events: usize,
    pub n_observations: usize,
    pub n_excluded: usize,
    pub sort_criteria: String,
    pub composite: DistStats,
    pub avg_percentile: DistStats,
    pub confidence: ConfidenceCounts,
    pub purchased_fraction: f64,
    pub reroll: Option<RerollSummary>,
}

#[derive(Debug, Clone)]
pub struct TopAccount {
    pub rank: usize,
    pub email: String,
    pub composite_score: f64,
    pub avg_percentile: f64,
}

#[derive(Debug, Clone)]
pub struct ReportContext {
    pub n_accounts: usize,
    pub n_events: usize,
    pub n_observations: usize,
    pub n_excluded: usize,
    pub composite_median: f64,
    pub avg_percentile_median: f64,
    pub confidence: ConfidenceCounts,
    pub purchased_fraction: f64,
    pub sort_label: String,
    pub top: Vec<TopAccount>,
    pub reroll: Option<RerollSummary>,
}

pub fn format_f1(v: f64) -> String {
    format!("{:.1}", v)
}

pub fn quantile_indexed(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    let idx = ((n - 1) as f64 * p).ceil() as usize;
    sorted[idx]
}

pub fn median(values: &[f64]) -> f64 {
    quantile_indexed(values, 0.5)
}

pub fn p90(values: &[f64]) -> f64 {
    quantile_indexed(values, 0.90)
}

pub fn p99(values: &[f64]) -> f64 {
    quantile_indexed(values, 0.99)
}

pub fn dist_stats(values: &[f64]) -> DistStats {
    DistStats {
        median: median(values),
        p90: p90(values),
        p99: p99(values),
    }
}

pub fn bool_fraction(values: &[bool]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let count = values.iter().filter(|&&v| v).count();
    count as f64 / values.len() as f64
}
