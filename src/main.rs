mod input;
mod model;
mod pipeline;
mod report;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::input::accounts::resolve_profiles;
use crate::input::load_input;
use crate::model::criteria::SortCriteria;
use crate::model::weights::{RerollParams, ScoreWeights, ScoringParams};
use crate::pipeline::stage2_positions::run_stage2;
use crate::pipeline::stage3_percentiles::run_stage3;
use crate::pipeline::stage4_scores::run_stage4;
use crate::pipeline::stage5_rank::{rank, sort_ranked};
use crate::pipeline::stage6_reroll::run_stage6;
use crate::pipeline::stage7_report::{ReportMode, Stage7Input, write_reports};

#[derive(Debug, Parser)]
#[command(
    name = "queuerank",
    version,
    about = "Queue-position percentile and account trust ranking from recorded queue tests"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Score and rank accounts from recorded queue tests
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Directory containing observations.json (and optional accounts.json)
    #[arg(long)]
    input: PathBuf,

    /// Output directory for reports
    #[arg(long)]
    out: PathBuf,

    /// Report granularity: account | summary
    #[arg(long, default_value = "account")]
    mode: String,

    /// Row-order criterion for rankings.csv; unknown names fall back to
    /// percentile
    #[arg(long, default_value = "composite")]
    sort: String,

    /// Flip the criterion's better-first direction
    #[arg(long)]
    reverse: bool,

    /// Queue tests counted as recent per account
    #[arg(long, default_value_t = ScoringParams::default_v1().recent_event_count)]
    recent_events: usize,

    /// Event count at which the coverage signal saturates
    #[arg(long, default_value_t = ScoringParams::default_v1().max_events_for_norm)]
    max_events_norm: usize,

    /// JSON file overriding the default score weights
    #[arg(long)]
    weights: Option<PathBuf>,

    /// RFC3339 cutoff; enables the reroll report
    #[arg(long)]
    reroll_cutoff: Option<String>,

    /// Minimum tests required on each side of the cutoff
    #[arg(long, default_value_t = RerollParams::default_v1().min_events_each_side)]
    min_events_each_side: usize,

    /// Absolute percentile change counted as significant
    #[arg(long, default_value_t = RerollParams::default_v1().significant_change_threshold)]
    change_threshold: f64,
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<(), String> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run_scoring(&args),
    }
}

fn run_scoring(args: &RunArgs) -> Result<(), String> {
    let mode = parse_mode(&args.mode)?;
    let criteria = SortCriteria::parse(&args.sort);
    let ascending = criteria.better_first_ascending() != args.reverse;
    let cutoff = args
        .reroll_cutoff
        .as_deref()
        .map(parse_cutoff)
        .transpose()?;

    let weights = match &args.weights {
        Some(path) => load_weights(path)?,
        None => ScoreWeights::default_v1(),
    };
    let params = ScoringParams {
        weights,
        recent_event_count: args.recent_events,
        max_events_for_norm: args.max_events_norm,
    };
    // Fatal at configuration time; scoring itself never fails.
    params.validate().map_err(|e| e.to_string())?;
    let reroll_params = RerollParams {
        min_events_each_side: args.min_events_each_side,
        significant_change_threshold: args.change_threshold,
    };

    let bundle = load_input(&args.input).map_err(|e| e.to_string())?;

    let stage2 = run_stage2(&bundle.observations);
    let performances = run_stage3(&stage2.active, &stage2.sets);
    let profiles = resolve_profiles(&bundle.accounts, &bundle.observations);
    let scores = run_stage4(&profiles, performances, &params);

    let reroll = cutoff.map(|c| run_stage6(&scores, c, &reroll_params));

    let mut ranked = rank(scores);
    let canonical = criteria == SortCriteria::CompositeScore && !ascending;
    if !canonical {
        ranked = sort_ranked(ranked, criteria, ascending);
    }

    let stage7 = Stage7Input {
        ranked: &ranked,
        reroll: reroll.as_deref(),
        reroll_cutoff: cutoff,
        n_events: bundle.n_events,
        n_observations: bundle.observations.len(),
        n_excluded: stage2.n_excluded,
        sort_criteria: criteria,
        tool_name: "queuerank".to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
    };
    write_reports(&stage7, &args.out, mode).map_err(|e| e.to_string())?;

    Ok(())
}

fn parse_mode(s: &str) -> Result<ReportMode, String> {
    match s {
        "account" => Ok(ReportMode::Account),
        "summary" => Ok(ReportMode::Summary),
        _ => Err("invalid --mode (use account|summary)".to_string()),
    }
}

fn parse_cutoff(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid --reroll-cutoff: {e}"))
}

fn load_weights(path: &Path) -> Result<ScoreWeights, String> {
    let text =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read weights file: {e}"))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid weights file: {e}"))
}
