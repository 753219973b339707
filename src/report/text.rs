use crate::report::{ReportContext, format_f1};

pub fn render_report_text(ctx: &ReportContext) -> String {
    let mut out = String::new();

    out.push_str("Queue Position & Account Trust Report\n");
    out.push_str("=====================================\n\n");

    out.push_str("1. Population\n");
    out.push_str(&format!("Accounts scored: {}\n", ctx.n_accounts));
    out.push_str(&format!("Events observed: {}\n", ctx.n_events));
    out.push_str(&format!(
        "Queue tests: {} ({} excluded by moderation)\n\n",
        ctx.n_observations, ctx.n_excluded
    ));

    out.push_str("2. Composite trust\n");
    out.push_str(&format!(
        "Composite median: {}\n",
        format_f1(ctx.composite_median)
    ));
    out.push_str(&format!(
        "Average percentile median: {}\n",
        format_f1(ctx.avg_percentile_median)
    ));
    out.push_str(&format!(
        "Purchase-verified fraction: {}\n",
        format_f1(ctx.purchased_fraction * 100.0)
    ));
    out.push_str(&format!("{}\n\n", trust_statement(ctx.composite_median)));

    out.push_str("3. Confidence\n");
    out.push_str(&format!(
        "low: {}, medium: {}, high: {}\n",
        ctx.confidence.low, ctx.confidence.medium, ctx.confidence.high
    ));
    out.push_str(&format!(
        "{}\n\n",
        coverage_statement(ctx.confidence.high, ctx.n_accounts)
    ));

    out.push_str(&format!("4. Top accounts (by {})\n", ctx.sort_label));
    for account in &ctx.top {
        out.push_str(&format!(
            "{:>3}. {} (composite {}, avg percentile {})\n",
            account.rank,
            account.email,
            format_f1(account.composite_score),
            format_f1(account.avg_percentile)
        ));
    }
    out.push('\n');

    if let Some(reroll) = &ctx.reroll {
        out.push_str("5. Reroll analysis\n");
        out.push_str(&format!("Cutoff: {}\n", reroll.cutoff));
        out.push_str(&format!(
            "Analyzed {}: improved {}, declined {}, stable {}\n",
            reroll.analyzed, reroll.improved, reroll.declined, reroll.stable
        ));
        out.push_str(&format!(
            "{}\n",
            reroll_statement(reroll.improved, reroll.declined, reroll.analyzed)
        ));
    }

    out
}

fn trust_statement(composite_median: f64) -> &'static str {
    if composite_median >= 70.0 {
        "Population trust signal is high."
    } else if composite_median >= 40.0 {
        "Population trust signal is moderate."
    } else {
        "Population trust signal is low."
    }
}

fn coverage_statement(high: usize, total: usize) -> &'static str {
    if total == 0 {
        "No accounts scored."
    } else if high * 2 >= total {
        "Most scores rest on four or more queue tests."
    } else {
        "Many scores rest on sparse queue data; collect more tests before acting on ranks."
    }
}

fn reroll_statement(improved: usize, declined: usize, analyzed: usize) -> &'static str {
    if analyzed == 0 {
        "No account had enough tests on both sides of the cutoff."
    } else if improved > declined {
        "Standing shifted toward better positions after the cutoff."
    } else if declined > improved {
        "Standing shifted toward worse positions after the cutoff."
    } else {
        "No net shift in standing around the cutoff."
    }
}
