use std::collections::BTreeMap;

use crate::model::observation::PositionObservation;
use crate::model::performance::{EventPerformance, EventPositionSet};
use crate::model::score::round1;

/// Normalized rank of one position within an event's full population.
///
/// Counts every entry at or better than `position` (ties counted fully), so
/// an account tied with others at the same position gets the same inclusive
/// count. Lower-is-better positions yield low percentiles for top
/// performers: position 10 as the single best of 1000 scores 0.1. An empty
/// population scores 0; a single-element population scores 100 (the entry is
/// trivially its own worst).
pub fn percentile(position: u32, all_positions: &[u32]) -> f64 {
    if all_positions.is_empty() {
        return 0.0;
    }
    // `all_positions` is ascending, so the partition point is the count of
    // entries <= position.
    let at_or_better = all_positions.partition_point(|&p| p <= position);
    let pct = at_or_better as f64 / all_positions.len() as f64 * 100.0;
    pct.clamp(0.0, 100.0)
}

/// Joins each account's observations against the per-event populations,
/// yielding one `EventPerformance` per observation. An event missing from
/// `sets` is treated as a single-participant population of just this
/// position, never a failure.
pub fn run_stage3(
    observations: &[PositionObservation],
    sets: &BTreeMap<String, EventPositionSet>,
) -> BTreeMap<String, Vec<EventPerformance>> {
    let mut by_account: BTreeMap<String, Vec<EventPerformance>> = BTreeMap::new();

    for obs in observations {
        let (pct, total) = match sets.get(&obs.event_id) {
            Some(set) if !set.is_empty() => (percentile(obs.position, &set.positions), set.len()),
            _ => (percentile(obs.position, &[obs.position]), 1),
        };
        by_account
            .entry(obs.account_id.clone())
            .or_default()
            .push(EventPerformance {
                event_id: obs.event_id.clone(),
                position: obs.position,
                percentile: round1(pct),
                total_participants: total,
                tested_at: obs.tested_at,
            });
    }

    by_account
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_percentiles.rs"]
mod tests;
