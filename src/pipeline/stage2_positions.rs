use std::collections::BTreeMap;

use crate::model::observation::PositionObservation;
use crate::model::performance::EventPositionSet;

#[derive(Debug)]
pub struct Stage2Output {
    /// Per-event comparison populations, ascending, excluded tests removed.
    pub sets: BTreeMap<String, EventPositionSet>,
    /// Non-excluded observations in their original order.
    pub active: Vec<PositionObservation>,
    pub n_excluded: usize,
}

pub fn run_stage2(observations: &[PositionObservation]) -> Stage2Output {
    let mut sets: BTreeMap<String, Vec<u32>> = BTreeMap::new();
    let mut active = Vec::with_capacity(observations.len());
    let mut n_excluded = 0usize;

    for obs in observations {
        if obs.excluded {
            n_excluded += 1;
            continue;
        }
        sets.entry(obs.event_id.clone())
            .or_default()
            .push(obs.position);
        active.push(obs.clone());
    }

    let sets = sets
        .into_iter()
        .map(|(event_id, mut positions)| {
            positions.sort_unstable();
            (event_id, EventPositionSet { positions })
        })
        .collect();

    Stage2Output {
        sets,
        active,
        n_excluded,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_positions.rs"]
mod tests;
