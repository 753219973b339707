use chrono::{DateTime, Utc};
use serde::Serialize;

/// Ascending positions of all non-excluded tests for one event. This is the
/// population an account is compared against; excluded positions must never
/// enter it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPositionSet {
    pub positions: Vec<u32>,
}

impl EventPositionSet {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// One account's normalized standing in one event. Immutable once computed.
/// Lower percentile = better standing.
#[derive(Debug, Clone, Serialize)]
pub struct EventPerformance {
    pub event_id: String,
    pub position: u32,
    pub percentile: f64,
    pub total_participants: usize,
    pub tested_at: DateTime<Utc>,
}
