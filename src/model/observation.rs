use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One recorded queue test: where an account landed in one event's queue.
/// `excluded` is set by moderation outside this engine and is never mutated
/// here; excluded tests are removed from every population and account list.
#[derive(Debug, Clone, Deserialize)]
pub struct PositionObservation {
    pub account_id: String,
    pub event_id: String,
    pub position: u32,
    pub tested_at: DateTime<Utc>,
    #[serde(default)]
    pub excluded: bool,
}
