use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Improved,
    Declined,
    Stable,
}

impl ChangeType {
    pub fn label(&self) -> &'static str {
        match self {
            ChangeType::Improved => "improved",
            ChangeType::Declined => "declined",
            ChangeType::Stable => "stable",
        }
    }
}

/// Before/after comparison of one account's mean percentile around a reroll
/// cutoff. Accounts with too little data on either side are absent from the
/// report rather than carried with a sentinel.
#[derive(Debug, Clone, Serialize)]
pub struct RerollAnalysis {
    pub account_id: String,
    pub email: String,
    pub before_percentile: f64,
    pub after_percentile: f64,
    pub events_before_cutoff: usize,
    pub events_after_cutoff: usize,
    pub change: f64,
    pub change_type: ChangeType,
}
