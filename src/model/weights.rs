use serde::Deserialize;
use thiserror::Error;

pub const WEIGHT_SUM_EPSILON: f64 = 1e-6;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("score weights must sum to 1.0, got {sum}")]
    WeightSum { sum: f64 },
    #[error("score weight {name} must be >= 0, got {value}")]
    NegativeWeight { name: &'static str, value: f64 },
    #[error("recent event count must be >= 1")]
    RecentEventCount,
    #[error("max events for normalization must be >= 1")]
    MaxEventsForNorm,
}

/// Blend weights for the five composite signals. A configuration value, not
/// account state: constructed once, validated once, passed by reference.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScoreWeights {
    pub percentile: f64,
    pub consistency: f64,
    pub recent_performance: f64,
    pub event_coverage: f64,
    pub purchase_success: f64,
}

impl ScoreWeights {
    pub fn default_v1() -> Self {
        Self {
            percentile: 0.40,
            consistency: 0.25,
            recent_performance: 0.15,
            event_coverage: 0.10,
            purchase_success: 0.10,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("percentile", self.percentile),
            ("consistency", self.consistency),
            ("recent_performance", self.recent_performance),
            ("event_coverage", self.event_coverage),
            ("purchase_success", self.purchase_success),
        ] {
            if value < 0.0 {
                return Err(ConfigError::NegativeWeight { name, value });
            }
        }
        let sum = self.percentile
            + self.consistency
            + self.recent_performance
            + self.event_coverage
            + self.purchase_success;
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(ConfigError::WeightSum { sum });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ScoringParams {
    pub weights: ScoreWeights,
    pub recent_event_count: usize,
    pub max_events_for_norm: usize,
}

impl ScoringParams {
    pub fn default_v1() -> Self {
        Self {
            weights: ScoreWeights::default_v1(),
            recent_event_count: 3,
            max_events_for_norm: 10,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        if self.recent_event_count == 0 {
            return Err(ConfigError::RecentEventCount);
        }
        if self.max_events_for_norm == 0 {
            return Err(ConfigError::MaxEventsForNorm);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RerollParams {
    pub min_events_each_side: usize,
    pub significant_change_threshold: f64,
}

impl RerollParams {
    pub fn default_v1() -> Self {
        Self {
            min_events_each_side: 2,
            significant_change_threshold: 10.0,
        }
    }
}
