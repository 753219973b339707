use crate::input::InputError;
use crate::model::observation::PositionObservation;

pub fn parse_observations(text: &str) -> Result<Vec<PositionObservation>, InputError> {
    let observations: Vec<PositionObservation> =
        serde_json::from_str(text).map_err(|e| InputError::Parse(e.to_string()))?;
    for (idx, obs) in observations.iter().enumerate() {
        if obs.position == 0 {
            return Err(InputError::InvalidInput(format!(
                "observation {} for account {} has position 0; positions start at 1",
                idx, obs.account_id
            )));
        }
        if obs.account_id.is_empty() || obs.event_id.is_empty() {
            return Err(InputError::InvalidInput(format!(
                "observation {} has an empty account or event id",
                idx
            )));
        }
    }
    Ok(observations)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/observations.rs"]
mod tests;
