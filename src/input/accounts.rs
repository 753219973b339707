use std::collections::BTreeMap;

use serde::Deserialize;

use crate::input::InputError;
use crate::model::observation::PositionObservation;

/// One row of the optional accounts side file.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountRecord {
    pub account_id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub has_purchased: bool,
}

/// Caller-side identity + purchase flag for one account.
#[derive(Debug, Clone)]
pub struct AccountProfile {
    pub email: String,
    pub has_purchased: bool,
}

pub fn parse_accounts(text: &str) -> Result<Vec<AccountRecord>, InputError> {
    let records: Vec<AccountRecord> =
        serde_json::from_str(text).map_err(|e| InputError::Parse(e.to_string()))?;
    for (idx, record) in records.iter().enumerate() {
        if record.account_id.is_empty() {
            return Err(InputError::InvalidInput(format!(
                "account record {} has an empty account id",
                idx
            )));
        }
    }
    Ok(records)
}

/// Union of side-file accounts and every account seen in the observations
/// (excluded tests included, so fully-moderated accounts still score as
/// zero-data baselines). Accounts without a side-file row self-identify by
/// account id and carry no purchase.
pub fn resolve_profiles(
    records: &[AccountRecord],
    observations: &[PositionObservation],
) -> BTreeMap<String, AccountProfile> {
    let mut profiles: BTreeMap<String, AccountProfile> = BTreeMap::new();
    for record in records {
        profiles.insert(
            record.account_id.clone(),
            AccountProfile {
                email: record
                    .email
                    .clone()
                    .unwrap_or_else(|| record.account_id.clone()),
                has_purchased: record.has_purchased,
            },
        );
    }
    for obs in observations {
        profiles
            .entry(obs.account_id.clone())
            .or_insert_with(|| AccountProfile {
                email: obs.account_id.clone(),
                has_purchased: false,
            });
    }
    profiles
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/accounts.rs"]
mod tests;
