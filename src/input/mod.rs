use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

pub mod accounts;
pub mod observations;

use accounts::{AccountRecord, parse_accounts};
use observations::parse_observations;

use crate::model::observation::PositionObservation;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("parse error: {0}")]
    Parse(String),
}

#[derive(Debug)]
pub struct InputBundle {
    pub observations: Vec<PositionObservation>,
    pub accounts: Vec<AccountRecord>,
    pub n_events: usize,
}

pub fn load_input(input_dir: &Path) -> Result<InputBundle, InputError> {
    let observations_path = find_observations_path(input_dir)?;
    let accounts_path = find_accounts_path(input_dir);

    info!(
        "discovered input files: observations={}, accounts={}",
        observations_path.display(),
        accounts_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string())
    );

    let observations = parse_observations(&fs::read_to_string(&observations_path)?)?;
    let accounts = match &accounts_path {
        Some(path) => parse_accounts(&fs::read_to_string(path)?)?,
        None => Vec::new(),
    };

    let mut account_ids: BTreeSet<&str> = observations
        .iter()
        .map(|o| o.account_id.as_str())
        .collect();
    account_ids.extend(accounts.iter().map(|a| a.account_id.as_str()));
    let n_events = observations
        .iter()
        .map(|o| o.event_id.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    info!(
        "loaded {} observations across {} events for {} accounts",
        observations.len(),
        n_events,
        account_ids.len()
    );

    Ok(InputBundle {
        observations,
        accounts,
        n_events,
    })
}

fn find_observations_path(input_dir: &Path) -> Result<PathBuf, InputError> {
    let candidates = ["observations.json", "queue_tests.json"];
    for name in candidates {
        let path = input_dir.join(name);
        if path.exists() {
            return Ok(path);
        }
    }
    Err(InputError::MissingInput(
        "missing observations.json or queue_tests.json".to_string(),
    ))
}

fn find_accounts_path(input_dir: &Path) -> Option<PathBuf> {
    let path = input_dir.join("accounts.json");
    if path.exists() { Some(path) } else { None }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
