use std::collections::HashSet;
use tracing::{error, info};

use crate::error::{Result, SyncError};
use crate::model::ChampionRecord;

/// Last check before anything is written. Any failure is fatal.
pub struct ValidationGate {
    pub expected_champions: usize,
    pub full_run: bool,
}

impl ValidationGate {
    pub fn check(&self, champions: &[ChampionRecord]) -> Result<()> {
        let names = duplicates(champions.iter().map(|c| c.name.trim().to_uppercase()));
        if !names.is_empty() {
            error!(duplicates = ?names, "duplicate champion names");
            return Err(SyncError::DuplicateNames(names));
        }

        let ids = duplicates(champions.iter().map(|c| c.id.clone()));
        if !ids.is_empty() {
            error!(duplicates = ?ids, "duplicate champion ids");
            return Err(SyncError::DuplicateIds(ids));
        }

        if self.full_run && champions.len() < self.expected_champions {
            error!(found = champions.len(), expected = self.expected_champions, "champion count below expected");
            return Err(SyncError::RosterTooSmall {
                found: champions.len(),
                expected: self.expected_champions,
            });
        }

        info!(champions = champions.len(), "validation passed");
        Ok(())
    }
}

fn duplicates(keys: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut dupes = Vec::new();
    for key in keys {
        if !seen.insert(key.clone()) && !dupes.contains(&key) {
            dupes.push(key);
        }
    }
    dupes
}
