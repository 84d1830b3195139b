//! Roster merge rules, written as reducers over owned snapshots so each
//! precedence rule can be tested on its own.

use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{info, warn};

use crate::config::RosterEntry;
use crate::error::{Result, SyncError};
use crate::homepage::HomepageIndex;
use crate::model::{champion_id, ChampionRecord, CounterPair, DetailData, Role, TierListEntry};

/// Role used when neither the tier list nor role tags say anything.
pub const FALLBACK_ROLE: Role = Role::Mid;

/// Detail-page role tag -> lane.
pub const TAG_ROLES: &[(&str, Role)] = &[
    ("marksman", Role::Dragon),
    ("mage", Role::Mid),
    ("assassin", Role::Mid),
    ("tank", Role::Baron),
    ("fighter", Role::Baron),
    ("support", Role::Support),
];

pub const COUNTER_CATEGORY: &str = "extreme";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub champions: Vec<ChampionRecord>,
    pub from_tier_list: usize,
    pub filled_from_homepage: usize,
    /// Roster names found in neither the tier list nor the homepage.
    pub unresolved: Vec<String>,
}

// ============================================================================
// Tier list
// ============================================================================

fn record_from_entry(entry: &TierListEntry) -> ChampionRecord {
    ChampionRecord {
        id: entry.id.clone(),
        name: entry.name.clone(),
        detail_page_url: entry.detail_page_url.clone(),
        roles: BTreeSet::from([entry.role]),
        tier: entry.tier.clone(),
        winrate: entry.winrate,
        ban_rate: entry.ban_rate,
        pick_rate: 0.0,
        icon_url: entry.icon_url.clone(),
        role_tags: BTreeSet::new(),
        extreme_threats: Vec::new(),
        extreme_synergies: Vec::new(),
        is_scraped: false,
    }
}

/// Fold one tier-list entry into the roster: roles accumulate, and the entry
/// with the strictly highest winrate owns tier/winrate/banRate.
pub fn apply_tier_entry(mut roster: Vec<ChampionRecord>, entry: &TierListEntry) -> Vec<ChampionRecord> {
    match roster.iter_mut().find(|c| c.id == entry.id) {
        Some(existing) => {
            existing.roles.insert(entry.role);
            if entry.winrate > existing.winrate {
                existing.tier = entry.tier.clone();
                existing.winrate = entry.winrate;
                existing.ban_rate = entry.ban_rate;
            }
        }
        None => roster.push(record_from_entry(entry)),
    }
    roster
}

pub fn reduce_tier_entries(prior: Vec<ChampionRecord>, entries: &[TierListEntry]) -> Vec<ChampionRecord> {
    entries.iter().fold(prior, apply_tier_entry)
}

// ============================================================================
// Homepage fallback
// ============================================================================

/// Add roster champions the tier list missed, using homepage URLs.
/// Returns the grown roster and the names that could not be resolved.
pub fn fill_from_homepage(
    mut roster: Vec<ChampionRecord>,
    expected: &[RosterEntry],
    homepage: &HomepageIndex,
) -> (Vec<ChampionRecord>, Vec<String>) {
    let mut present: HashSet<String> = roster.iter().map(|c| c.id.clone()).collect();
    let mut unresolved = Vec::new();

    for entry in expected {
        let id = champion_id(&entry.name);
        if present.contains(&id) {
            continue;
        }
        let url = homepage
            .get(&entry.name)
            .or_else(|| homepage.find_by_slug(&entry.slug));
        match url {
            Some(url) => {
                roster.push(ChampionRecord::untiered(&entry.name, url));
                present.insert(id);
            }
            None => {
                warn!(champion = entry.name.as_str(), "no URL found for missing champion");
                unresolved.push(entry.name.clone());
            }
        }
    }
    (roster, unresolved)
}

/// Build the unified roster from the three sources.
pub fn reconcile(
    entries: &[TierListEntry],
    expected: &[RosterEntry],
    homepage: &HomepageIndex,
) -> Reconciliation {
    let from_tiers = reduce_tier_entries(Vec::new(), entries);
    let from_tier_list = from_tiers.len();
    info!(count = from_tier_list, "champions from tier list");

    let (champions, unresolved) = fill_from_homepage(from_tiers, expected, homepage);
    let filled_from_homepage = champions.len() - from_tier_list;
    info!(
        total = champions.len(),
        from_tier_list,
        filled_from_homepage,
        unresolved = unresolved.len(),
        "unified roster"
    );

    Reconciliation {
        champions,
        from_tier_list,
        filled_from_homepage,
        unresolved,
    }
}

/// Full runs must reach the expected roster size.
pub fn check_roster_size(found: usize, expected: usize, full_run: bool) -> Result<()> {
    if full_run && found < expected {
        return Err(SyncError::RosterTooSmall { found, expected });
    }
    Ok(())
}

// ============================================================================
// Detail merge
// ============================================================================

pub fn infer_roles<'a>(tags: impl IntoIterator<Item = &'a String>) -> BTreeSet<Role> {
    tags.into_iter()
        .filter_map(|tag| {
            TAG_ROLES
                .iter()
                .find(|(t, _)| *t == tag.as_str())
                .map(|(_, role)| *role)
        })
        .collect()
}

/// Fold one champion's detail data into its reconciled record.
pub fn apply_detail(mut record: ChampionRecord, detail: Option<&DetailData>) -> ChampionRecord {
    if let Some(d) = detail {
        if let Some(name) = d.name.as_deref().filter(|n| !n.trim().is_empty()) {
            record.name = name.trim().to_string();
        }
        if record.winrate == 0.0 {
            record.winrate = d.winrate;
        }
        if record.ban_rate == 0.0 {
            record.ban_rate = d.ban_rate;
        }
        record.pick_rate = d.pick_rate;
        record.role_tags = d.role_tags.clone();
        record.extreme_threats = d.extreme_threats.clone();
        record.extreme_synergies = d.extreme_synergies.clone();
        record.is_scraped = true;
    }

    if record.roles.is_empty() {
        record.roles = infer_roles(&record.role_tags);
    }
    if record.roles.is_empty() {
        record.roles.insert(FALLBACK_ROLE);
    }
    record
}

/// Merge detail data (keyed by champion id) into the roster, preserving order.
pub fn merge_details(roster: Vec<ChampionRecord>, details: &HashMap<String, DetailData>) -> Vec<ChampionRecord> {
    roster
        .into_iter()
        .map(|record| {
            let detail = details.get(&record.id);
            apply_detail(record, detail)
        })
        .collect()
}

/// Directed "extreme threat" pairs whose threat is also in the roster.
pub fn counter_pairs(champions: &[ChampionRecord]) -> Vec<CounterPair> {
    let ids: HashSet<&str> = champions.iter().map(|c| c.id.as_str()).collect();
    champions
        .iter()
        .flat_map(|champ| {
            champ.extreme_threats.iter().filter_map(|threat| {
                let threat_id = champion_id(threat);
                ids.contains(threat_id.as_str()).then(|| CounterPair {
                    champion_id: champ.id.clone(),
                    threat_id,
                    category: COUNTER_CATEGORY.to_string(),
                })
            })
        })
        .collect()
}
