use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// Roles
// ============================================================================

/// The five lanes of the draft board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Baron,
    Jungle,
    Mid,
    Dragon,
    Support,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Baron => "baron",
            Role::Jungle => "jungle",
            Role::Mid => "mid",
            Role::Dragon => "dragon",
            Role::Support => "support",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Records
// ============================================================================

/// One champion in the synced roster. Field names follow the artifact schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionRecord {
    pub id: String,
    pub name: String,
    #[serde(alias = "pageUrl")]
    pub detail_page_url: String,
    #[serde(default)]
    pub roles: BTreeSet<Role>,
    #[serde(default)]
    pub tier: String,
    #[serde(default)]
    pub winrate: f64,
    #[serde(default)]
    pub ban_rate: f64,
    #[serde(default)]
    pub pick_rate: f64,
    #[serde(default)]
    pub icon_url: String,
    #[serde(default)]
    pub role_tags: BTreeSet<String>,
    #[serde(default)]
    pub extreme_threats: Vec<String>,
    #[serde(default)]
    pub extreme_synergies: Vec<String>,
    #[serde(default)]
    pub is_scraped: bool,
}

impl ChampionRecord {
    /// A bare record with no stats, as synthesized for champions missing from the tier list.
    pub fn untiered(name: &str, detail_page_url: &str) -> Self {
        Self {
            id: champion_id(name),
            name: name.to_string(),
            detail_page_url: detail_page_url.to_string(),
            roles: BTreeSet::new(),
            tier: DEFAULT_TIER.to_string(),
            winrate: 0.0,
            ban_rate: 0.0,
            pick_rate: 0.0,
            icon_url: String::new(),
            role_tags: BTreeSet::new(),
            extreme_threats: Vec::new(),
            extreme_synergies: Vec::new(),
            is_scraped: false,
        }
    }
}

/// Tier given to champions that only the homepage knows about.
pub const DEFAULT_TIER: &str = "B";

/// One champion card seen under one role tab. Lives for a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct TierListEntry {
    pub id: String,
    pub name: String,
    pub detail_page_url: String,
    pub role: Role,
    pub tier: String,
    pub winrate: f64,
    pub ban_rate: f64,
    pub icon_url: String,
}

/// Fields harvested from a champion's own page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailData {
    pub name: Option<String>,
    pub winrate: f64,
    pub ban_rate: f64,
    pub pick_rate: f64,
    pub role_tags: BTreeSet<String>,
    pub extreme_threats: Vec<String>,
    pub extreme_synergies: Vec<String>,
}

impl DetailData {
    /// Rebuild detail fields from a record captured by an earlier run.
    pub fn from_cached(record: &ChampionRecord) -> Self {
        Self {
            name: Some(record.name.clone()),
            winrate: record.winrate,
            ban_rate: record.ban_rate,
            pick_rate: record.pick_rate,
            role_tags: record.role_tags.clone(),
            extreme_threats: record.extreme_threats.clone(),
            extreme_synergies: record.extreme_synergies.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterPair {
    pub champion_id: String,
    pub threat_id: String,
    pub category: String,
}

// ============================================================================
// Artifact
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactMeta {
    pub scraped_at: String,
    pub champion_count: usize,
    pub version: String,
    pub pages_scraped: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub meta: ArtifactMeta,
    pub champions: Vec<ChampionRecord>,
    #[serde(default)]
    pub counter_pairs: Vec<CounterPair>,
}

// ============================================================================
// Identifiers
// ============================================================================

static APOSTROPHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"['\u{2019}]").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static NOT_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9-]").expect("valid regex"));
static DASH_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("valid regex"));

/// Derive the stable champion id from a display name.
///
/// "Kai'Sa" -> `kaisa`, "Lee Sin" -> `lee-sin`, "Nunu & Willump" -> `nunu-and-willump`.
/// Applying it to its own output is a no-op.
pub fn champion_id(name: &str) -> String {
    let lower = name.to_lowercase();
    let s = APOSTROPHES.replace_all(&lower, "");
    let s = s.replace("&amp;", "and").replace('&', "and");
    let s = WHITESPACE.replace_all(&s, "-");
    let s = NOT_SLUG.replace_all(&s, "");
    let s = DASH_RUN.replace_all(&s, "-");
    s.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_the_slug_rules() {
        assert_eq!(champion_id("Ahri"), "ahri");
        assert_eq!(champion_id("Kai'Sa"), "kaisa");
        assert_eq!(champion_id("Kha\u{2019}Zix"), "khazix");
        assert_eq!(champion_id("Lee Sin"), "lee-sin");
        assert_eq!(champion_id("Dr. Mundo"), "dr-mundo");
        assert_eq!(champion_id("Nunu & Willump"), "nunu-and-willump");
        assert_eq!(champion_id("Nunu &amp; Willump"), "nunu-and-willump");
        assert_eq!(champion_id("  Jarvan IV "), "jarvan-iv");
    }

    #[test]
    fn id_derivation_is_idempotent() {
        for name in ["Aurelion Sol", "Vel'Koz", "Nunu & Willump", "Master Yi", "Dr. Mundo"] {
            let once = champion_id(name);
            assert_eq!(champion_id(&once), once);
            assert_eq!(champion_id(name), once);
        }
    }

    #[test]
    fn artifact_reads_legacy_page_url_field() {
        let json = r#"{
            "id": "ahri", "name": "Ahri", "pageUrl": "https://x/1-ahri.html",
            "roles": ["mid"], "tier": "S", "winrate": 51.2, "isScraped": true
        }"#;
        let record: ChampionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.detail_page_url, "https://x/1-ahri.html");
        assert!(record.roles.contains(&Role::Mid));
        assert!(record.is_scraped);
        assert!(record.role_tags.is_empty());
    }
}
