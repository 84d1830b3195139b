use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::detail::DetailTarget;
use crate::model::{Artifact, ChampionRecord, DetailData};

/// Champion records from the previous artifact, read-only.
#[derive(Debug, Clone, Default)]
pub struct IncrementalCache {
    cached: HashMap<String, ChampionRecord>,
}

/// What the detail crawl still has to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchPlan {
    pub targets: Vec<DetailTarget>,
    /// Detail fields carried forward from the cache, keyed by champion id.
    pub seeds: HashMap<String, DetailData>,
    /// Champions inside the crawl window that were skipped as already scraped.
    pub skipped: usize,
}

impl IncrementalCache {
    /// Load the previous artifact. `force`, a missing file, or an unreadable
    /// one all give an empty cache.
    pub fn load(path: &Path, force: bool) -> Self {
        if force {
            info!("cache disabled by --force");
            return Self::default();
        }
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                info!(path = %path.display(), error = %e, "no previous artifact, full detail crawl");
                return Self::default();
            }
        };
        match serde_json::from_str::<Artifact>(&raw) {
            Ok(artifact) => {
                let cache = Self::from_artifact(artifact);
                info!(path = %path.display(), champions = cache.len(), "loaded previous artifact for incremental sync");
                cache
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not parse previous artifact, performing full scrape");
                Self::default()
            }
        }
    }

    pub fn from_artifact(artifact: Artifact) -> Self {
        let cached = artifact
            .champions
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();
        Self { cached }
    }

    pub fn len(&self) -> usize {
        self.cached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cached.is_empty()
    }

    /// A champion may skip its detail fetch only if it was fully scraped before.
    pub fn is_fresh(&self, id: &str) -> bool {
        self.cached.get(id).map(|c| c.is_scraped).unwrap_or(false)
    }

    /// Split the roster into pages to fetch and cached detail to carry forward.
    /// `limit` caps the crawl window (first N champions) before the cache filter.
    pub fn plan(&self, roster: &[ChampionRecord], limit: Option<usize>) -> FetchPlan {
        let window = limit.unwrap_or(roster.len()).min(roster.len());

        let mut plan = FetchPlan::default();
        for (i, champ) in roster.iter().enumerate() {
            let fresh = self.is_fresh(&champ.id);
            if fresh {
                if let Some(cached) = self.cached.get(&champ.id) {
                    plan.seeds.insert(champ.id.clone(), DetailData::from_cached(cached));
                }
            }
            if i >= window {
                continue;
            }
            if fresh {
                plan.skipped += 1;
            } else {
                plan.targets.push(DetailTarget {
                    id: champ.id.clone(),
                    url: champ.detail_page_url.clone(),
                });
            }
        }

        info!(
            queued = plan.targets.len(),
            skipped = plan.skipped,
            carried_forward = plan.seeds.len(),
            "detail crawl planned"
        );
        plan
    }
}
