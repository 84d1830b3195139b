use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::model::{champion_id, Role, TierListEntry};
use crate::page::{Extractor, PageQuery, RawCard, SlotScope};
use crate::retry::RetryPolicy;
use crate::site::{self, RoleTab};

/// Walks the role tabs of the tier-list page and collects one entry per
/// (champion, role) card.
pub struct TierListCrawler<'a> {
    url: &'a str,
    tabs: &'a [RoleTab],
    tiers: &'a [(&'static str, &'static str)],
    settle_delay: Duration,
    retry: RetryPolicy,
}

impl<'a> TierListCrawler<'a> {
    pub fn new(url: &'a str, settle_delay: Duration, retry: RetryPolicy) -> Self {
        Self {
            url,
            tabs: &site::ROLE_TABS,
            tiers: site::TIER_TOKENS,
            settle_delay,
            retry,
        }
    }

    pub fn with_tabs(mut self, tabs: &'a [RoleTab]) -> Self {
        self.tabs = tabs;
        self
    }

    /// Display tier for a slot token (`sp` -> `S+`).
    pub fn display_tier(&self, token: &str) -> String {
        self.tiers
            .iter()
            .find(|(t, _)| t.eq_ignore_ascii_case(token))
            .map(|(_, display)| display.to_string())
            .unwrap_or_else(|| token.to_uppercase())
    }

    /// Crawl every tab. A page that never loads yields no entries; the roster
    /// count check downstream decides whether that is fatal.
    pub async fn crawl(&self, page: &dyn PageQuery) -> Vec<TierListEntry> {
        info!(url = self.url, "starting tier list scrape");
        if let Err(e) = self
            .retry
            .run("tier-list", || page.open(self.url, Some(site::TIER_LIST_READY)))
            .await
        {
            warn!(url = self.url, error = %e, "tier list page unavailable");
            return Vec::new();
        }

        let mut entries = Vec::new();
        let mut seen: HashSet<(String, Role)> = HashSet::new();
        for tab in self.tabs {
            let found = self.crawl_tab(page, tab, &mut seen).await;
            entries.extend(found);
        }

        let unique: HashSet<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        info!(
            total = entries.len(),
            unique_champions = unique.len(),
            "tier list scrape complete"
        );
        entries
    }

    async fn crawl_tab(
        &self,
        page: &dyn PageQuery,
        tab: &RoleTab,
        seen: &mut HashSet<(String, Role)>,
    ) -> Vec<TierListEntry> {
        info!(index = tab.index, role = %tab.role, css = tab.css_prefix, "activating tab");
        match page.evaluate(&Extractor::ActivateTab { index: tab.index }).await {
            Ok(v) if v.as_bool() == Some(false) => {
                warn!(index = tab.index, "tab control not found")
            }
            Ok(_) => {}
            Err(e) => warn!(index = tab.index, error = %e, "tab click failed"),
        }
        sleep(self.settle_delay).await;

        let mut entries = self
            .scan(page, tab, SlotScope::Visible, seen)
            .await
            .unwrap_or_else(|e| {
                warn!(role = %tab.role, error = %e, "visible card scan failed");
                Vec::new()
            });

        if entries.is_empty() {
            debug!(role = %tab.role, "no visible cards, scanning hidden slots");
            entries = self
                .scan(page, tab, SlotScope::Anywhere, seen)
                .await
                .unwrap_or_else(|e| {
                    warn!(role = %tab.role, error = %e, "hidden slot scan failed");
                    Vec::new()
                });
            if !entries.is_empty() {
                info!(role = %tab.role, count = entries.len(), "recovered cards from hidden slots");
            }
        }

        let mut by_tier: BTreeMap<&str, usize> = BTreeMap::new();
        for e in &entries {
            *by_tier.entry(e.tier.as_str()).or_default() += 1;
        }
        info!(role = %tab.role, count = entries.len(), tiers = ?by_tier, "tab done");
        entries
    }

    /// Extract cards for one role. Entries already seen for the same
    /// (champion, role) are dropped, so the first strategy to see a card wins.
    async fn scan(
        &self,
        page: &dyn PageQuery,
        tab: &RoleTab,
        scope: SlotScope,
        seen: &mut HashSet<(String, Role)>,
    ) -> Result<Vec<TierListEntry>> {
        let value = page
            .evaluate(&Extractor::TierCards {
                css_prefix: tab.css_prefix.to_string(),
                scope,
            })
            .await?;
        let cards: Vec<RawCard> = serde_json::from_value(value)?;

        let mut entries = Vec::new();
        for card in cards {
            let Some(entry) = self.to_entry(card, tab.role) else {
                continue;
            };
            if seen.insert((entry.id.clone(), entry.role)) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    fn to_entry(&self, card: RawCard, role: Role) -> Option<TierListEntry> {
        let (name, page_url) = match (card.name, card.page_url) {
            (Some(name), Some(url)) => (name, url),
            (name, _) => {
                warn!(role = %role, name = ?name, "skipping card without name or link");
                return None;
            }
        };
        let id = champion_id(&name);
        if id.is_empty() {
            warn!(role = %role, name = name.as_str(), "skipping card with unusable name");
            return None;
        }
        let stat = |i: usize| card.stats.get(i).copied().flatten().unwrap_or(0.0);
        Some(TierListEntry {
            id,
            tier: self.display_tier(&card.tier_token),
            winrate: stat(0),
            ban_rate: stat(1),
            name,
            detail_page_url: page_url,
            role,
            icon_url: card.icon_url,
        })
    }
}
