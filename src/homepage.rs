use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::error::Result;
use crate::page::{Extractor, PageQuery, RawLink};
use crate::retry::RetryPolicy;
use crate::site;

static DETAIL_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(site::DETAIL_HREF_PATTERN).expect("valid regex"));

/// Upper-cased champion name -> absolute detail-page URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomepageIndex {
    by_name: HashMap<String, String>,
}

impl HomepageIndex {
    /// Build the index from raw links: first link per name wins.
    pub fn from_links(links: &[RawLink]) -> Self {
        let mut by_name = HashMap::new();
        for link in links {
            if !is_champion_link(&link.href) {
                continue;
            }
            let name = link.text.trim().to_uppercase();
            let len = name.chars().count();
            if len <= site::MIN_LINK_TEXT || len >= site::MAX_LINK_TEXT {
                continue;
            }
            by_name.entry(name).or_insert_with(|| link.href.clone());
        }
        Self { by_name }
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Look up by display name (any case).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.by_name.get(&name.trim().to_uppercase()).map(String::as_str)
    }

    /// Fall back to matching a canonical slug against the collected URLs (`/12-lee-sin.html`).
    pub fn find_by_slug(&self, slug: &str) -> Option<&str> {
        let suffix = format!("-{slug}.html");
        let mut hits: Vec<&str> = self
            .by_name
            .values()
            .map(String::as_str)
            .filter(|href| href.ends_with(&suffix))
            .collect();
        hits.sort_unstable();
        hits.into_iter().next()
    }
}

fn is_champion_link(href: &str) -> bool {
    let path = Url::parse(href)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| href.to_string());
    DETAIL_HREF.is_match(&path)
        && !site::NON_CHAMPION_HREF_PARTS
            .iter()
            .any(|part| path.contains(part))
}

/// Scans the landing page for champion detail links.
pub struct HomepageIndexer<'a> {
    base_url: &'a str,
    retry: RetryPolicy,
}

impl<'a> HomepageIndexer<'a> {
    pub fn new(base_url: &'a str, retry: RetryPolicy) -> Self {
        Self { base_url, retry }
    }

    /// Best effort: any failure yields an empty index.
    pub async fn index(&self, page: &dyn PageQuery) -> HomepageIndex {
        match self.try_index(page).await {
            Ok(index) => {
                info!(found = index.len(), "homepage scan complete");
                index
            }
            Err(e) => {
                warn!(url = self.base_url, error = %e, "homepage scan failed, continuing without it");
                HomepageIndex::default()
            }
        }
    }

    async fn try_index(&self, page: &dyn PageQuery) -> Result<HomepageIndex> {
        self.retry
            .run("homepage", || page.open(self.base_url, None))
            .await?;
        let value = page.evaluate(&Extractor::Links).await?;
        let links: Vec<RawLink> = serde_json::from_value(value)?;
        Ok(HomepageIndex::from_links(&links))
    }
}
