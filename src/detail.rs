use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{Result, SyncError};
use crate::model::DetailData;
use crate::page::{Extractor, PageQuery, RawDetail};
use crate::progress::{ProgressReporter, StatusUpdate};
use crate::retry::RetryPolicy;
use crate::site;

/// A champion page to visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailTarget {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailCrawl {
    /// Successfully parsed pages, keyed by champion id.
    pub fetched: HashMap<String, DetailData>,
    /// Ids whose page stayed unavailable after all retries.
    pub failed: Vec<String>,
}

impl From<RawDetail> for DetailData {
    fn from(raw: RawDetail) -> Self {
        Self {
            name: raw.name,
            winrate: raw.winrate.unwrap_or(0.0),
            ban_rate: raw.ban_rate.unwrap_or(0.0),
            pick_rate: raw.pick_rate.unwrap_or(0.0),
            role_tags: raw.role_tags.into_iter().collect(),
            extreme_threats: raw.extreme_threats,
            extreme_synergies: raw.extreme_synergies,
        }
    }
}

/// Visits champion pages one at a time with a fixed pause between requests.
pub struct DetailPageCrawler {
    delay: Duration,
    retry: RetryPolicy,
}

impl DetailPageCrawler {
    pub fn new(delay: Duration, retry: RetryPolicy) -> Self {
        Self { delay, retry }
    }

    pub async fn crawl(
        &self,
        page: &dyn PageQuery,
        targets: &[DetailTarget],
        progress: &dyn ProgressReporter,
    ) -> DetailCrawl {
        info!(count = targets.len(), "starting champion page scrape");
        let mut crawl = DetailCrawl::default();

        for (i, target) in targets.iter().enumerate() {
            let pct = 40 + (i * 50 / targets.len().max(1)) as u8;
            progress
                .report(StatusUpdate::progress(
                    pct,
                    format!("Scraping champion data [{}/{}]...", i + 1, targets.len()),
                ))
                .await;
            info!(
                n = i + 1,
                of = targets.len(),
                page = target.url.rsplit('/').next().unwrap_or(&target.url),
                "scraping"
            );

            match self.fetch(page, &target.url).await {
                Ok(detail) => {
                    crawl.fetched.insert(target.id.clone(), detail);
                }
                Err(e) => {
                    warn!(champion = target.id.as_str(), url = target.url.as_str(), error = %e, "detail page unavailable, keeping roster fields");
                    crawl.failed.push(target.id.clone());
                }
            }

            if i + 1 < targets.len() {
                sleep(self.delay).await;
            }
        }

        info!(
            fetched = crawl.fetched.len(),
            failed = crawl.failed.len(),
            with_threats = crawl.fetched.values().filter(|d| !d.extreme_threats.is_empty()).count(),
            with_synergies = crawl.fetched.values().filter(|d| !d.extreme_synergies.is_empty()).count(),
            "champion page scrape complete"
        );
        crawl
    }

    async fn fetch(&self, page: &dyn PageQuery, url: &str) -> Result<DetailData> {
        let raw: RawDetail = self
            .retry
            .run(url, || async move {
                page.open(url, Some(site::DETAIL_READY)).await?;
                let value = page.evaluate(&Extractor::ChampionDetail).await?;
                Ok::<RawDetail, SyncError>(serde_json::from_value(value)?)
            })
            .await?;
        Ok(raw.into())
    }
}
