//! Orchestrates one sync run: discovery, reconciliation, detail crawl, validation, output.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::artifact::{build_artifact, ArtifactWriter};
use crate::cache::IncrementalCache;
use crate::config::Config;
use crate::detail::{DetailCrawl, DetailPageCrawler};
use crate::error::Result;
use crate::homepage::{HomepageIndex, HomepageIndexer};
use crate::model::{Artifact, TierListEntry};
use crate::page::BrowserLauncher;
use crate::progress::{ProgressReporter, StatusUpdate};
use crate::reconcile::{check_roster_size, counter_pairs, merge_details, reconcile};
use crate::tier_list::TierListCrawler;
use crate::validate::ValidationGate;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Log the plan and stop before any network activity.
    pub dry_run: bool,
    /// Cap on champions sent to the detail crawler. Also lifts the roster size check.
    pub limit: Option<usize>,
    /// Ignore the previous artifact.
    pub force: bool,
}

impl RunOptions {
    pub fn is_full_run(&self) -> bool {
        self.limit.is_none()
    }
}

/// Everything a run needs, passed explicitly to each stage.
pub struct PipelineContext {
    pub config: Config,
    pub options: RunOptions,
    pub launcher: Arc<dyn BrowserLauncher>,
    pub progress: Arc<dyn ProgressReporter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub dry_run: bool,
    pub champions: usize,
    pub pages_scraped: usize,
    pub pages_failed: usize,
    pub skipped_cached: usize,
    pub counter_pairs: usize,
    pub output: Option<PathBuf>,
}

pub async fn run(ctx: &PipelineContext) -> Result<RunSummary> {
    let config = &ctx.config;
    let options = &ctx.options;
    info!(
        full_run = options.is_full_run(),
        limit = ?options.limit,
        force = options.force,
        dry_run = options.dry_run,
        "starting roster sync"
    );

    if options.dry_run {
        info!(
            base_url = config.base_url.as_str(),
            tier_list_url = config.tier_list_url.as_str(),
            roster = config.roster.len(),
            expected = config.expected_champions,
            output = %output_path(ctx).display(),
            "dry run, skipping all network activity"
        );
        return Ok(RunSummary {
            dry_run: true,
            ..Default::default()
        });
    }

    let (homepage, entries) = discover(ctx).await?;

    ctx.progress
        .report(StatusUpdate::progress(30, "Building champion roster..."))
        .await;
    let roster = reconcile(&entries, &config.roster, &homepage);
    check_roster_size(
        roster.champions.len(),
        config.expected_champions,
        options.is_full_run(),
    )?;

    let cache = IncrementalCache::load(&config.full_artifact_path(), options.force);
    let plan = cache.plan(&roster.champions, options.limit);

    let crawl = if plan.targets.is_empty() {
        info!("no detail pages to fetch");
        DetailCrawl::default()
    } else {
        let session = ctx.launcher.launch().await?;
        DetailPageCrawler::new(config.request_delay, config.retry)
            .crawl(session.as_ref(), &plan.targets, ctx.progress.as_ref())
            .await
    };

    let pages_scraped = crawl.fetched.len();
    let pages_failed = crawl.failed.len();
    let mut details = plan.seeds;
    details.extend(crawl.fetched);
    let champions = merge_details(roster.champions, &details);
    let pairs = counter_pairs(&champions);

    ValidationGate {
        expected_champions: config.expected_champions,
        full_run: options.is_full_run(),
    }
    .check(&champions)?;

    ctx.progress
        .report(StatusUpdate::progress(95, "Finalizing data..."))
        .await;
    let artifact = build_artifact(champions, pairs, pages_scraped, chrono::Utc::now());
    let path = output_path(ctx);
    ArtifactWriter::new(&path).write(&artifact)?;
    log_summary(&artifact);

    ctx.progress
        .report(StatusUpdate::completed(format!(
            "Scraped {} champions",
            artifact.meta.champion_count
        )))
        .await;

    Ok(RunSummary {
        dry_run: false,
        champions: artifact.meta.champion_count,
        pages_scraped,
        pages_failed,
        skipped_cached: plan.skipped,
        counter_pairs: artifact.counter_pairs.len(),
        output: Some(path),
    })
}

fn output_path(ctx: &PipelineContext) -> PathBuf {
    if ctx.options.is_full_run() {
        ctx.config.full_artifact_path()
    } else {
        ctx.config.sample_artifact_path()
    }
}

/// Homepage scan and tier-list crawl share one browser session, closed on return.
async fn discover(ctx: &PipelineContext) -> Result<(HomepageIndex, Vec<TierListEntry>)> {
    let config = &ctx.config;
    let session = ctx.launcher.launch().await?;

    ctx.progress
        .report(StatusUpdate::progress(5, "Scanning website..."))
        .await;
    let homepage = HomepageIndexer::new(&config.base_url, config.retry)
        .index(session.as_ref())
        .await;

    ctx.progress
        .report(StatusUpdate::progress(15, "Scraping tier list..."))
        .await;
    let entries = TierListCrawler::new(&config.tier_list_url, config.settle_delay, config.retry)
        .crawl(session.as_ref())
        .await;

    Ok((homepage, entries))
}

fn log_summary(artifact: &Artifact) {
    let mut roles: BTreeMap<&str, usize> = BTreeMap::new();
    let mut tiers: BTreeMap<&str, usize> = BTreeMap::new();
    for champ in &artifact.champions {
        for role in &champ.roles {
            *roles.entry(role.as_str()).or_default() += 1;
        }
        *tiers.entry(champ.tier.as_str()).or_default() += 1;
    }
    let count = |pred: fn(&crate::model::ChampionRecord) -> bool| {
        artifact.champions.iter().filter(|c| pred(c)).count()
    };

    info!(
        champions = artifact.meta.champion_count,
        pages_scraped = artifact.meta.pages_scraped,
        counter_pairs = artifact.counter_pairs.len(),
        roles = ?roles,
        tiers = ?tiers,
        "run summary"
    );
    info!(
        no_winrate = count(|c| c.winrate == 0.0),
        no_pick_rate = count(|c| c.pick_rate == 0.0),
        no_icon = count(|c| c.icon_url.is_empty()),
        no_role_tags = count(|c| c.role_tags.is_empty()),
        not_scraped = count(|c| !c.is_scraped),
        "missing fields"
    );
}
