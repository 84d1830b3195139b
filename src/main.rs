use anyhow::Context;
use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wr_roster_sync::browser::ChromeLauncher;
use wr_roster_sync::progress::{HttpStatusReporter, NoopReporter, ProgressReporter, StatusUpdate};
use wr_roster_sync::{run, Config, PipelineContext, RunOptions};

/// Sample size used by `--sample`.
const SAMPLE_SIZE: usize = 5;

#[derive(Parser)]
#[command(name = "wr-roster-sync")]
#[command(about = "Scrape the Wild Rift champion roster into raw-data.json")]
#[command(version)]
struct Cli {
    /// Log the plan and exit without touching the network
    #[arg(long)]
    dry_run: bool,

    /// Only scrape detail pages for the first N champions
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Shorthand for --limit 5
    #[arg(long, conflicts_with = "limit")]
    sample: bool,

    /// Ignore the previous artifact and re-scrape every detail page
    #[arg(long)]
    force: bool,

    /// Forward progress to the job-status service under this id
    #[arg(long)]
    job_id: Option<String>,

    /// Directory for raw-data.json / raw-sample.json
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();

    let default_level = if cli.dry_run { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wr_roster_sync={default_level}")));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = Config::from_env();
    if let Some(dir) = cli.output_dir.clone() {
        config.output_dir = dir;
    }

    let progress: Arc<dyn ProgressReporter> = match (&cli.job_id, &config.job_status_url) {
        (Some(job_id), Some(base)) => {
            info!(job_id = job_id.as_str(), "reporting progress to job-status service");
            Arc::new(HttpStatusReporter::new(base, job_id))
        }
        (Some(job_id), None) => {
            info!(job_id = job_id.as_str(), "JOB_STATUS_URL not set, progress stays local");
            Arc::new(NoopReporter)
        }
        _ => Arc::new(NoopReporter),
    };

    let ctx = PipelineContext {
        launcher: Arc::new(ChromeLauncher::new(&config)),
        config,
        options: RunOptions {
            dry_run: cli.dry_run,
            limit: if cli.sample { Some(SAMPLE_SIZE) } else { cli.limit },
            force: cli.force,
        },
        progress: progress.clone(),
    };

    match run(&ctx).await.context("Scraping failed") {
        Ok(summary) => {
            info!(
                champions = summary.champions,
                pages_scraped = summary.pages_scraped,
                pages_failed = summary.pages_failed,
                skipped_cached = summary.skipped_cached,
                output = ?summary.output,
                "roster sync finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            let update = failure_update(&e);
            error!(error = ?update.message, "roster sync failed");
            progress.report(update).await;
            ExitCode::from(1)
        }
    }
}

/// `{:#}` renders the whole chain: "Scraping failed: <cause>".
fn failure_update(err: &anyhow::Error) -> StatusUpdate {
    StatusUpdate::failed(format!("{err:#}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wr_roster_sync::progress::JobStatus;
    use wr_roster_sync::SyncError;

    #[test]
    fn failure_message_carries_prefix_and_cause() {
        let err = Err::<(), _>(SyncError::RosterTooSmall {
            found: 100,
            expected: 135,
        })
        .context("Scraping failed")
        .unwrap_err();

        let update = failure_update(&err);
        assert_eq!(update.status, Some(JobStatus::Failed));
        assert_eq!(
            update.message.as_deref(),
            Some("Scraping failed: champion count below expected: found 100, expected 135")
        );
    }
}
