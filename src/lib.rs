pub mod artifact;
pub mod browser;
pub mod cache;
pub mod config;
pub mod detail;
pub mod dom;
pub mod error;
pub mod homepage;
pub mod model;
pub mod page;
pub mod pipeline;
pub mod progress;
pub mod reconcile;
pub mod retry;
pub mod site;
pub mod tier_list;
pub mod validate;

#[cfg(test)]
pub mod testing;

pub use config::Config;
pub use error::{Result, SyncError};
pub use pipeline::{run, PipelineContext, RunOptions, RunSummary};
