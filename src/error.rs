use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("unexpected page shape: {0}")]
    Extraction(String),

    #[error("duplicate champion names: {0:?}")]
    DuplicateNames(Vec<String>),

    #[error("duplicate champion ids: {0:?}")]
    DuplicateIds(Vec<String>),

    #[error("champion count below expected: found {found}, expected {expected}")]
    RosterTooSmall { found: usize, expected: usize },

    #[error("artifact I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    pub fn navigation(url: &str, err: impl std::fmt::Display) -> Self {
        SyncError::Navigation {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    /// Only navigation failures are worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, SyncError::Navigation { .. })
    }
}
