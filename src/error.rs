use thiserror::Error;

/// The page could not be retrieved or rendered. Fatal to the current run;
/// the caller may retry or keep serving the last cached dataset.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to launch or drive the browser: {0}")]
    Browser(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("page render timed out after {0} seconds")]
    Timeout(u64),

    #[error("rendered document was empty")]
    EmptyDocument,
}

/// Persisting the dataset snapshot failed. Surfaced to the caller but
/// non-fatal: the in-memory records from the current run remain usable.
#[derive(Debug, Error)]
pub enum SinkWriteError {
    #[error("csv serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("snapshot write failed: {0}")]
    Io(#[from] std::io::Error),
}
