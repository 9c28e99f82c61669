use std::path::PathBuf;

use thiserror::Error;

/// Failures that end a scan run.
///
/// Per-symbol problems are `market::VenueError` and never surface here.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("venue {venue} is unhealthy: {recommendation}")]
    VenueUnhealthy {
        venue: String,
        recommendation: String,
    },

    #[error("failed to write {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        source: serde_json::Error,
    },
}
