use thiserror::Error;

use crate::market::types::BookSide;

/// Coarse classification of a per-symbol venue failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenueErrorKind {
    Network,
    MalformedData,
    EmptyBook,
}

/// Failure fetching or parsing a single symbol's data.
///
/// None of these abort a scan; the symbol is skipped and the error is
/// recorded in the run summary.
#[derive(Error, Debug)]
pub enum VenueError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("request cancelled")]
    Cancelled,

    #[error("request timed out after {0} ms")]
    Timeout(u64),

    #[error("malformed data: {0}")]
    MalformedData(String),

    #[error("venue api error: {}", .0.join(", "))]
    Api(Vec<String>),

    #[error("empty order book for {symbol}: no {side} levels")]
    EmptyBook {
        symbol: String,
        side: BookSide,
    },
}

impl VenueError {
    pub fn kind(&self) -> VenueErrorKind {
        match self {
            VenueError::Network(_) | VenueError::Cancelled | VenueError::Timeout(_) => {
                VenueErrorKind::Network
            }
            VenueError::MalformedData(_) | VenueError::Api(_) => VenueErrorKind::MalformedData,
            VenueError::EmptyBook { .. } => VenueErrorKind::EmptyBook,
        }
    }
}

impl From<serde_json::Error> for VenueError {
    fn from(e: serde_json::Error) -> Self {
        VenueError::MalformedData(e.to_string())
    }
}
