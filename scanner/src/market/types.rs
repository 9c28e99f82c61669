use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Single aggregated price level of an L2 book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: f64,
    pub size: f64,
}

impl BookLevel {
    pub fn new(price: f64, size: f64) -> Self {
        Self { price, size }
    }

    /// Quote-currency notional of the level.
    pub fn notional(&self) -> f64 {
        self.price * self.size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookSide {
    Bid,
    Ask,
}

impl fmt::Display for BookSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookSide::Bid => f.write_str("bid"),
            BookSide::Ask => f.write_str("ask"),
        }
    }
}

/// Normalized depth-of-book snapshot for one symbol on one venue.
///
/// Bids are ordered by descending price and asks by ascending price, so the
/// best level of each side is at index 0. Both sides must be non-empty for
/// microstructure metrics to be computable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    /// Universal symbol spelling (e.g. `BTCUSD`), not the venue's.
    pub symbol: String,
    pub venue: String,
    pub timestamp: DateTime<Utc>,
    /// Venue sequence number; 0 when the venue provides none.
    pub sequence: u64,
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

impl OrderBookSnapshot {
    pub fn best_bid(&self) -> Option<BookLevel> {
        self.bids.first().copied()
    }

    pub fn best_ask(&self) -> Option<BookLevel> {
        self.asks.first().copied()
    }

    /// First side that has no levels, if any.
    pub fn empty_side(&self) -> Option<BookSide> {
        if self.bids.is_empty() {
            Some(BookSide::Bid)
        } else if self.asks.is_empty() {
            Some(BookSide::Ask)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Venue health as reported by an adapter before and during a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueHealth {
    pub status: HealthStatus,
    /// Operator hint; empty when healthy.
    pub recommendation: String,
}

impl VenueHealth {
    pub fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            recommendation: String::new(),
        }
    }

    pub fn degraded(recommendation: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Degraded,
            recommendation: recommendation.into(),
        }
    }

    pub fn unhealthy(recommendation: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            recommendation: recommendation.into(),
        }
    }

    pub fn is_unhealthy(&self) -> bool {
        self.status == HealthStatus::Unhealthy
    }
}
