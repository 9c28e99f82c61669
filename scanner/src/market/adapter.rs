use async_trait::async_trait;

use crate::market::errors::VenueError;
use crate::market::types::{OrderBookSnapshot, VenueHealth};

/// Venue boundary used by the scan loop.
///
/// Implementations hide the venue's symbol spelling and transport. Symbols
/// passed in and returned in snapshots use the universal spelling
/// (e.g. `BTCUSD`).
#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
    /// Stable venue identifier used in attribution.
    fn name(&self) -> &str;

    /// Fetches a depth-of-book snapshot.
    ///
    /// Returns `VenueError::EmptyBook` when either side has no levels.
    async fn get_book_l2(&self, symbol: &str) -> Result<OrderBookSnapshot, VenueError>;

    /// Current venue health; queried once before a scan starts.
    async fn health(&self) -> VenueHealth;

    /// Rolling 24h traded volume in quote currency.
    async fn volume_24h(&self, symbol: &str) -> Result<f64, VenueError>;
}
