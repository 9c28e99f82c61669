use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// Every Kraken public REST response: `{ "error": [...], "result": {...} }`.
#[derive(Debug, Deserialize)]
pub struct KrakenEnvelope<T> {
    #[serde(default)]
    pub error: Vec<String>,
    pub result: Option<T>,
}

/// `[price, volume, timestamp]`; price and volume arrive as decimal strings.
#[derive(Debug, Deserialize)]
pub struct RawLevel(pub String, pub String, pub Value);

#[derive(Debug, Deserialize)]
pub struct Depth {
    #[serde(default)]
    pub bids: Vec<RawLevel>,
    #[serde(default)]
    pub asks: Vec<RawLevel>,
}

/// `result` of `/0/public/Depth`, keyed by Kraken pair name.
pub type DepthResult = HashMap<String, Depth>;

/// Subset of `/0/public/Ticker` used for 24h volume.
#[derive(Debug, Deserialize)]
pub struct Ticker {
    /// Last trade closed: `[price, lot volume]`.
    pub c: Vec<String>,
    /// Volume: `[today, last 24 hours]`.
    pub v: Vec<String>,
}

pub type TickerResult = HashMap<String, Ticker>;

#[derive(Debug, Deserialize)]
pub struct SystemStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}
