//! Deterministic in-process venue.
//!
//! Builds ladder books from static base prices so a scan can run without
//! network access. Individual symbols can be overridden with a fixed book or
//! a failure, which is how the scan loop is exercised in tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::market::adapter::ExchangeAdapter;
use crate::market::errors::VenueError;
use crate::market::symbols;
use crate::market::types::{BookLevel, OrderBookSnapshot, VenueHealth};

const DEFAULT_BASE_PRICE: f64 = 100.0;

const BASE_PRICES: &[(&str, f64)] = &[
    ("BTCUSD", 65_000.0),
    ("ETHUSD", 3_200.0),
    ("SOLUSD", 150.0),
    ("ADAUSD", 0.45),
    ("LINKUSD", 14.0),
    ("DOTUSD", 6.5),
    ("MATICUSD", 0.70),
    ("AVAXUSD", 30.0),
    ("UNIUSD", 7.0),
    ("LTCUSD", 80.0),
    ("XRPUSD", 0.55),
];

/// Shape of generated books.
#[derive(Clone, Debug)]
pub struct LadderShape {
    /// Levels per side.
    pub levels: usize,
    /// Half of the top-of-book spread, in bps of the base price.
    pub half_spread_bps: f64,
    /// Distance between consecutive levels, in bps of the base price.
    pub step_bps: f64,
    /// Quote notional at the best level; deeper levels grow by 10% each.
    pub level_notional: f64,
}

impl Default for LadderShape {
    fn default() -> Self {
        Self {
            levels: 20,
            half_spread_bps: 1.0,
            step_bps: 5.0,
            level_notional: 25_000.0,
        }
    }
}

/// Scripted failure for one symbol.
#[derive(Clone, Debug)]
pub enum SyntheticFailure {
    Timeout,
    Malformed(String),
}

pub struct SyntheticVenue {
    name: String,
    shape: LadderShape,
    health: VenueHealth,
    books: HashMap<String, OrderBookSnapshot>,
    failures: HashMap<String, SyntheticFailure>,
    latency: Option<Duration>,
    book_requests: AtomicUsize,
}

impl SyntheticVenue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: LadderShape::default(),
            health: VenueHealth::healthy(),
            books: HashMap::new(),
            failures: HashMap::new(),
            latency: None,
            book_requests: AtomicUsize::new(0),
        }
    }

    pub fn with_shape(mut self, shape: LadderShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_health(mut self, health: VenueHealth) -> Self {
        self.health = health;
        self
    }

    /// Serve `book` verbatim for its symbol.
    pub fn with_book(mut self, book: OrderBookSnapshot) -> Self {
        self.books.insert(symbols::canonical(&book.symbol), book);
        self
    }

    pub fn with_failure(mut self, symbol: &str, failure: SyntheticFailure) -> Self {
        self.failures.insert(symbols::canonical(symbol), failure);
        self
    }

    /// Delay every book fetch by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of `get_book_l2` calls served so far.
    pub fn book_requests(&self) -> usize {
        self.book_requests.load(Ordering::Relaxed)
    }

    fn base_price(symbol: &str) -> f64 {
        BASE_PRICES
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, p)| *p)
            .unwrap_or(DEFAULT_BASE_PRICE)
    }

    fn ladder(&self, symbol: &str) -> OrderBookSnapshot {
        let base = Self::base_price(symbol);
        let s = &self.shape;

        let level = |i: usize, sign: f64| {
            let offset_bps = s.half_spread_bps + s.step_bps * i as f64;
            let price = base * (1.0 + sign * offset_bps / 10_000.0);
            let notional = s.level_notional * (1.0 + 0.1 * i as f64);
            BookLevel::new(price, notional / price)
        };

        OrderBookSnapshot {
            symbol: symbol.to_string(),
            venue: self.name.clone(),
            timestamp: Utc::now(),
            sequence: 0,
            bids: (0..s.levels).map(|i| level(i, -1.0)).collect(),
            asks: (0..s.levels).map(|i| level(i, 1.0)).collect(),
        }
    }
}

#[async_trait]
impl ExchangeAdapter for SyntheticVenue {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_book_l2(&self, symbol: &str) -> Result<OrderBookSnapshot, VenueError> {
        self.book_requests.fetch_add(1, Ordering::Relaxed);
        let symbol = symbols::canonical(symbol);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match self.failures.get(&symbol) {
            Some(SyntheticFailure::Timeout) => return Err(VenueError::Timeout(0)),
            Some(SyntheticFailure::Malformed(msg)) => {
                return Err(VenueError::MalformedData(msg.clone()));
            }
            None => {}
        }

        let book = match self.books.get(&symbol) {
            Some(book) => book.clone(),
            None => self.ladder(&symbol),
        };

        if let Some(side) = book.empty_side() {
            return Err(VenueError::EmptyBook { symbol, side });
        }

        debug!(
            venue = %self.name,
            symbol = %symbol,
            bids = book.bids.len(),
            asks = book.asks.len(),
            "synthetic order book served"
        );
        Ok(book)
    }

    async fn health(&self) -> VenueHealth {
        self.health.clone()
    }

    async fn volume_24h(&self, symbol: &str) -> Result<f64, VenueError> {
        Ok(symbols::canonical(symbol).len() as f64 * 1_000_000.0)
    }
}
