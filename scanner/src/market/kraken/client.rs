use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use super::parser::{parse_depth, parse_system_status, parse_volume_24h};
use crate::market::adapter::ExchangeAdapter;
use crate::market::errors::VenueError;
use crate::market::symbols;
use crate::market::types::{HealthStatus, OrderBookSnapshot, VenueHealth};

const VENUE: &str = "kraken";

/// Levels requested per side from the REST depth endpoint.
const DEPTH_COUNT: u32 = 100;

const MAX_ERROR_RATE: f64 = 0.10;
const MAX_AVG_LATENCY: Duration = Duration::from_secs(2);

/// Running request statistics used to degrade an otherwise healthy venue.
#[derive(Debug, Default)]
struct RequestStats {
    total: u64,
    errors: u64,
    avg_latency: Duration,
}

impl RequestStats {
    fn record(&mut self, latency: Duration, ok: bool) {
        self.total += 1;
        if !ok {
            self.errors += 1;
        }
        // Incremental mean.
        let prev = self.avg_latency.as_secs_f64();
        let mean = prev + (latency.as_secs_f64() - prev) / self.total as f64;
        self.avg_latency = Duration::from_secs_f64(mean);
    }

    fn error_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.errors as f64 / self.total as f64
        }
    }

    fn local_health(&self) -> VenueHealth {
        if self.error_rate() > MAX_ERROR_RATE {
            VenueHealth::degraded("high error rate")
        } else if self.avg_latency > MAX_AVG_LATENCY {
            VenueHealth::degraded("high latency")
        } else {
            VenueHealth::healthy()
        }
    }
}

/// Kraken public REST client.
#[derive(Clone)]
pub struct KrakenClient {
    http: Client,
    url: String,
    stats: Arc<Mutex<RequestStats>>,
}

impl KrakenClient {
    pub fn new(url: String, timeout: Duration) -> Result<Self, VenueError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            url: url.trim_end_matches('/').to_string(),
            stats: Arc::new(Mutex::new(RequestStats::default())),
        })
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, VenueError> {
        let url = format!("{}{}", self.url, path);
        let start = Instant::now();

        let res: Result<Vec<u8>, reqwest::Error> = async {
            let resp = self.http.get(&url).send().await?.error_for_status()?;
            Ok(resp.bytes().await?.to_vec())
        }
        .await;

        self.stats.lock().record(start.elapsed(), res.is_ok());
        Ok(res?)
    }
}

#[async_trait]
impl ExchangeAdapter for KrakenClient {
    fn name(&self) -> &str {
        VENUE
    }

    #[instrument(skip(self), fields(venue = VENUE), level = "debug")]
    async fn get_book_l2(&self, symbol: &str) -> Result<OrderBookSnapshot, VenueError> {
        let pair = symbols::to_kraken(symbol);
        let start = Instant::now();

        let body = self
            .get(&format!("/0/public/Depth?pair={pair}&count={DEPTH_COUNT}"))
            .await?;
        let book = parse_depth(symbol, VENUE, &body, Utc::now())?;

        debug!(
            pair = %pair,
            bids = book.bids.len(),
            asks = book.asks.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "kraken order book fetched"
        );

        Ok(book)
    }

    #[instrument(skip(self), fields(venue = VENUE), level = "debug")]
    async fn health(&self) -> VenueHealth {
        let venue = self
            .get("/0/public/SystemStatus")
            .await
            .and_then(|body| parse_system_status(&body));

        match venue {
            Ok(h) if h.status == HealthStatus::Healthy => self.stats.lock().local_health(),
            Ok(h) => h,
            Err(e) => {
                warn!(error = %e, "kraken system status check failed");
                VenueHealth::unhealthy(format!("system status check failed: {e}"))
            }
        }
    }

    #[instrument(skip(self), fields(venue = VENUE), level = "debug")]
    async fn volume_24h(&self, symbol: &str) -> Result<f64, VenueError> {
        let pair = symbols::to_kraken(symbol);
        let body = self.get(&format!("/0/public/Ticker?pair={pair}")).await?;
        parse_volume_24h(&body)
    }
}
