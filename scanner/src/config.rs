use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::gates::GateThresholds;
use crate::microstructure::DEFAULT_DEPTH_RANGE_PCT;
use crate::scan::orchestrator::ScanSettings;
use crate::scan::pacing::PacingPolicy;
use crate::scoring::TRENDING_BULL;

pub const DEFAULT_SYMBOLS: &[&str] = &[
    "BTCUSD", "ETHUSD", "SOLUSD", "ADAUSD", "LINKUSD", "DOTUSD", "MATICUSD", "AVAXUSD", "UNIUSD",
    "LTCUSD", "XRPUSD",
];

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Where order books come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VenueKind {
    Kraken,
    /// In-process ladder books; no network access.
    Synthetic,
}

#[derive(Clone, Debug)]
pub struct ScanConfig {
    pub venue: VenueKind,

    /// Base URL of the Kraken public REST API.
    pub kraken_http_endpoint: String,

    /// Symbol universe, scanned in this order.
    pub symbols: Vec<String>,

    /// Regime label handed to the scorer.
    pub regime: String,

    /// Half-width of the depth band, in percent of mid.
    pub depth_range_pct: f64,

    // =========================
    // Venue call behaviour
    // =========================
    /// Client-side pacing between symbols.
    ///
    /// Public venue endpoints are rate limited per IP; the default fixed
    /// 2s delay stays well under Kraken's public allowance.
    pub pacing: PacingPolicy,

    /// Upper bound on any single venue call.
    pub fetch_timeout: Duration,

    /// Calls slower than this are reported on the `performance` target.
    pub slow_fetch_warn: Duration,

    pub thresholds: GateThresholds,

    /// Directory receiving `live_candidates.jsonl` and `live_scan_summary.json`.
    pub output_dir: PathBuf,

    /// Emit JSON logs (production) instead of pretty ones.
    pub json_logs: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            venue: VenueKind::Kraken,
            kraken_http_endpoint: "https://api.kraken.com".to_string(),
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            regime: TRENDING_BULL.to_string(),
            depth_range_pct: DEFAULT_DEPTH_RANGE_PCT,
            pacing: PacingPolicy::Fixed(Duration::from_millis(2_000)),
            fetch_timeout: Duration::from_millis(10_000),
            slow_fetch_warn: Duration::from_secs(2),
            thresholds: GateThresholds::default(),
            output_dir: PathBuf::from("out/live_scan"),
            json_logs: false,
        }
    }
}

impl ScanConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Unset keys take
    /// their defaults; set but unparseable keys are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let venue = match get("SCAN_VENUE").as_deref() {
            None | Some("kraken") => VenueKind::Kraken,
            Some("synthetic") => VenueKind::Synthetic,
            Some(other) => return Err(invalid("SCAN_VENUE", other)),
        };

        let symbols = match get("SCAN_SYMBOLS") {
            Some(raw) => {
                let symbols: Vec<String> = raw
                    .split(',')
                    .map(|s| s.trim().to_uppercase())
                    .filter(|s| !s.is_empty())
                    .collect();
                if symbols.is_empty() {
                    return Err(ConfigError::Empty("SCAN_SYMBOLS"));
                }
                symbols
            }
            None => d.symbols,
        };

        let pacing_ms = parse_or(&get, "SCAN_PACING_MS", 2_000u64)?;
        let pacing = match get("SCAN_PACING").as_deref() {
            None | Some("fixed") => PacingPolicy::Fixed(Duration::from_millis(pacing_ms)),
            Some("token_bucket") => PacingPolicy::TokenBucket {
                capacity: parse_or(&get, "SCAN_TOKEN_BUCKET_CAPACITY", 1u32)?,
                refill_every: Duration::from_millis(parse_or(
                    &get,
                    "SCAN_TOKEN_BUCKET_REFILL_MS",
                    2_000u64,
                )?),
            },
            Some("none") => PacingPolicy::None,
            Some(other) => return Err(invalid("SCAN_PACING", other)),
        };

        let depth_range_pct = parse_or(&get, "SCAN_DEPTH_RANGE_PCT", d.depth_range_pct)?;
        if !(depth_range_pct.is_finite() && depth_range_pct > 0.0) {
            return Err(invalid("SCAN_DEPTH_RANGE_PCT", &depth_range_pct.to_string()));
        }

        let thresholds = GateThresholds {
            min_score: parse_finite(&get, "SCAN_MIN_SCORE", d.thresholds.min_score)?,
            max_spread_bps: parse_finite(&get, "SCAN_MAX_SPREAD_BPS", d.thresholds.max_spread_bps)?,
            min_depth_usd: parse_finite(&get, "SCAN_MIN_DEPTH_USD", d.thresholds.min_depth_usd)?,
            min_vadr: parse_finite(&get, "SCAN_MIN_VADR", d.thresholds.min_vadr)?,
        };

        let fetch_timeout_ms = parse_or(&get, "SCAN_FETCH_TIMEOUT_MS", 10_000u64)?;
        if fetch_timeout_ms == 0 {
            return Err(invalid("SCAN_FETCH_TIMEOUT_MS", "0"));
        }

        Ok(Self {
            venue,
            kraken_http_endpoint: get("KRAKEN_HTTP_ENDPOINT").unwrap_or(d.kraken_http_endpoint),
            symbols,
            regime: get("SCAN_REGIME").unwrap_or(d.regime),
            depth_range_pct,
            pacing,
            fetch_timeout: Duration::from_millis(fetch_timeout_ms),
            slow_fetch_warn: d.slow_fetch_warn,
            thresholds,
            output_dir: get("SCAN_OUTPUT_DIR").map(PathBuf::from).unwrap_or(d.output_dir),
            json_logs: get("APP_ENV").as_deref() == Some("production"),
        })
    }

    pub fn settings(&self) -> ScanSettings {
        ScanSettings {
            symbols: self.symbols.clone(),
            depth_range_pct: self.depth_range_pct,
            fetch_timeout: self.fetch_timeout,
            slow_fetch_warn: self.slow_fetch_warn,
        }
    }
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.parse().map_err(|_| invalid(key, &raw)),
        None => Ok(default),
    }
}

fn parse_finite<G>(get: &G, key: &'static str, default: f64) -> Result<f64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let v = parse_or(get, key, default)?;
    if !v.is_finite() {
        return Err(invalid(key, &v.to_string()));
    }
    Ok(v)
}
