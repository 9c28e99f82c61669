use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome for one symbol whose book could be fetched and measured.
///
/// Invariant: `passes_gates` equals the conjunction of `gate_results`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub symbol: String,
    pub venue: String,

    pub score: f64,
    pub momentum_core: f64,
    pub technical_score: f64,
    pub volume_score: f64,
    pub quality_score: f64,
    pub social_score: f64,

    /// Mid price at snapshot time.
    pub price: f64,
    pub volume_24h: f64,
    pub spread_bps: f64,
    pub depth_usd: f64,
    pub vadr: f64,

    pub passes_gates: bool,
    pub gate_results: BTreeMap<String, bool>,

    pub timestamp: DateTime<Utc>,
    /// Time between the snapshot and the moment it was evaluated.
    pub data_age_ms: u64,
    pub attribution: BTreeMap<String, String>,
}

/// Per-run summary, written once after the scan loop ends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total_symbols: usize,
    pub candidates_found: usize,
    pub regime: String,
    pub scan_duration_ms: u64,
    pub timestamp: DateTime<Utc>,
    pub venue_health: BTreeMap<String, String>,
    pub gates_passed: BTreeMap<String, usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Everything a run produced, ranked by score (descending).
#[derive(Clone, Debug)]
pub struct ScanReport {
    pub results: Vec<ScanResult>,
    pub summary: ScanSummary,
}

impl ScanReport {
    /// Gate-passing results in rank order.
    pub fn candidates(&self) -> impl Iterator<Item = &ScanResult> {
        self.results.iter().filter(|r| r.passes_gates)
    }
}
