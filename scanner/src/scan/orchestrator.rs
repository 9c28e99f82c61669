//! Sequential scan over a symbol universe.
//!
//! Per run:
//!   1. Query venue health; abort with `VenueUnhealthy` before any fetch if
//!      the venue reports unhealthy.
//!   2. For each symbol, strictly one at a time and paced by the configured
//!      policy: fetch book → metrics → score → gates.
//!   3. Rank results by score and aggregate per-gate pass counts.
//!
//! Per-symbol failures are logged, counted and recorded as strings in the
//! summary; they never end the run. There are no retries.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use common::logger::{child_span, warn_if_slow};
use tracing::{Instrument, debug, error, info, instrument, warn};

use super::cancel::{CancelToken, StopHandle};
use super::pacing::{NoPacing, Pacer};
use super::types::{ScanReport, ScanResult, ScanSummary};
use crate::error::ScanError;
use crate::gates::{GateEvaluator, GateInput};
use crate::market::adapter::ExchangeAdapter;
use crate::market::errors::VenueError;
use crate::metrics::counters::Counters;
use crate::microstructure::{DEFAULT_DEPTH_RANGE_PCT, compute_metrics};
use crate::scoring::{RegimeProvider, Scorer};

/// Knobs of the scan loop that are independent of its collaborators.
#[derive(Clone, Debug)]
pub struct ScanSettings {
    pub symbols: Vec<String>,
    /// Half-width, in percent of mid, of the band used for `depth_usd`.
    pub depth_range_pct: f64,
    /// Upper bound on each individual venue call.
    pub fetch_timeout: Duration,
    /// Venue calls slower than this are logged on the `performance` target.
    pub slow_fetch_warn: Duration,
}

impl ScanSettings {
    pub fn new(symbols: Vec<String>) -> Self {
        Self {
            symbols,
            depth_range_pct: DEFAULT_DEPTH_RANGE_PCT,
            fetch_timeout: Duration::from_secs(10),
            slow_fetch_warn: Duration::from_secs(2),
        }
    }
}

pub struct ScanOrchestrator {
    adapter: Arc<dyn ExchangeAdapter>,
    scorer: Arc<dyn Scorer>,
    regime: Arc<dyn RegimeProvider>,
    gates: GateEvaluator,
    pacer: Box<dyn Pacer>,
    settings: ScanSettings,
    counters: Counters,
}

impl ScanOrchestrator {
    /// Orchestrator with the default gate set and no pacing.
    pub fn new(
        adapter: Arc<dyn ExchangeAdapter>,
        scorer: Arc<dyn Scorer>,
        regime: Arc<dyn RegimeProvider>,
        settings: ScanSettings,
    ) -> Self {
        Self {
            adapter,
            scorer,
            regime,
            gates: GateEvaluator::default(),
            pacer: Box::new(NoPacing),
            settings,
            counters: Counters::default(),
        }
    }

    pub fn with_gates(mut self, gates: GateEvaluator) -> Self {
        self.gates = gates;
        self
    }

    pub fn with_pacer(mut self, pacer: Box<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn with_counters(mut self, counters: Counters) -> Self {
        self.counters = counters;
        self
    }

    /// Runs one scan over the configured symbols.
    ///
    /// `cancel` governs each in-flight venue call; `stop` is checked between
    /// symbols and ends the loop early when set.
    #[instrument(
        skip_all,
        fields(venue = %self.adapter.name(), symbols = self.settings.symbols.len())
    )]
    pub async fn run(
        &mut self,
        cancel: &CancelToken,
        stop: &StopHandle,
    ) -> Result<ScanReport, ScanError> {
        let venue = self.adapter.name().to_string();

        let health = self.adapter.health().await;
        info!(
            status = %health.status,
            recommendation = %health.recommendation,
            "venue health checked"
        );
        if health.is_unhealthy() {
            error!(recommendation = %health.recommendation, "venue unhealthy; aborting scan");
            return Err(ScanError::VenueUnhealthy {
                venue,
                recommendation: health.recommendation,
            });
        }

        let regime = self.regime.current_regime();
        let symbols = self.settings.symbols.clone();
        let started = Instant::now();

        let mut results: Vec<ScanResult> = Vec::with_capacity(symbols.len());
        let mut errors: Vec<String> = Vec::new();
        let mut attempted = 0usize;

        for (i, symbol) in symbols.iter().enumerate() {
            if stop.is_stop_requested() {
                warn!(remaining = symbols.len() - i, "stop requested; ending scan early");
                break;
            }

            self.pacer.wait().await;
            attempted += 1;
            Counters::incr(&self.counters.symbols_attempted);

            let outcome = self
                .scan_symbol(symbol, &regime, cancel)
                .instrument(child_span("scan_symbol", symbol))
                .await;

            match outcome {
                Ok(result) => {
                    info!(
                        symbol = %symbol,
                        progress = %format!("{}/{}", i + 1, symbols.len()),
                        score = result.score,
                        spread_bps = result.spread_bps,
                        depth_usd = result.depth_usd,
                        vadr = result.vadr,
                        passes = result.passes_gates,
                        "symbol scanned"
                    );
                    if result.passes_gates {
                        Counters::incr(&self.counters.candidates);
                    }
                    results.push(result);
                }
                Err(e) => {
                    self.counters.record_skip(e.kind());
                    warn!(symbol = %symbol, error = %e, "symbol skipped");
                    errors.push(format!("{symbol}: {e}"));
                }
            }
        }

        // Stable: equal scores keep scan order.
        results.sort_by(|a, b| b.score.total_cmp(&a.score));

        let summary = ScanSummary {
            total_symbols: attempted,
            candidates_found: results.iter().filter(|r| r.passes_gates).count(),
            regime,
            scan_duration_ms: started.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
            venue_health: BTreeMap::from([(venue, health.status.to_string())]),
            gates_passed: self.gate_pass_counts(&results),
            errors,
        };

        info!(
            total = summary.total_symbols,
            scanned = results.len(),
            candidates = summary.candidates_found,
            errors = summary.errors.len(),
            duration_ms = summary.scan_duration_ms,
            "scan complete"
        );

        Ok(ScanReport { results, summary })
    }

    async fn scan_symbol(
        &self,
        symbol: &str,
        regime: &str,
        cancel: &CancelToken,
    ) -> Result<ScanResult, VenueError> {
        let book = warn_if_slow(
            "get_book_l2",
            self.settings.slow_fetch_warn,
            self.guarded(cancel, self.adapter.get_book_l2(symbol)),
        )
        .await?;
        Counters::incr(&self.counters.books_fetched);

        let metrics = compute_metrics(&book, self.settings.depth_range_pct)?;

        let (volume_24h, volume_source) = match self
            .guarded(cancel, self.adapter.volume_24h(symbol))
            .await
        {
            Ok(v) => (v, "venue"),
            Err(e) => {
                debug!(error = %e, "24h volume unavailable");
                (0.0, "unavailable")
            }
        };

        let score = self.scorer.score(symbol, regime);

        let outcome = self.gates.evaluate(&GateInput {
            score: score.composite,
            spread_bps: metrics.spread_bps,
            depth_usd: metrics.depth_usd,
            vadr: metrics.vadr,
        });

        let now = Utc::now();
        let data_age_ms = (now - book.timestamp).num_milliseconds().max(0) as u64;

        let attribution = BTreeMap::from([
            (
                "source".to_string(),
                format!(
                    "live_{}_{}",
                    self.adapter.name(),
                    book.timestamp.format("%H:%M:%S")
                ),
            ),
            ("regime".to_string(), regime.to_string()),
            ("volume_source".to_string(), volume_source.to_string()),
        ]);

        Ok(ScanResult {
            symbol: symbol.to_string(),
            venue: self.adapter.name().to_string(),
            score: score.composite,
            momentum_core: score.momentum,
            technical_score: score.technical,
            volume_score: score.volume,
            quality_score: score.quality,
            social_score: score.social,
            price: metrics.mid,
            volume_24h,
            spread_bps: metrics.spread_bps,
            depth_usd: metrics.depth_usd,
            vadr: metrics.vadr,
            passes_gates: outcome.passes,
            gate_results: outcome.results,
            timestamp: now,
            data_age_ms,
            attribution,
        })
    }

    /// Bounds a venue call by the fetch timeout and the caller's cancel token.
    async fn guarded<T, F>(&self, cancel: &CancelToken, fut: F) -> Result<T, VenueError>
    where
        F: Future<Output = Result<T, VenueError>>,
    {
        let timeout = self.settings.fetch_timeout;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(VenueError::Cancelled),
            res = tokio::time::timeout(timeout, fut) => {
                res.unwrap_or_else(|_| Err(VenueError::Timeout(timeout.as_millis() as u64)))
            }
        }
    }

    /// Pass count per gate over every measured symbol; gates nobody passed
    /// are reported as 0.
    fn gate_pass_counts(&self, results: &[ScanResult]) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> =
            self.gates.gate_names().map(|g| (g.to_string(), 0)).collect();

        for (gate, passed) in results.iter().flat_map(|r| r.gate_results.iter()) {
            if *passed {
                *counts.entry(gate.clone()).or_default() += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::{DEPTH_MINIMUM, SCORE_THRESHOLD, SPREAD_LIMIT, VADR_THRESHOLD};
    use crate::market::synthetic::{SyntheticFailure, SyntheticVenue};
    use crate::market::types::{BookLevel, OrderBookSnapshot, VenueHealth};
    use crate::scoring::{CompositeScore, StaticRegime, TRENDING_BULL};
    use std::collections::HashMap;
    use tracing_test::traced_test;

    /// Scores looked up from a table; unknown symbols score 0.
    struct TableScorer(HashMap<String, f64>);

    impl TableScorer {
        fn new(entries: &[(&str, f64)]) -> Self {
            Self(entries.iter().map(|(s, v)| (s.to_string(), *v)).collect())
        }
    }

    impl Scorer for TableScorer {
        fn score(&self, symbol: &str, _regime: &str) -> CompositeScore {
            CompositeScore {
                composite: self.0.get(symbol).copied().unwrap_or(0.0),
                ..Default::default()
            }
        }
    }

    fn settings(symbols: &[&str]) -> ScanSettings {
        ScanSettings::new(symbols.iter().map(|s| s.to_string()).collect())
    }

    fn orchestrator(
        venue: Arc<SyntheticVenue>,
        scorer: TableScorer,
        symbols: &[&str],
    ) -> ScanOrchestrator {
        ScanOrchestrator::new(
            venue,
            Arc::new(scorer),
            Arc::new(StaticRegime::new(TRENDING_BULL)),
            settings(symbols),
        )
    }

    fn reference_book() -> OrderBookSnapshot {
        OrderBookSnapshot {
            symbol: "REFUSD".into(),
            venue: "synthetic".into(),
            timestamp: Utc::now(),
            sequence: 1,
            bids: vec![BookLevel::new(100.0, 2.0), BookLevel::new(99.0, 5.0)],
            asks: vec![BookLevel::new(101.0, 1.0), BookLevel::new(102.0, 3.0)],
        }
    }

    #[tokio::test]
    async fn results_are_ranked_and_candidates_counted() {
        let venue = Arc::new(SyntheticVenue::new("synthetic"));
        let scorer = TableScorer::new(&[("BTCUSD", 70.0), ("ETHUSD", 90.0), ("SOLUSD", 80.0)]);
        let mut orch = orchestrator(venue.clone(), scorer, &["BTCUSD", "ETHUSD", "SOLUSD"]);

        let report = orch.run(&CancelToken::new(), &StopHandle::new()).await.unwrap();

        let order: Vec<_> = report.results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, ["ETHUSD", "SOLUSD", "BTCUSD"]);
        assert_eq!(report.summary.total_symbols, 3);
        assert_eq!(report.summary.candidates_found, 2);
        assert_eq!(report.summary.gates_passed[SCORE_THRESHOLD], 2);
        assert_eq!(report.summary.gates_passed[SPREAD_LIMIT], 3);
        assert_eq!(report.summary.regime, TRENDING_BULL);
        assert_eq!(report.summary.venue_health["synthetic"], "healthy");
        assert!(report.summary.errors.is_empty());
        assert_eq!(venue.book_requests(), 3);

        for r in &report.results {
            assert_eq!(r.passes_gates, r.gate_results.values().all(|v| *v));
            assert_eq!(r.attribution["volume_source"], "venue");
            assert!(r.attribution["source"].starts_with("live_synthetic_"));
        }
    }

    #[tokio::test]
    async fn reference_book_fails_depth_gate() {
        let venue = Arc::new(SyntheticVenue::new("synthetic").with_book(reference_book()));
        let mut orch = orchestrator(venue, TableScorer::new(&[("REFUSD", 99.0)]), &["REFUSD"]);

        let report = orch.run(&CancelToken::new(), &StopHandle::new()).await.unwrap();
        let r = &report.results[0];

        assert_eq!(r.price, 100.5);
        assert_eq!(r.depth_usd, 551.0);
        assert!((r.spread_bps - 99.5).abs() < 0.01);
        assert!(!r.gate_results[DEPTH_MINIMUM]);
        assert!(!r.gate_results[SPREAD_LIMIT]);
        assert!(!r.gate_results[VADR_THRESHOLD]);
        assert!(r.gate_results[SCORE_THRESHOLD]);
        assert!(!r.passes_gates);
        assert_eq!(report.summary.candidates_found, 0);
        assert_eq!(report.summary.gates_passed[DEPTH_MINIMUM], 0);
    }

    #[tokio::test]
    #[traced_test]
    async fn failing_symbols_are_skipped_and_recorded() {
        let mut empty = reference_book();
        empty.symbol = "EMPTYUSD".into();
        empty.asks.clear();

        let venue = Arc::new(
            SyntheticVenue::new("synthetic")
                .with_book(empty)
                .with_failure("ADAUSD", SyntheticFailure::Timeout)
                .with_failure("DOTUSD", SyntheticFailure::Malformed("bad level".into())),
        );
        let counters = Counters::default();
        let mut orch = orchestrator(
            venue,
            TableScorer::new(&[("ETHUSD", 90.0)]),
            &["EMPTYUSD", "ADAUSD", "ETHUSD", "DOTUSD"],
        )
        .with_counters(counters.clone());

        let report = orch.run(&CancelToken::new(), &StopHandle::new()).await.unwrap();

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].symbol, "ETHUSD");
        assert_eq!(report.summary.total_symbols, 4);
        assert_eq!(report.summary.errors.len(), 3);
        assert!(report.summary.errors[0].starts_with("EMPTYUSD: empty order book"));
        assert!(report.summary.errors[1].starts_with("ADAUSD: request timed out"));
        assert!(report.summary.errors[2].starts_with("DOTUSD: malformed data"));

        assert_eq!(Counters::get(&counters.skip_empty_book), 1);
        assert_eq!(Counters::get(&counters.skip_network), 1);
        assert_eq!(Counters::get(&counters.skip_malformed), 1);
        assert_eq!(Counters::get(&counters.books_fetched), 1);
        assert!(logs_contain("symbol skipped"));
    }

    #[tokio::test]
    async fn unhealthy_venue_aborts_before_any_fetch() {
        let venue = Arc::new(
            SyntheticVenue::new("synthetic").with_health(VenueHealth::unhealthy("maintenance")),
        );
        let mut orch = orchestrator(venue.clone(), TableScorer::new(&[]), &["BTCUSD", "ETHUSD"]);

        let err = orch
            .run(&CancelToken::new(), &StopHandle::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::VenueUnhealthy { ref venue, .. } if venue == "synthetic"));
        assert_eq!(venue.book_requests(), 0);
    }

    #[tokio::test]
    async fn degraded_venue_still_scans() {
        let venue = Arc::new(
            SyntheticVenue::new("synthetic").with_health(VenueHealth::degraded("high latency")),
        );
        let mut orch = orchestrator(venue, TableScorer::new(&[]), &["BTCUSD"]);

        let report = orch.run(&CancelToken::new(), &StopHandle::new()).await.unwrap();
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.summary.venue_health["synthetic"], "degraded");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_times_out_and_run_continues() {
        let venue = Arc::new(SyntheticVenue::new("synthetic").with_latency(Duration::from_secs(30)));
        let mut settings = settings(&["BTCUSD", "ETHUSD"]);
        settings.fetch_timeout = Duration::from_secs(1);

        let mut orch = ScanOrchestrator::new(
            venue.clone(),
            Arc::new(TableScorer::new(&[])),
            Arc::new(StaticRegime::new(TRENDING_BULL)),
            settings,
        );

        let report = orch.run(&CancelToken::new(), &StopHandle::new()).await.unwrap();

        assert!(report.results.is_empty());
        assert_eq!(report.summary.errors.len(), 2);
        assert!(report.summary.errors[0].contains("timed out after 1000 ms"));
        assert_eq!(venue.book_requests(), 2);
    }

    #[tokio::test]
    async fn cancelled_fetches_are_skipped_without_ending_the_run() {
        let venue = Arc::new(SyntheticVenue::new("synthetic").with_latency(Duration::from_secs(30)));
        let mut orch = orchestrator(venue.clone(), TableScorer::new(&[]), &["BTCUSD", "ETHUSD"]);

        let cancel = CancelToken::new();
        cancel.cancel();

        let report = orch.run(&cancel, &StopHandle::new()).await.unwrap();

        assert_eq!(report.summary.total_symbols, 2);
        assert_eq!(report.summary.errors.len(), 2);
        assert!(report.summary.errors.iter().all(|e| e.ends_with("request cancelled")));
        assert_eq!(venue.book_requests(), 0);
    }

    #[tokio::test]
    async fn stop_ends_the_loop_between_symbols() {
        let venue = Arc::new(SyntheticVenue::new("synthetic"));
        let mut orch = orchestrator(venue.clone(), TableScorer::new(&[]), &["BTCUSD", "ETHUSD"]);

        let stop = StopHandle::new();
        stop.request_stop();

        let report = orch.run(&CancelToken::new(), &stop).await.unwrap();

        assert_eq!(report.summary.total_symbols, 0);
        assert!(report.results.is_empty());
        assert_eq!(venue.book_requests(), 0);
    }

    #[tokio::test]
    async fn equal_scores_keep_scan_order() {
        let venue = Arc::new(SyntheticVenue::new("synthetic"));
        let scorer = TableScorer::new(&[("LTCUSD", 80.0), ("AVAXUSD", 80.0), ("UNIUSD", 80.0)]);
        let mut orch = orchestrator(venue, scorer, &["LTCUSD", "AVAXUSD", "UNIUSD"]);

        let report = orch.run(&CancelToken::new(), &StopHandle::new()).await.unwrap();
        let order: Vec<_> = report.results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, ["LTCUSD", "AVAXUSD", "UNIUSD"]);
    }

    #[tokio::test]
    async fn repeated_runs_produce_identical_gate_outcomes() {
        let venue = Arc::new(SyntheticVenue::new("synthetic"));
        let scorer = TableScorer::new(&[("BTCUSD", 76.0), ("ETHUSD", 60.0)]);
        let mut orch = orchestrator(venue, scorer, &["BTCUSD", "ETHUSD"]);

        let a = orch.run(&CancelToken::new(), &StopHandle::new()).await.unwrap();
        let b = orch.run(&CancelToken::new(), &StopHandle::new()).await.unwrap();

        for (x, y) in a.results.iter().zip(&b.results) {
            assert_eq!(x.gate_results, y.gate_results);
            assert_eq!(x.passes_gates, y.passes_gates);
        }
    }
}
