use std::sync::Arc;

use common::logger::{TraceId, init_logger, root_span};
use scanner::{
    config::{ScanConfig, VenueKind},
    gates::GateEvaluator,
    market::{ExchangeAdapter, kraken::KrakenClient, synthetic::SyntheticVenue},
    metrics::counters::Counters,
    scan::{CancelToken, ScanOrchestrator, StopHandle},
    scoring::{StaticRegime, SymbolSeedScorer},
    sink::ResultSink,
};
use tracing::Instrument;

/// Candidates echoed to the log after a run.
const TOP_N: usize = 5;

fn build_adapter(cfg: &ScanConfig) -> anyhow::Result<Arc<dyn ExchangeAdapter>> {
    Ok(match cfg.venue {
        VenueKind::Kraken => Arc::new(KrakenClient::new(
            cfg.kraken_http_endpoint.clone(),
            cfg.fetch_timeout,
        )?),
        VenueKind::Synthetic => Arc::new(SyntheticVenue::new("synthetic")),
    })
}

/// First Ctrl-C cancels the in-flight fetch and stops the loop; the
/// summary of what was scanned so far is still written.
fn spawn_shutdown_listener(cancel: CancelToken, stop: StopHandle) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("shutdown signal received; stopping scan");
            stop.request_stop();
            cancel.cancel();
        }
    });
}

async fn run(cfg: ScanConfig) -> anyhow::Result<()> {
    let adapter = build_adapter(&cfg)?;
    scan(&cfg, adapter).await
}

/// One scan against `adapter`, persisted to `cfg.output_dir`. Any error here
/// ends the process with a non-zero status.
async fn scan(cfg: &ScanConfig, adapter: Arc<dyn ExchangeAdapter>) -> anyhow::Result<()> {
    tracing::Span::current().record("venue", adapter.name());

    let counters = Counters::default();
    let mut orchestrator = ScanOrchestrator::new(
        adapter,
        Arc::new(SymbolSeedScorer::new()),
        Arc::new(StaticRegime::new(cfg.regime.clone())),
        cfg.settings(),
    )
    .with_gates(GateEvaluator::new(cfg.thresholds))
    .with_pacer(cfg.pacing.build())
    .with_counters(counters.clone());

    let cancel = CancelToken::new();
    let stop = StopHandle::new();
    spawn_shutdown_listener(cancel.clone(), stop.clone());

    let report = orchestrator.run(&cancel, &stop).await?;

    ResultSink::new(&cfg.output_dir).write(&report).await?;

    for (rank, c) in report.candidates().take(TOP_N).enumerate() {
        tracing::info!(
            rank = rank + 1,
            symbol = %c.symbol,
            score = c.score,
            spread_bps = c.spread_bps,
            depth_usd = c.depth_usd,
            vadr = c.vadr,
            "top candidate"
        );
    }

    tracing::info!(
        attempted = Counters::get(&counters.symbols_attempted),
        books = Counters::get(&counters.books_fetched),
        candidates = Counters::get(&counters.candidates),
        skip_network = Counters::get(&counters.skip_network),
        skip_malformed = Counters::get(&counters.skip_malformed),
        skip_empty_book = Counters::get(&counters.skip_empty_book),
        "scan counters"
    );

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = ScanConfig::from_env()?;
    init_logger("scanner", cfg.json_logs);

    let trace_id = TraceId::default();
    let span = root_span("scan_run", &trace_id);

    tracing::info!(
        trace_id = %trace_id,
        symbols = cfg.symbols.len(),
        output_dir = %cfg.output_dir.display(),
        "Starting scanner..."
    );

    if let Err(e) = run(cfg).instrument(span).await {
        tracing::error!(error = %e, trace_id = %trace_id, "scan failed");
        return Err(e);
    }

    Ok(())
}
