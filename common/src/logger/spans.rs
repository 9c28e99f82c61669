use std::time::{Duration, Instant};

use tracing::{Span, field};

use super::TraceId;

/// Root span for a job (one scan run).
pub fn root_span(name: &'static str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "root",
        name = %name,
        trace_id = %trace_id.as_str(),
        venue = field::Empty
    )
}

/// Child span for a unit of work inside a job; inherits the trace id.
pub fn child_span(name: &'static str, symbol: &str) -> Span {
    tracing::info_span!("child", name = %name, symbol = %symbol)
}

/// Awaits `fut` and emits a `performance` warning when it takes longer than `max`.
pub async fn warn_if_slow<F, T>(label: &'static str, max: Duration, fut: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let start = Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed();
    if elapsed > max {
        tracing::warn!(
            target: "performance",
            label = label,
            elapsed_ms = elapsed.as_millis() as u64,
            "slow operation detected"
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn warn_if_slow_passes_through_output() {
        let out = warn_if_slow("noop", Duration::from_secs(1), async { 7 }).await;
        assert_eq!(out, 7);
    }
}
