use crate::universe::WarmOptions;
use futures::StreamExt;
use stockpick_core::recommend::RecommendationEngine;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarmReport {
    pub total: usize,
    pub cached: usize,
    pub failed: Vec<String>,
}

/// Fetches details for every symbol so the engine's cache holds a fresh entry.
pub async fn warm_cache(
    engine: &RecommendationEngine,
    symbols: &[String],
    opts: &WarmOptions,
) -> WarmReport {
    let total = symbols.len();
    let mut report = WarmReport {
        total,
        ..WarmReport::default()
    };
    let t0 = std::time::Instant::now();

    let mut results = futures::stream::iter(symbols.iter().cloned())
        .map(|symbol| async move {
            let ok = engine.stock_details(&symbol).await.is_some();
            (symbol, ok)
        })
        .buffer_unordered(opts.concurrency);

    let mut done = 0usize;
    while let Some((symbol, ok)) = results.next().await {
        done += 1;
        if ok {
            report.cached += 1;
        } else {
            report.failed.push(symbol);
        }
        if done % opts.progress_every == 0 || done == total {
            tracing::info!(
                done,
                total,
                cached = report.cached,
                failed = report.failed.len(),
                elapsed_ms = t0.elapsed().as_millis(),
                "cache warm progress"
            );
        }
    }

    report.failed.sort();
    report
}
