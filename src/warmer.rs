//! Proactive refresh of every registered pair

use crate::core::config::{CacheConfig, WarmerConfig};
use crate::core::{Clock, PairKey, PairRegistry, QuoteSource, RateError, RateStore, SystemClock};
use crate::refresh::refresh_pair;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Serialize)]
pub struct PairFailure {
    pub pair: PairKey,
    pub kind: &'static str,
    pub error: String,
}

/// Outcome of one warm cycle. Partial completion is a normal result.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WarmReport {
    pub attempted: usize,
    pub warmed: usize,
    pub failed: Vec<PairFailure>,
}

#[derive(Clone)]
pub struct CacheWarmer {
    store: Arc<dyn RateStore>,
    registry: Arc<dyn PairRegistry>,
    source: Arc<dyn QuoteSource>,
    clock: Arc<dyn Clock>,
    ttl_seconds: u64,
    batch_size: usize,
    concurrency: usize,
}

impl CacheWarmer {
    pub fn new(
        store: Arc<dyn RateStore>,
        registry: Arc<dyn PairRegistry>,
        source: Arc<dyn QuoteSource>,
        cache: &CacheConfig,
        warmer: &WarmerConfig,
    ) -> Self {
        CacheWarmer {
            store,
            registry,
            source,
            clock: Arc::new(SystemClock),
            ttl_seconds: cache.default_ttl_seconds,
            batch_size: warmer.batch_size,
            concurrency: warmer.concurrency.max(1),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Refreshes up to `batch_size` active pairs with the default TTL.
    ///
    /// Only a registry read failure fails the cycle. Each pair succeeds or is
    /// skipped on its own; skipped pairs keep whatever row they had.
    #[instrument(name = "WarmAll", skip(self))]
    pub async fn warm_all(&self) -> Result<WarmReport, RateError> {
        let pairs = self
            .registry
            .active_pairs(self.batch_size)
            .await
            .map_err(RateError::Store)?;
        info!("Warming {} pairs", pairs.len());

        let outcomes: Vec<(PairKey, Result<(), RateError>)> = stream::iter(pairs)
            .map(|pair| async move {
                let result = refresh_pair(
                    self.store.as_ref(),
                    self.source.as_ref(),
                    self.clock.as_ref(),
                    &pair,
                    self.ttl_seconds,
                )
                .await
                .map(|_| ());
                (pair, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = WarmReport {
            attempted: outcomes.len(),
            ..WarmReport::default()
        };
        for (pair, result) in outcomes {
            match result {
                Ok(()) => report.warmed += 1,
                Err(e) => {
                    warn!(pair = %pair, kind = e.kind(), "Skipping pair: {}", e);
                    report.failed.push(PairFailure {
                        pair,
                        kind: e.kind(),
                        error: e.to_string(),
                    });
                }
            }
        }
        // Keep failure listings stable regardless of completion order
        report.failed.sort_by(|a, b| a.pair.cmp(&b.pair));

        info!(
            attempted = report.attempted,
            warmed = report.warmed,
            failed = report.failed.len(),
            "Warm cycle finished"
        );
        Ok(report)
    }
}
