//! On-demand rate lookup backed by the rate store

use crate::core::config::CacheConfig;
use crate::core::{
    Clock, PairKey, QuoteSource, RateError, RateLookup, RateStore, SystemClock, validate_ttl,
};
use crate::refresh::refresh_pair;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Lookup request. Denominations are optional here so that a missing field is
/// reported as a validation error rather than a parse failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RateRequest {
    pub from_denom: Option<String>,
    pub to_denom: Option<String>,
    pub ttl_seconds: Option<u64>,
}

impl RateRequest {
    pub fn new(from_denom: &str, to_denom: &str) -> Self {
        RateRequest {
            from_denom: Some(from_denom.to_string()),
            to_denom: Some(to_denom.to_string()),
            ttl_seconds: None,
        }
    }

    pub fn with_ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = Some(ttl_seconds);
        self
    }
}

#[derive(Clone)]
pub struct RateReader {
    store: Arc<dyn RateStore>,
    source: Arc<dyn QuoteSource>,
    clock: Arc<dyn Clock>,
    default_ttl_seconds: u64,
}

impl RateReader {
    pub fn new(store: Arc<dyn RateStore>, source: Arc<dyn QuoteSource>, config: &CacheConfig) -> Self {
        RateReader {
            store,
            source,
            clock: Arc::new(SystemClock),
            default_ttl_seconds: config.default_ttl_seconds,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns a fresh rate for the requested pair, fetching and caching it on
    /// a miss or when the cached row has expired.
    ///
    /// A failed fetch is reported as is; stale rows are never served in its
    /// place.
    #[instrument(
        name = "GetRate",
        skip(self, request),
        fields(from = ?request.from_denom, to = ?request.to_denom)
    )]
    pub async fn get_rate(&self, request: &RateRequest) -> Result<RateLookup, RateError> {
        let pair = PairKey::from_request(request.from_denom.as_deref(), request.to_denom.as_deref())?;
        let ttl_seconds = match request.ttl_seconds {
            Some(ttl) => validate_ttl(ttl)?,
            None => self.default_ttl_seconds,
        };

        self.lookup(&pair, ttl_seconds).await
    }

    async fn lookup(&self, pair: &PairKey, ttl_seconds: u64) -> Result<RateLookup, RateError> {
        match self.store.read(pair).await.map_err(RateError::Store)? {
            Some(entry) if entry.is_fresh(self.clock.now()) => {
                debug!("Cache HIT for pair: {}", pair);
                return Ok(RateLookup::cached(entry));
            }
            Some(entry) => {
                debug!(expires_at = %entry.expires_at, "Cache STALE for pair: {}", pair);
            }
            None => debug!("Cache MISS for pair: {}", pair),
        }

        let entry = refresh_pair(
            self.store.as_ref(),
            self.source.as_ref(),
            self.clock.as_ref(),
            pair,
            ttl_seconds,
        )
        .await?;
        info!(pair = %pair, rate = entry.rate, ttl_seconds, "Fetched and cached rate");
        Ok(RateLookup::fetched(entry, ttl_seconds))
    }
}
