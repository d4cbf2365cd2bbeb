//! Persistence contracts for cached rates and the pair registry

use super::rate::{PairKey, RateEntry, TradingPair};
use anyhow::Result;
use async_trait::async_trait;

/// Key-value table of rate rows keyed by `(from_denom, to_denom)`.
#[async_trait]
pub trait RateStore: Send + Sync {
    async fn read(&self, pair: &PairKey) -> Result<Option<RateEntry>>;

    /// Inserts or replaces the row for the entry's pair in a single write.
    async fn upsert(&self, entry: RateEntry) -> Result<()>;

    /// All rows, fresh or stale, ordered by pair.
    async fn entries(&self) -> Result<Vec<RateEntry>>;
}

/// Set of pairs the warmer keeps fresh.
#[async_trait]
pub trait PairRegistry: Send + Sync {
    /// Up to `limit` active pairs, in a stable order.
    async fn active_pairs(&self, limit: usize) -> Result<Vec<PairKey>>;

    async fn register(&self, pair: TradingPair) -> Result<()>;
}
