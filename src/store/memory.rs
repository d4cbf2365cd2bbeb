use crate::core::rate::{PairKey, RateEntry, TradingPair};
use crate::core::store::{PairRegistry, RateStore};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory rate table and pair registry. Contents are lost on exit.
#[derive(Clone, Default)]
pub struct MemoryRateStore {
    rates: Arc<Mutex<BTreeMap<PairKey, RateEntry>>>,
    pairs: Arc<Mutex<BTreeMap<PairKey, TradingPair>>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn read(&self, pair: &PairKey) -> Result<Option<RateEntry>> {
        let rates = self.rates.lock().await;
        let entry = rates.get(pair).cloned();
        if entry.is_some() {
            debug!("Store HIT for pair: {}", pair);
        } else {
            debug!("Store MISS for pair: {}", pair);
        }
        Ok(entry)
    }

    async fn upsert(&self, entry: RateEntry) -> Result<()> {
        let key = entry.key();
        let mut rates = self.rates.lock().await;
        debug!("Store PUT for pair: {}", key);
        rates.insert(key, entry);
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<RateEntry>> {
        let rates = self.rates.lock().await;
        Ok(rates.values().cloned().collect())
    }
}

#[async_trait]
impl PairRegistry for MemoryRateStore {
    async fn active_pairs(&self, limit: usize) -> Result<Vec<PairKey>> {
        let pairs = self.pairs.lock().await;
        Ok(pairs
            .values()
            .filter(|p| p.is_active)
            .take(limit)
            .map(TradingPair::key)
            .collect())
    }

    async fn register(&self, pair: TradingPair) -> Result<()> {
        let mut pairs = self.pairs.lock().await;
        pairs.insert(pair.key(), pair);
        Ok(())
    }
}
