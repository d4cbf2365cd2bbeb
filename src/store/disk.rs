use crate::core::rate::{PairKey, RateEntry, TradingPair};
use crate::core::store::{PairRegistry, RateStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use std::path::Path;
use tracing::debug;

const RATES_PARTITION: &str = "rates";
const PAIRS_PARTITION: &str = "pairs";

/// Rate table and pair registry persisted in a fjall keyspace.
///
/// Rows are keyed by the JSON encoding of `(from_denom, to_denom)` and stored as
/// JSON. An upsert is a single `insert`, so a row is either fully replaced or
/// left untouched.
pub struct DiskRateStore {
    _keyspace: Keyspace,
    rates: PartitionHandle,
    pairs: PartitionHandle,
}

impl DiskRateStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create store directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open keyspace at {}", path.display()))?;
        let rates = keyspace.open_partition(RATES_PARTITION, PartitionCreateOptions::default())?;
        let pairs = keyspace.open_partition(PAIRS_PARTITION, PartitionCreateOptions::default())?;
        debug!("Opened rate store at {}", path.display());

        Ok(Self {
            _keyspace: keyspace,
            rates,
            pairs,
        })
    }
}

fn encode_key(pair: &PairKey) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&(&pair.from_denom, &pair.to_denom))?)
}

#[async_trait]
impl RateStore for DiskRateStore {
    async fn read(&self, pair: &PairKey) -> Result<Option<RateEntry>> {
        let Some(value) = self
            .rates
            .get(encode_key(pair)?)
            .with_context(|| format!("Failed to read rate for {pair}"))?
        else {
            debug!("Store MISS for pair: {}", pair);
            return Ok(None);
        };

        let entry: RateEntry = serde_json::from_slice(&value)
            .with_context(|| format!("Corrupt rate row for {pair}"))?;
        debug!("Store HIT for pair: {}", pair);
        Ok(Some(entry))
    }

    async fn upsert(&self, entry: RateEntry) -> Result<()> {
        let key = entry.key();
        self.rates
            .insert(encode_key(&key)?, serde_json::to_vec(&entry)?)
            .with_context(|| format!("Failed to write rate for {key}"))?;
        debug!("Store PUT for pair: {}", key);
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<RateEntry>> {
        self.rates
            .iter()
            .map(|kv| -> Result<RateEntry> {
                let (_, value) = kv.context("Failed to scan rate store")?;
                Ok(serde_json::from_slice(&value)?)
            })
            .collect()
    }
}

#[async_trait]
impl PairRegistry for DiskRateStore {
    async fn active_pairs(&self, limit: usize) -> Result<Vec<PairKey>> {
        let mut active = Vec::new();
        for kv in self.pairs.iter() {
            if active.len() >= limit {
                break;
            }
            let (_, value) = kv.context("Failed to read pair registry")?;
            let pair: TradingPair = serde_json::from_slice(&value)?;
            if pair.is_active {
                active.push(pair.key());
            }
        }
        Ok(active)
    }

    async fn register(&self, pair: TradingPair) -> Result<()> {
        let key = pair.key();
        self.pairs
            .insert(encode_key(&key)?, serde_json::to_vec(&pair)?)
            .with_context(|| format!("Failed to register pair {key}"))?;
        debug!("Registered pair {} (active: {})", key, pair.is_active);
        Ok(())
    }
}
