//! Scripted collaborators for unit tests

use crate::core::{PairKey, PairRegistry, Quote, QuoteSource, RateEntry, RateError, RateStore, TradingPair};
use crate::store::memory::MemoryRateStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, Clone)]
pub enum Reply {
    Quote(Quote),
    /// Answers after the given delay
    Slow(Quote, Duration),
    Unavailable,
    Invalid,
}

pub fn quote(rate: f64) -> Quote {
    Quote {
        rate,
        path: None,
        liquidity: None,
    }
}

/// Quote source answering from a per-pair script and counting calls.
#[derive(Default)]
pub struct MockQuoteSource {
    replies: Mutex<HashMap<PairKey, Reply>>,
    calls: AtomicUsize,
}

impl MockQuoteSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, pair: PairKey, reply: Reply) {
        self.replies.lock().unwrap().insert(pair, reply);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for MockQuoteSource {
    fn name(&self) -> &str {
        "MOCK"
    }

    async fn fetch_quote(&self, pair: &PairKey) -> Result<Quote, RateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.replies.lock().unwrap().get(pair).cloned();
        match reply {
            Some(Reply::Quote(q)) => Ok(q),
            Some(Reply::Slow(q, delay)) => {
                tokio::time::sleep(delay).await;
                Ok(q)
            }
            Some(Reply::Invalid) => Err(RateError::InvalidUpstreamResponse(
                "rate is not a number".to_string(),
            )),
            Some(Reply::Unavailable) | None => Err(RateError::UpstreamUnavailable(format!(
                "500 Internal Server Error for {pair}"
            ))),
        }
    }
}

/// Memory store that counts I/O and can be told to fail.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryRateStore,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_registry: AtomicBool,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn seed(&self, entry: RateEntry) {
        self.inner.upsert(entry).await.unwrap();
    }

    pub async fn row(&self, pair: &PairKey) -> Option<RateEntry> {
        self.inner.read(pair).await.unwrap()
    }
}

#[async_trait]
impl RateStore for CountingStore {
    async fn read(&self, pair: &PairKey) -> Result<Option<RateEntry>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow!("connection reset"));
        }
        self.inner.read(pair).await
    }

    async fn upsert(&self, entry: RateEntry) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("write rejected"));
        }
        self.inner.upsert(entry).await
    }

    async fn entries(&self) -> Result<Vec<RateEntry>> {
        self.inner.entries().await
    }
}

#[async_trait]
impl PairRegistry for CountingStore {
    async fn active_pairs(&self, limit: usize) -> Result<Vec<PairKey>> {
        if self.fail_registry.load(Ordering::SeqCst) {
            return Err(anyhow!("registry unavailable"));
        }
        self.inner.active_pairs(limit).await
    }

    async fn register(&self, pair: TradingPair) -> Result<()> {
        self.inner.register(pair).await
    }
}
