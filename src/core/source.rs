//! Upstream quote source abstraction

use super::error::RateError;
use super::rate::{PairKey, Quote};
use async_trait::async_trait;

#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Tag recorded as the `source` of every row this source produces.
    fn name(&self) -> &str;

    /// Fetches one quote. Implementations must not retry and must never turn a
    /// failure into a default rate.
    async fn fetch_quote(&self, pair: &PairKey) -> Result<Quote, RateError>;
}
