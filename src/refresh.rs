//! Fetch-validate-write step shared by the reader and the warmer

use crate::core::{Clock, PairKey, QuoteSource, RateEntry, RateError, RateStore};
use tracing::debug;

/// Fetches a quote for `pair` and writes it back with a fresh expiry.
///
/// Nothing is written unless the quote is valid. The write is one upsert, so
/// abandoning the returned future never leaves a partial row behind.
pub async fn refresh_pair(
    store: &dyn RateStore,
    source: &dyn QuoteSource,
    clock: &dyn Clock,
    pair: &PairKey,
    ttl_seconds: u64,
) -> Result<RateEntry, RateError> {
    let quote = source.fetch_quote(pair).await?;
    quote.validate()?;

    let entry = RateEntry::from_quote(pair, quote, source.name(), clock.now(), ttl_seconds)?;
    store
        .upsert(entry.clone())
        .await
        .map_err(RateError::Store)?;
    debug!(pair = %pair, expires_at = %entry.expires_at, "Rate refreshed");
    Ok(entry)
}
