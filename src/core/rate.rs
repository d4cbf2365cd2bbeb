//! Rate cache entries and the quote types flowing through the cache

use super::error::RateError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Ordered denomination pair. `(A, B)` and `(B, A)` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    pub from_denom: String,
    pub to_denom: String,
}

impl PairKey {
    pub fn new(from_denom: impl Into<String>, to_denom: impl Into<String>) -> Self {
        PairKey {
            from_denom: from_denom.into(),
            to_denom: to_denom.into(),
        }
    }

    /// Builds a key from request fields, rejecting missing or blank denominations.
    pub fn from_request(from_denom: Option<&str>, to_denom: Option<&str>) -> Result<Self, RateError> {
        match (
            from_denom.map(str::trim).filter(|d| !d.is_empty()),
            to_denom.map(str::trim).filter(|d| !d.is_empty()),
        ) {
            (Some(from), Some(to)) => Ok(PairKey::new(from, to)),
            _ => Err(RateError::Validation(
                "from_denom and to_denom required".to_string(),
            )),
        }
    }
}

impl Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.from_denom, self.to_denom)
    }
}

/// A quote as returned by the upstream source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub rate: f64,
    pub path: Option<Vec<String>>,
    pub liquidity: Option<f64>,
}

impl Quote {
    pub fn validate(&self) -> Result<(), RateError> {
        if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(RateError::InvalidUpstreamResponse(format!(
                "rate must be a finite positive number, got {}",
                self.rate
            )));
        }
        if let Some(liquidity) = self.liquidity {
            if !liquidity.is_finite() || liquidity < 0.0 {
                return Err(RateError::InvalidUpstreamResponse(format!(
                    "liquidity must be a finite non-negative number, got {liquidity}"
                )));
            }
        }
        Ok(())
    }
}

/// Longest TTL a row may carry, one year.
pub const MAX_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Accepts TTLs in `1..=MAX_TTL_SECONDS`.
pub fn validate_ttl(ttl_seconds: u64) -> Result<u64, RateError> {
    if ttl_seconds == 0 || ttl_seconds > MAX_TTL_SECONDS {
        return Err(RateError::Validation(format!(
            "ttl_seconds must be between 1 and {MAX_TTL_SECONDS}, got {ttl_seconds}"
        )));
    }
    Ok(ttl_seconds)
}

/// One cached row per ordered pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    pub from_denom: String,
    pub to_denom: String,
    pub rate: f64,
    pub path: Option<Vec<String>>,
    pub liquidity: Option<f64>,
    pub source: String,
    pub expires_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RateEntry {
    /// Builds the row written after a successful fetch. Fails unless
    /// `now + ttl_seconds` is representable and strictly after `now`.
    pub fn from_quote(
        key: &PairKey,
        quote: Quote,
        source: &str,
        now: DateTime<Utc>,
        ttl_seconds: u64,
    ) -> Result<Self, RateError> {
        let expires_at = i64::try_from(ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .filter(|expires_at| *expires_at > now)
            .ok_or_else(|| {
                RateError::Validation(format!("ttl_seconds {ttl_seconds} is out of range"))
            })?;

        Ok(RateEntry {
            from_denom: key.from_denom.clone(),
            to_denom: key.to_denom.clone(),
            rate: quote.rate,
            path: quote.path,
            liquidity: quote.liquidity,
            source: source.to_string(),
            expires_at,
            updated_at: now,
        })
    }

    pub fn key(&self) -> PairKey {
        PairKey::new(self.from_denom.clone(), self.to_denom.clone())
    }

    /// Fresh iff the expiry lies strictly after `now`. Rows with a non-finite
    /// rate are never served.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now && self.rate.is_finite()
    }
}

/// Reader response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLookup {
    pub rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<f64>,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
}

impl RateLookup {
    pub fn cached(entry: RateEntry) -> Self {
        RateLookup {
            rate: entry.rate,
            path: entry.path,
            liquidity: entry.liquidity,
            cached: true,
            ttl: None,
        }
    }

    pub fn fetched(entry: RateEntry, ttl_seconds: u64) -> Self {
        RateLookup {
            rate: entry.rate,
            path: entry.path,
            liquidity: entry.liquidity,
            cached: false,
            ttl: Some(ttl_seconds),
        }
    }
}

/// Registry row describing a pair the warmer keeps fresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingPair {
    pub from_denom: String,
    pub to_denom: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl TradingPair {
    pub fn key(&self) -> PairKey {
        PairKey::new(self.from_denom.clone(), self.to_denom.clone())
    }
}
