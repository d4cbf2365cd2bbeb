//! Core abstractions shared by the reader and the warmer

pub mod clock;
pub mod config;
pub mod error;
pub mod log;
pub mod rate;
pub mod source;
pub mod store;

// Re-export main types for cleaner imports
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::RateError;
pub use rate::{MAX_TTL_SECONDS, PairKey, Quote, RateEntry, RateLookup, TradingPair, validate_ttl};
pub use source::QuoteSource;
pub use store::{PairRegistry, RateStore};
