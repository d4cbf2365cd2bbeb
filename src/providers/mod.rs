pub mod vps;

pub use vps::VpsQuoteSource;
