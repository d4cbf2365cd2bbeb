//! Terminal output for the command line

pub mod rates;
pub mod setup;
pub mod ui;
