//! Watchlist reconciliation: search, select and submit per watchlist item.

mod runner;
mod types;

pub use runner::{strategy_for, SyncRunner};
pub use types::*;
