//! Upgrade scanner: finds better releases for content already held.

mod scanner;
mod types;

pub use scanner::{find_upgrades, release_label, UpgradeScanner};
pub use types::*;
