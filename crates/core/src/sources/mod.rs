//! Collaborator boundary of the engine.
//!
//! The runners only talk to the outside world through these traits, so the
//! hash-list index, debrid client and watchlist client can be swapped for
//! the mocks in `crate::testing`.

mod types;

pub use types::*;
