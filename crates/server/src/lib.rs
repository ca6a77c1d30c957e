//! HTTP service exposing the hashsync engine and runners.

pub mod api;
pub mod metrics;
pub mod state;
