//! Debrid download service client.
//!
//! Implements both the held-content source and the submission sink over a
//! Real-Debrid style REST API.

mod client;
mod types;

pub use client::DebridClient;
pub use types::*;
