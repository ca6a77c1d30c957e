//! Watchlist service client.

mod trakt;

pub use trakt::TraktClient;

use thiserror::Error;

use crate::transport::TransportError;

#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error("Failed to create HTTP client: {0}")]
    ClientInit(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
