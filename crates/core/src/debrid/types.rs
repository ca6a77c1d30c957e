use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sources::{HeldItem, HeldStatus};
use crate::transport::TransportError;

/// Errors that can occur talking to the debrid service.
#[derive(Debug, Error)]
pub enum DebridError {
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

/// A torrent as listed by `GET /torrents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebridTorrent {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub progress: f64,
    pub status: String,
}

impl From<DebridTorrent> for HeldItem {
    fn from(torrent: DebridTorrent) -> Self {
        HeldItem {
            status: HeldStatus::from_remote(&torrent.status),
            id: torrent.id,
            filename: torrent.filename,
        }
    }
}

/// Body of a successful `POST /torrents/addMagnet`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddMagnetResponse {
    pub id: String,
    #[serde(default)]
    pub uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_torrent_list() {
        let json = r#"[
            {"id":"ABC","filename":"Movie.2020.1080p.mkv","hash":"aa","bytes":123,
             "host":"real-debrid.com","split":2000,"progress":100,"status":"downloaded",
             "added":"2024-01-01T00:00:00.000Z","links":[]},
            {"id":"DEF","filename":"Show.S01E01.720p.mkv","status":"magnet_conversion"}
        ]"#;
        let torrents: Vec<DebridTorrent> = serde_json::from_str(json).unwrap();
        assert_eq!(torrents.len(), 2);

        let items: Vec<HeldItem> = torrents.into_iter().map(HeldItem::from).collect();
        assert_eq!(items[0].id, "ABC");
        assert_eq!(items[0].status, HeldStatus::Downloaded);
        assert_eq!(items[1].status, HeldStatus::MagnetConversion);
    }

    #[test]
    fn test_error_display() {
        let err = DebridError::ApiError {
            status: 503,
            message: "service_unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "API error (HTTP 503): service_unavailable");

        let err = DebridError::from(TransportError::Timeout);
        assert_eq!(err.to_string(), "Request timeout");
    }
}
