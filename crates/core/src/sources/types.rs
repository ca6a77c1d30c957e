use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metadata::{Candidate, ContentType};

/// Failure reported by a collaborator, tagged by the operation that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("Search failed: {0}")]
    Search(String),

    #[error("Listing held items failed: {0}")]
    List(String),

    #[error("Submission failed: {0}")]
    Submit(String),

    #[error("Removal failed: {0}")]
    Remove(String),

    #[error("Watchlist fetch failed: {0}")]
    Watchlist(String),
}

/// Status of a held item as reported by the download service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeldStatus {
    Downloaded,
    Downloading,
    Queued,
    MagnetConversion,
    WaitingFilesSelection,
    Error,
    Unknown,
}

impl HeldStatus {
    /// Map a remote status string. Unrecognized strings become `Unknown`.
    pub fn from_remote(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "downloaded" => HeldStatus::Downloaded,
            "downloading" => HeldStatus::Downloading,
            "queued" => HeldStatus::Queued,
            "magnet_conversion" => HeldStatus::MagnetConversion,
            "waiting_files_selection" => HeldStatus::WaitingFilesSelection,
            "error" | "magnet_error" | "virus" | "dead" => HeldStatus::Error,
            _ => HeldStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HeldStatus::Downloaded => "downloaded",
            HeldStatus::Downloading => "downloading",
            HeldStatus::Queued => "queued",
            HeldStatus::MagnetConversion => "magnet_conversion",
            HeldStatus::WaitingFilesSelection => "waiting_files_selection",
            HeldStatus::Error => "error",
            HeldStatus::Unknown => "unknown",
        }
    }

    /// Only fully downloaded items are checked for upgrades.
    pub fn is_scan_eligible(&self) -> bool {
        matches!(self, HeldStatus::Downloaded)
    }
}

/// One item currently held by the download service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeldItem {
    pub id: String,
    pub filename: String,
    pub status: HeldStatus,
}

impl HeldItem {
    pub fn new(id: impl Into<String>, filename: impl Into<String>, status: HeldStatus) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            status,
        }
    }
}

/// One entry of the user's watchlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    pub content_type: ContentType,
}

impl WatchlistItem {
    pub fn movie(title: impl Into<String>, year: Option<u32>) -> Self {
        Self {
            title: title.into(),
            year,
            content_type: ContentType::Movie,
        }
    }

    pub fn show(title: impl Into<String>, year: Option<u32>) -> Self {
        Self {
            title: title.into(),
            year,
            content_type: ContentType::Tv,
        }
    }
}

/// Searches for releases of a title. Results are unordered and may contain
/// near-duplicates.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &str;

    async fn find_all_matching_content(
        &self,
        title: &str,
        content_type: ContentType,
    ) -> Result<Vec<Candidate>, CollaboratorError>;
}

/// Snapshot of content already downloaded or queued.
#[async_trait]
pub trait HeldContentSource: Send + Sync {
    async fn list_held_items(&self) -> Result<Vec<HeldItem>, CollaboratorError>;
}

/// Accepts selected candidates and removes superseded items.
///
/// Submissions are not idempotent; callers avoid duplicates.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Submit a candidate, returning the remote id it was stored under.
    async fn submit(&self, candidate: &Candidate) -> Result<String, CollaboratorError>;

    async fn remove(&self, id: &str) -> Result<(), CollaboratorError>;
}

/// Provides the user's watchlist in remote order.
#[async_trait]
pub trait WatchlistSource: Send + Sync {
    async fn fetch_watchlist(&self) -> Result<Vec<WatchlistItem>, CollaboratorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_status_from_remote() {
        assert_eq!(HeldStatus::from_remote("downloaded"), HeldStatus::Downloaded);
        assert_eq!(HeldStatus::from_remote("Downloading"), HeldStatus::Downloading);
        assert_eq!(
            HeldStatus::from_remote("waiting_files_selection"),
            HeldStatus::WaitingFilesSelection
        );
        assert_eq!(HeldStatus::from_remote("magnet_error"), HeldStatus::Error);
        assert_eq!(HeldStatus::from_remote("compressing"), HeldStatus::Unknown);
    }

    #[test]
    fn test_only_downloaded_is_scan_eligible() {
        assert!(HeldStatus::Downloaded.is_scan_eligible());
        for status in [
            HeldStatus::Downloading,
            HeldStatus::Queued,
            HeldStatus::MagnetConversion,
            HeldStatus::WaitingFilesSelection,
            HeldStatus::Error,
            HeldStatus::Unknown,
        ] {
            assert!(!status.is_scan_eligible(), "{}", status.as_str());
        }
    }

    #[test]
    fn test_collaborator_error_display() {
        let err = CollaboratorError::Submit("HTTP 503".to_string());
        assert_eq!(err.to_string(), "Submission failed: HTTP 503");
    }

    #[test]
    fn test_watchlist_item_serialization() {
        let item = WatchlistItem::show("Show Name", None);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["content_type"], "tv");
        assert!(json.get("year").is_none());
    }
}
