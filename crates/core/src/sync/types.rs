use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::metadata::QualityTier;

/// A release submitted during a sync run.
#[derive(Debug, Clone, Serialize)]
pub struct SubmittedRelease {
    /// Watchlist title the release was found for.
    pub watchlist_title: String,
    pub source_id: String,
    pub label: String,
    pub quality: QualityTier,
    /// Id assigned by the submission sink.
    pub remote_id: String,
}

/// Outcome of one sync run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub items_checked: usize,
    pub candidates_found: usize,
    pub selected: usize,
    pub submitted: usize,
    pub submissions: Vec<SubmittedRelease>,
    pub errors: Vec<String>,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    pub(crate) fn start() -> Self {
        let now = Utc::now();
        Self {
            items_checked: 0,
            candidates_found: 0,
            selected: 0,
            submitted: 0,
            submissions: Vec::new(),
            errors: Vec::new(),
            cancelled: false,
            started_at: now,
            finished_at: now,
        }
    }

    pub fn outcome(&self) -> &'static str {
        if self.cancelled {
            "cancelled"
        } else if self.errors.is_empty() {
            "completed"
        } else {
            "completed_with_errors"
        }
    }
}
