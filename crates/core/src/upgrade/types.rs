use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::metadata::{Candidate, QualityTier};

/// A candidate that upgrades one held item.
#[derive(Debug, Clone, Serialize)]
pub struct UpgradeMatch {
    pub held_id: String,
    pub held_filename: String,
    pub held_quality: QualityTier,
    pub candidate: Candidate,
    pub quality: QualityTier,
    /// Whether this match was submitted during the scan.
    pub submitted: bool,
}

/// Outcome of one upgrade scan.
#[derive(Debug, Clone, Serialize)]
pub struct UpgradeReport {
    pub torrents_checked: usize,
    pub upgrades_found: usize,
    pub upgrades_submitted: usize,
    pub matches: Vec<UpgradeMatch>,
    /// Per-item failures; none of them aborted the scan.
    pub errors: Vec<String>,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl UpgradeReport {
    pub(crate) fn start() -> Self {
        let now = Utc::now();
        Self {
            torrents_checked: 0,
            upgrades_found: 0,
            upgrades_submitted: 0,
            matches: Vec::new(),
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
