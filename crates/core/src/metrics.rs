//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Sync runs (watchlist reconciliation)
//! - Upgrade scans
//! - Submissions and collaborator failures

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Runs
// =============================================================================

/// Sync runs by outcome.
pub static SYNC_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("hashsync_sync_runs_total", "Total watchlist sync runs"),
        &["outcome"], // "completed", "cancelled", "failed"
    )
    .unwrap()
});

/// Upgrade scans by outcome.
pub static UPGRADE_SCANS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("hashsync_upgrade_scans_total", "Total upgrade scans"),
        &["outcome"],
    )
    .unwrap()
});

/// Run duration in seconds.
pub static RUN_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("hashsync_run_duration_seconds", "Duration of sync and scan runs")
            .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0, 900.0]),
        &["runner"], // "sync", "upgrade"
    )
    .unwrap()
});

// =============================================================================
// Selection
// =============================================================================

/// Candidates returned by the candidate source.
pub static CANDIDATES_FOUND: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "hashsync_candidates_found_total",
        "Candidates returned by the candidate source",
    )
    .unwrap()
});

/// Upgrades found for held items.
pub static UPGRADES_FOUND: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "hashsync_upgrades_found_total",
        "Upgrade matches found for held items",
    )
    .unwrap()
});

// =============================================================================
// Collaborators
// =============================================================================

/// Submissions by result.
pub static SUBMISSIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("hashsync_submissions_total", "Submissions to the debrid service"),
        &["result"], // "success", "failure"
    )
    .unwrap()
});

/// Collaborator failures by operation.
pub static COLLABORATOR_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "hashsync_collaborator_errors_total",
            "Failed collaborator calls",
        ),
        &["operation"], // "search", "list", "submit", "remove", "watchlist"
    )
    .unwrap()
});

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Runs
        Box::new(SYNC_RUNS.clone()),
        Box::new(UPGRADE_SCANS.clone()),
        Box::new(RUN_DURATION.clone()),
        // Selection
        Box::new(CANDIDATES_FOUND.clone()),
        Box::new(UPGRADES_FOUND.clone()),
        // Collaborators
        Box::new(SUBMISSIONS.clone()),
        Box::new(COLLABORATOR_ERRORS.clone()),
    ]
}

/// Label for a collaborator error, used with `COLLABORATOR_ERRORS`.
pub fn operation_label(err: &crate::sources::CollaboratorError) -> &'static str {
    use crate::sources::CollaboratorError::*;
    match err {
        Search(_) => "search",
        List(_) => "list",
        Submit(_) => "submit",
        Remove(_) => "remove",
        Watchlist(_) => "watchlist",
    }
}
