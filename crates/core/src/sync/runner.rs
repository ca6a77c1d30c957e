use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::matching::{select_best, GroupingStrategy, Preferences};
use crate::metadata::ContentType;
use crate::metrics;
use crate::sources::{
    CandidateSource, CollaboratorError, SubmissionSink, WatchlistItem, WatchlistSource,
};

use super::{SubmittedRelease, SyncReport};

/// Grouping used for a content type: movies by title, shows by season.
pub fn strategy_for(content_type: ContentType) -> GroupingStrategy {
    match content_type {
        ContentType::Movie => GroupingStrategy::Generic,
        ContentType::Tv => GroupingStrategy::ShowAware,
    }
}

/// Reconciles the watchlist against the candidate source.
pub struct SyncRunner {
    watchlist: Arc<dyn WatchlistSource>,
    candidates: Arc<dyn CandidateSource>,
    sink: Arc<dyn SubmissionSink>,
}

impl SyncRunner {
    pub fn new(
        watchlist: Arc<dyn WatchlistSource>,
        candidates: Arc<dyn CandidateSource>,
        sink: Arc<dyn SubmissionSink>,
    ) -> Self {
        Self {
            watchlist,
            candidates,
            sink,
        }
    }

    /// Run one reconciliation pass, items in watchlist order.
    pub async fn run(&self, prefs: &Preferences, cancel: &CancellationToken) -> SyncReport {
        let mut report = SyncReport::start();
        let timer = metrics::RUN_DURATION
            .with_label_values(&["sync"])
            .start_timer();

        match self.watchlist.fetch_watchlist().await {
            Ok(items) => {
                info!(
                    "Syncing {} watchlist items against {}",
                    items.len(),
                    self.candidates.name()
                );
                let mut submitted_ids = HashSet::new();
                for item in &items {
                    if cancel.is_cancelled() {
                        info!("Sync cancelled");
                        report.cancelled = true;
                        break;
                    }
                    self.sync_item(item, prefs, &mut submitted_ids, &mut report)
                        .await;
                }
            }
            Err(e) => record_error(&mut report.errors, "watchlist", &e),
        }

        timer.observe_duration();
        report.finished_at = Utc::now();
        metrics::SYNC_RUNS.with_label_values(&[report.outcome()]).inc();
        info!(
            "Sync finished: {} items, {} candidates, {} selected, {} submitted, {} errors",
            report.items_checked,
            report.candidates_found,
            report.selected,
            report.submitted,
            report.errors.len()
        );
        report
    }

    async fn sync_item(
        &self,
        item: &WatchlistItem,
        prefs: &Preferences,
        submitted_ids: &mut HashSet<String>,
        report: &mut SyncReport,
    ) {
        report.items_checked += 1;

        let found = match self
            .candidates
            .find_all_matching_content(&item.title, item.content_type)
            .await
        {
            Ok(found) => found,
            Err(e) => {
                record_error(&mut report.errors, &item.title, &e);
                return;
            }
        };
        report.candidates_found += found.len();
        metrics::CANDIDATES_FOUND.inc_by(found.len() as u64);

        let selected = select_best(&found, prefs, strategy_for(item.content_type));
        debug!(
            "'{}': {} candidates, {} selected",
            item.title,
            found.len(),
            selected.len()
        );
        report.selected += selected.len();

        for candidate in selected {
            if !submitted_ids.insert(candidate.source_id.clone()) {
                debug!(
                    "Skipping '{}', already submitted this run",
                    candidate.metadata.raw_title
                );
                continue;
            }
            match self.sink.submit(&candidate).await {
                Ok(remote_id) => {
                    metrics::SUBMISSIONS.with_label_values(&["success"]).inc();
                    info!(
                        "Submitted '{}' for '{}'",
                        candidate.metadata.raw_title, item.title
                    );
                    report.submitted += 1;
                    report.submissions.push(SubmittedRelease {
                        watchlist_title: item.title.clone(),
                        quality: candidate.quality(),
                        label: candidate.metadata.raw_title,
                        source_id: candidate.source_id,
                        remote_id,
                    });
                }
                Err(e) => {
                    metrics::SUBMISSIONS.with_label_values(&["failure"]).inc();
                    record_error(&mut report.errors, &item.title, &e);
                }
            }
        }
    }
}

fn record_error(errors: &mut Vec<String>, context: &str, err: &CollaboratorError) {
    metrics::COLLABORATOR_ERRORS
        .with_label_values(&[metrics::operation_label(err)])
        .inc();
    warn!("{}: {}", context, err);
    errors.push(format!("{}: {}", context, err));
}
