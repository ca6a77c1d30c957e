use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::matching::{group_key, is_upgrade, matches, sort_best_first, GroupingStrategy, Preferences};
use crate::metadata::{extract, Candidate, ReleaseMetadata};
use crate::metrics;
use crate::sources::{
    CandidateSource, CollaboratorError, HeldContentSource, HeldItem, SubmissionSink,
};

use super::{UpgradeMatch, UpgradeReport};

const VIDEO_EXTENSIONS: &[&str] = &["mkv", "mp4", "avi", "m4v", "ts", "wmv", "mov"];

/// Filename without a trailing video extension.
pub fn release_label(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, ext))
            if VIDEO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known)) =>
        {
            stem
        }
        _ => filename,
    }
}

/// Candidates that upgrade `held`, best first, at most
/// `max_upgrade_matches` of them.
///
/// A candidate must share the held item's normalized title, pass the upgrade
/// rule against the preferred tier and satisfy the preferences on its own.
pub fn find_upgrades(
    held: &ReleaseMetadata,
    candidates: Vec<Candidate>,
    prefs: &Preferences,
) -> Vec<Candidate> {
    let key = group_key(held, GroupingStrategy::Generic);
    let target = prefs.target_quality();

    let mut upgrades: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| group_key(&c.metadata, GroupingStrategy::Generic) == key)
        .filter(|c| is_upgrade(c.quality(), held.quality, target))
        .filter(|c| matches(&c.metadata, prefs))
        .collect();

    sort_best_first(&mut upgrades, Candidate::quality);
    upgrades.truncate(prefs.max_upgrade_matches);
    upgrades
}

/// Compares held content against fresh candidates.
pub struct UpgradeScanner {
    held: Arc<dyn HeldContentSource>,
    candidates: Arc<dyn CandidateSource>,
    sink: Arc<dyn SubmissionSink>,
}

impl UpgradeScanner {
    pub fn new(
        held: Arc<dyn HeldContentSource>,
        candidates: Arc<dyn CandidateSource>,
        sink: Arc<dyn SubmissionSink>,
    ) -> Self {
        Self {
            held,
            candidates,
            sink,
        }
    }

    /// Run one scan over the current held-content snapshot.
    ///
    /// Never fails: collaborator errors end up in `report.errors`.
    pub async fn scan(&self, prefs: &Preferences, cancel: &CancellationToken) -> UpgradeReport {
        let mut report = UpgradeReport::start();
        let timer = metrics::RUN_DURATION
            .with_label_values(&["upgrade"])
            .start_timer();

        match self.held.list_held_items().await {
            Ok(items) => {
                info!("Upgrade scan over {} held items", items.len());
                for item in items {
                    if cancel.is_cancelled() {
                        info!("Upgrade scan cancelled");
                        report.cancelled = true;
                        break;
                    }
                    if !item.status.is_scan_eligible() {
                        debug!(
                            "Skipping '{}' with status {}",
                            item.filename,
                            item.status.as_str()
                        );
                        continue;
                    }
                    self.check_item(&item, prefs, &mut report).await;
                }
            }
            Err(e) => record_error(&mut report.errors, "held items", &e),
        }

        timer.observe_duration();
        report.finished_at = Utc::now();
        metrics::UPGRADE_SCANS
            .with_label_values(&[report.outcome()])
            .inc();
        info!(
            "Upgrade scan finished: {} checked, {} upgrades found, {} submitted, {} errors",
            report.torrents_checked,
            report.upgrades_found,
            report.upgrades_submitted,
            report.errors.len()
        );
        report
    }

    async fn check_item(&self, item: &HeldItem, prefs: &Preferences, report: &mut UpgradeReport) {
        report.torrents_checked += 1;
        let held = extract(release_label(&item.filename));
        debug!(
            "Checking '{}' (title '{}', quality {})",
            item.filename, held.title, held.quality
        );

        let found = match self
            .candidates
            .find_all_matching_content(&held.title, held.content_type)
            .await
        {
            Ok(found) => found,
            Err(e) => {
                record_error(&mut report.errors, &item.filename, &e);
                return;
            }
        };
        metrics::CANDIDATES_FOUND.inc_by(found.len() as u64);

        let upgrades = find_upgrades(&held, found, prefs);
        if upgrades.is_empty() {
            return;
        }
        report.upgrades_found += upgrades.len();
        metrics::UPGRADES_FOUND.inc_by(upgrades.len() as u64);
        for upgrade in &upgrades {
            info!(
                "Upgrade for '{}': '{}' ({} -> {})",
                item.filename,
                upgrade.metadata.raw_title,
                held.quality,
                upgrade.quality()
            );
        }

        let first = report.matches.len();
        report
            .matches
            .extend(upgrades.into_iter().map(|candidate| UpgradeMatch {
                held_id: item.id.clone(),
                held_filename: item.filename.clone(),
                held_quality: held.quality,
                quality: candidate.quality(),
                candidate,
                submitted: false,
            }));

        if !prefs.auto_upgrade {
            return;
        }

        let best = &report.matches[first].candidate;
        match self.sink.submit(best).await {
            Ok(remote_id) => {
                metrics::SUBMISSIONS.with_label_values(&["success"]).inc();
                info!(
                    "Submitted upgrade '{}' as {}",
                    best.metadata.raw_title, remote_id
                );
                report.matches[first].submitted = true;
                report.upgrades_submitted += 1;

                if prefs.delete_old_after_upgrade {
                    if let Err(e) = self.sink.remove(&item.id).await {
                        metrics::COLLABORATOR_ERRORS
                            .with_label_values(&[metrics::operation_label(&e)])
                            .inc();
                        warn!("Failed to remove superseded '{}': {}", item.filename, e);
                    }
                }
            }
            Err(e) => {
                metrics::SUBMISSIONS.with_label_values(&["failure"]).inc();
                record_error(&mut report.errors, &item.filename, &e);
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
