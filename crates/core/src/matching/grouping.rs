//! Candidate grouping and best-match selection.
//!
//! Candidates are grouped by normalized title (and, for shows, by season
//! structure), then each group yields at most one selection under the active
//! preferences. Grouping is recomputed on every run.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::metadata::{
    Candidate, HdrTier, ReleaseMetadata, COMPLETE_PACK, EPISODE_MARKER, SEASON_MARKER,
    SEASON_START,
};

use super::matcher::evaluate;
use super::preferences::{HdrPreference, Preferences};
use super::ranker::rank;

/// How candidates are bucketed before selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingStrategy {
    /// Cleaned title only (movies, generic upgrade scans).
    Generic,
    /// Cleaned show name plus season structure.
    ShowAware,
}

/// Season/episode structure of an uncleaned title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "season", rename_all = "snake_case")]
pub enum SeasonStructure {
    Pack(u32),
    Individual(u32),
    Complete,
}

impl SeasonStructure {
    /// Suffix appended to show-aware group keys.
    pub fn key_suffix(&self) -> String {
        match self {
            SeasonStructure::Pack(season) => format!("_S{:02}_Pack", season),
            SeasonStructure::Individual(season) => format!("_S{:02}_Individual", season),
            SeasonStructure::Complete => "_Complete".to_string(),
        }
    }

    pub fn is_individual(&self) -> bool {
        matches!(self, SeasonStructure::Individual(_))
    }
}

impl fmt::Display for SeasonStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key_suffix())
    }
}

/// Scan an uncleaned title for `SxxEyy` first, then a bare `Sxx`.
pub fn season_structure(raw_title: &str) -> SeasonStructure {
    if let Some(season) = capture_season(&EPISODE_MARKER, raw_title) {
        return SeasonStructure::Individual(season);
    }
    if let Some(season) = capture_season(&SEASON_MARKER, raw_title) {
        return SeasonStructure::Pack(season);
    }
    SeasonStructure::Complete
}

fn capture_season(re: &regex_lite::Regex, text: &str) -> Option<u32> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Cleaned show name: the cleaned title cut before its first season marker.
fn show_name(title: &str) -> &str {
    match SEASON_START.find(title) {
        Some(m) if m.start() > 0 => title[..m.start()].trim(),
        _ => title,
    }
}

/// Group key for one release.
pub fn group_key(metadata: &ReleaseMetadata, strategy: GroupingStrategy) -> String {
    match strategy {
        GroupingStrategy::Generic => metadata.title.to_lowercase(),
        GroupingStrategy::ShowAware => format!(
            "{}{}",
            show_name(&metadata.title).to_lowercase(),
            season_structure(&metadata.raw_title).key_suffix()
        ),
    }
}

/// Candidates sharing one group key, in input order.
#[derive(Debug, Clone)]
pub struct CandidateGroup<'a> {
    pub key: String,
    /// Present for show-aware groups.
    pub structure: Option<SeasonStructure>,
    pub members: Vec<&'a Candidate>,
}

/// Group candidates, keeping groups in order of first appearance.
pub fn group_candidates(
    candidates: &[Candidate],
    strategy: GroupingStrategy,
) -> Vec<CandidateGroup<'_>> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<CandidateGroup<'_>> = Vec::new();

    for candidate in candidates {
        let key = group_key(&candidate.metadata, strategy);
        match index.get(&key) {
            Some(&i) => groups[i].members.push(candidate),
            None => {
                let structure = match strategy {
                    GroupingStrategy::Generic => None,
                    GroupingStrategy::ShowAware => {
                        Some(season_structure(&candidate.metadata.raw_title))
                    }
                };
                index.insert(key.clone(), groups.len());
                groups.push(CandidateGroup {
                    key,
                    structure,
                    members: vec![candidate],
                });
            }
        }
    }

    groups
}

/// Best-first order: rank descending, HDR ahead of SDR on ties when the
/// user prefers HDR. Stable otherwise.
fn sort_members(members: &mut [&Candidate], prefs: &Preferences) {
    let hdr_weight = |hdr: HdrTier| match prefs.hdr_preference {
        HdrPreference::HdrPreferred if hdr.is_hdr() => 1,
        _ => 0,
    };
    members.sort_by(|a, b| {
        let (a, b) = (&a.metadata, &b.metadata);
        rank(b.quality)
            .cmp(&rank(a.quality))
            .then_with(|| hdr_weight(b.hdr).cmp(&hdr_weight(a.hdr)))
    });
}

/// Pick at most one member of a group.
///
/// Exact preferred tier first, then the closest tier below it; when every
/// member is above the preference, the best one only if higher quality is
/// allowed. The pick must then pass the full matcher or the group yields
/// nothing.
pub fn select_from_group<'a>(
    members: &[&'a Candidate],
    prefs: &Preferences,
) -> Option<&'a Candidate> {
    let mut sorted: Vec<&'a Candidate> = members.to_vec();
    sort_members(&mut sorted, prefs);

    let target = rank(prefs.target_quality());
    let picked = sorted
        .iter()
        .find(|c| rank(c.quality()) == target)
        .or_else(|| sorted.iter().find(|c| rank(c.quality()) <= target))
        .or_else(|| {
            if prefs.allow_higher_quality {
                sorted.first()
            } else {
                None
            }
        })
        .copied()?;

    match evaluate(&picked.metadata, prefs) {
        Ok(()) => Some(picked),
        Err(reason) => {
            debug!(
                "Discarding selection '{}' for group: {}",
                picked.metadata.raw_title, reason
            );
            None
        }
    }
}

/// Narrow a show group when complete seasons are requested.
fn complete_season_members<'a>(group: &CandidateGroup<'a>) -> Vec<&'a Candidate> {
    let individual_group = group.structure.is_some_and(|s| s.is_individual());
    let members: Vec<&'a Candidate> = group
        .members
        .iter()
        .copied()
        .filter(|c| individual_group || !EPISODE_MARKER.is_match(&c.metadata.raw_title))
        .collect();

    let packs: Vec<&'a Candidate> = members
        .iter()
        .copied()
        .filter(|c| COMPLETE_PACK.is_match(&c.metadata.raw_title))
        .collect();

    if packs.is_empty() {
        members
    } else {
        packs
    }
}

/// Group candidates and select the best one per group.
pub fn select_best(
    candidates: &[Candidate],
    prefs: &Preferences,
    strategy: GroupingStrategy,
) -> Vec<Candidate> {
    group_candidates(candidates, strategy)
        .iter()
        .filter_map(|group| {
            let members = if strategy == GroupingStrategy::ShowAware && prefs.complete_seasons {
                complete_season_members(group)
            } else {
                group.members.clone()
            };
            let selected = select_from_group(&members, prefs);
            debug!(
                "Group '{}': {} members, selected {:?}",
                group.key,
                members.len(),
                selected.map(|c| c.metadata.raw_title.as_str())
            );
            selected.cloned()
        })
        .collect()
}
