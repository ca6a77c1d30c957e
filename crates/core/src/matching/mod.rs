//! Preference matching, quality ranking and candidate selection.

mod grouping;
mod matcher;
mod preferences;
mod ranker;

pub use grouping::{
    group_candidates, group_key, season_structure, select_best, select_from_group,
    CandidateGroup, GroupingStrategy, SeasonStructure,
};
pub use matcher::{evaluate, matches, release_type_matches, MatchRejection};
pub use preferences::{HdrPreference, Preferences, ReleaseType};
pub use ranker::{compare, is_upgrade, rank, sort_best_first};
