//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the collaborator traits,
//! allowing the runners and the HTTP API to be tested without real services.
//!
//! # Example
//!
//! ```rust,ignore
//! use hashsync_core::testing::{fixtures, MockCandidateSource, MockDebrid, MockWatchlist};
//!
//! let watchlist = MockWatchlist::new();
//! watchlist.set_items(vec![fixtures::movie("Movie Title")]).await;
//!
//! let source = MockCandidateSource::new();
//! source.set_results("Movie Title", vec![fixtures::candidate("Movie.Title.1080p")]).await;
//!
//! let debrid = MockDebrid::new();
//! // Run a SyncRunner over them, then inspect debrid.submitted()
//! ```

mod mock_candidate_source;
mod mock_debrid;
mod mock_watchlist;

pub use mock_candidate_source::MockCandidateSource;
pub use mock_debrid::{MockDebrid, RecordedSubmission};
pub use mock_watchlist::MockWatchlist;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::metadata::Candidate;
    use crate::sources::{HeldItem, HeldStatus, WatchlistItem};

    /// Deterministic 40-hex info hash derived from a label.
    pub fn info_hash(label: &str) -> String {
        // FNV-1a, widened to 160 bits by repetition
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in label.bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x100000001b3);
        }
        format!("{:016x}{:016x}{:08x}", hash, hash.rotate_left(17), hash as u32)
    }

    /// Magnet URI for a label.
    pub fn magnet(label: &str) -> String {
        format!(
            "magnet:?xt=urn:btih:{}&dn={}",
            info_hash(label),
            urlencoding::encode(label)
        )
    }

    /// Candidate with a magnet source id and metadata extracted from `label`.
    pub fn candidate(label: &str) -> Candidate {
        Candidate::from_label(magnet(label), label)
    }

    pub fn downloaded(id: &str, filename: &str) -> HeldItem {
        HeldItem::new(id, filename, HeldStatus::Downloaded)
    }

    pub fn movie(title: &str) -> WatchlistItem {
        WatchlistItem::movie(title, None)
    }

    pub fn show(title: &str) -> WatchlistItem {
        WatchlistItem::show(title, None)
    }

    /// Hash-list text with one `<hash> <label>` line per label.
    pub fn hash_list(labels: &[&str]) -> String {
        let mut text = String::from("# generated\n");
        for label in labels {
            text.push_str(&format!("{} {}\n", info_hash(label), label));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashlist::HashListIndex;
    use crate::metadata::ContentType;

    #[test]
    fn test_info_hash_is_40_hex() {
        let hash = fixtures::info_hash("Movie.Title.1080p");
        assert_eq!(hash.len(), 40);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(hash, fixtures::info_hash("Movie.Title.720p"));
    }

    #[test]
    fn test_hash_list_fixture_parses() {
        let index = HashListIndex::from_text(&fixtures::hash_list(&[
            "Movie.Title.1080p",
            "Show.Name.S01.720p",
        ]));
        assert_eq!(index.len(), 2);
        assert_eq!(index.skipped(), 0);
        assert_eq!(index.search("Show Name", ContentType::Tv).len(), 1);
    }
}
