use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::metadata::{clean_title, Candidate, ContentType, ReleaseMetadata};
use crate::sources::{CandidateSource, CollaboratorError};

use super::parser::{parse_hash_list, HashEntry};
use super::HashListError;

#[derive(Debug, Clone)]
struct IndexedEntry {
    entry: HashEntry,
    metadata: ReleaseMetadata,
    words: Vec<String>,
}

/// In-memory index over a parsed hash list.
///
/// Metadata is extracted once at load time; lookups are a linear word match
/// over cleaned titles.
#[derive(Debug, Clone, Default)]
pub struct HashListIndex {
    entries: Vec<IndexedEntry>,
    skipped: usize,
}

impl HashListIndex {
    pub fn from_text(text: &str) -> Self {
        let parsed = parse_hash_list(text);
        let entries = parsed
            .entries
            .into_iter()
            .map(|entry| {
                let metadata = entry.metadata();
                let words = title_words(&metadata.title);
                IndexedEntry {
                    entry,
                    metadata,
                    words,
                }
            })
            .collect();
        Self {
            entries,
            skipped: parsed.skipped,
        }
    }

    /// Read and index a hash-list file.
    pub async fn load(path: &Path) -> Result<Self, HashListError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| HashListError::Io {
                path: path.display().to_string(),
                source,
            })?;
        let index = Self::from_text(&text);
        info!(
            "Loaded hash list {}: {} entries, {} malformed lines skipped",
            path.display(),
            index.len(),
            index.skipped()
        );
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Entries whose cleaned title contains every word of the query's
    /// cleaned title, restricted to one content type.
    pub fn search(&self, title: &str, content_type: ContentType) -> Vec<Candidate> {
        let query = title_words(&clean_title(title));
        if query.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|e| e.metadata.content_type == content_type)
            .filter(|e| query.iter().all(|w| e.words.contains(w)))
            .map(|e| Candidate {
                source_id: e.entry.magnet_uri(),
                metadata: e.metadata.clone(),
            })
            .collect()
    }
}

/// Lowercased words with punctuation trimmed from their edges.
///
/// Inner punctuation stays (`spider-man`), tokens with no letters or digits
/// (a lone `-` or `:`) are dropped.
fn title_words(title: &str) -> Vec<String> {
    title
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

#[async_trait]
impl CandidateSource for HashListIndex {
    fn name(&self) -> &str {
        "hashlist"
    }

    async fn find_all_matching_content(
        &self,
        title: &str,
        content_type: ContentType,
    ) -> Result<Vec<Candidate>, CollaboratorError> {
        let results = self.search(title, content_type);
        debug!(
            "Hash list search '{}' ({}): {} candidates",
            title,
            content_type,
            results.len()
        );
        Ok(results)
    }
}
