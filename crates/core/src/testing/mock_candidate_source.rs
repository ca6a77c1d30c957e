//! Mock candidate source for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::metadata::{Candidate, ContentType};
use crate::sources::{CandidateSource, CollaboratorError};

/// Mock implementation of the CandidateSource trait.
///
/// Results are keyed by the exact search title. Unknown titles return no
/// candidates.
#[derive(Debug, Default)]
pub struct MockCandidateSource {
    results: Arc<RwLock<HashMap<String, Vec<Candidate>>>>,
    failures: Arc<RwLock<HashMap<String, CollaboratorError>>>,
    searches: Arc<RwLock<Vec<(String, ContentType)>>>,
    next_error: Arc<RwLock<Option<CollaboratorError>>>,
}

impl MockCandidateSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the candidates returned for a title.
    pub async fn set_results(&self, title: &str, candidates: Vec<Candidate>) {
        self.results
            .write()
            .await
            .insert(title.to_string(), candidates);
    }

    /// Make every search for `title` fail.
    pub async fn fail_for(&self, title: &str, error: CollaboratorError) {
        self.failures.write().await.insert(title.to_string(), error);
    }

    /// Configure the next search to fail with the given error.
    pub async fn set_next_error(&self, error: CollaboratorError) {
        *self.next_error.write().await = Some(error);
    }

    /// Recorded searches in call order.
    pub async fn searches(&self) -> Vec<(String, ContentType)> {
        self.searches.read().await.clone()
    }
}

#[async_trait]
impl CandidateSource for MockCandidateSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn find_all_matching_content(
        &self,
        title: &str,
        content_type: ContentType,
    ) -> Result<Vec<Candidate>, CollaboratorError> {
        self.searches
            .write()
            .await
            .push((title.to_string(), content_type));

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        if let Some(error) = self.failures.read().await.get(title) {
            return Err(error.clone());
        }
        Ok(self
            .results
            .read()
            .await
            .get(title)
            .cloned()
            .unwrap_or_default())
    }
}
