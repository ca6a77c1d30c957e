//! Mock debrid service for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::metadata::Candidate;
use crate::sources::{
    CollaboratorError, HeldContentSource, HeldItem, HeldStatus, SubmissionSink,
};

/// A recorded submission for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSubmission {
    pub candidate: Candidate,
    pub remote_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Mock implementation of HeldContentSource and SubmissionSink.
///
/// Provides controllable behavior for testing:
/// - Seed held items for upgrade scans
/// - Track submissions and removals for assertions
/// - Simulate failures per operation
///
/// Submitted candidates show up as queued held items, removed items
/// disappear from the listing.
#[derive(Debug, Default)]
pub struct MockDebrid {
    held: Arc<RwLock<Vec<HeldItem>>>,
    submitted: Arc<RwLock<Vec<RecordedSubmission>>>,
    removed: Arc<RwLock<Vec<String>>>,
    /// One-shot failures per operation.
    list_error: Arc<RwLock<Option<CollaboratorError>>>,
    submit_error: Arc<RwLock<Option<CollaboratorError>>>,
    remove_error: Arc<RwLock<Option<CollaboratorError>>>,
    id_counter: Arc<RwLock<u32>>,
}

impl MockDebrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock already holding the given items.
    pub async fn with_held(items: Vec<HeldItem>) -> Self {
        let mock = Self::new();
        mock.set_held_items(items).await;
        mock
    }

    pub async fn set_held_items(&self, items: Vec<HeldItem>) {
        *self.held.write().await = items;
    }

    pub async fn held_items(&self) -> Vec<HeldItem> {
        self.held.read().await.clone()
    }

    pub async fn submitted(&self) -> Vec<RecordedSubmission> {
        self.submitted.read().await.clone()
    }

    pub async fn removed(&self) -> Vec<String> {
        self.removed.read().await.clone()
    }

    /// Configure the next listing to fail.
    pub async fn set_list_error(&self, error: CollaboratorError) {
        *self.list_error.write().await = Some(error);
    }

    /// Configure the next submission to fail.
    pub async fn set_submit_error(&self, error: CollaboratorError) {
        *self.submit_error.write().await = Some(error);
    }

    /// Configure the next remove call to fail.
    pub async fn set_remove_error(&self, error: CollaboratorError) {
        *self.remove_error.write().await = Some(error);
    }

    async fn generate_id(&self) -> String {
        let mut counter = self.id_counter.write().await;
        *counter += 1;
        format!("MOCK{:04}", *counter)
    }
}

#[async_trait]
impl HeldContentSource for MockDebrid {
    async fn list_held_items(&self) -> Result<Vec<HeldItem>, CollaboratorError> {
        if let Some(error) = self.list_error.write().await.take() {
            return Err(error);
        }
        Ok(self.held.read().await.clone())
    }
}

#[async_trait]
impl SubmissionSink for MockDebrid {
    async fn submit(&self, candidate: &Candidate) -> Result<String, CollaboratorError> {
        if let Some(error) = self.submit_error.write().await.take() {
            return Err(error);
        }
        let remote_id = self.generate_id().await;
        self.held.write().await.push(HeldItem::new(
            remote_id.clone(),
            candidate.metadata.raw_title.clone(),
            HeldStatus::Queued,
        ));
        self.submitted.write().await.push(RecordedSubmission {
            candidate: candidate.clone(),
            remote_id: remote_id.clone(),
            timestamp: Utc::now(),
        });
        Ok(remote_id)
    }

    async fn remove(&self, id: &str) -> Result<(), CollaboratorError> {
        if let Some(error) = self.remove_error.write().await.take() {
            return Err(error);
        }
        let mut held = self.held.write().await;
        let before = held.len();
        held.retain(|item| item.id != id);
        if held.len() == before {
            return Err(CollaboratorError::Remove(format!("unknown id {}", id)));
        }
        self.removed.write().await.push(id.to_string());
        Ok(())
    }
}
