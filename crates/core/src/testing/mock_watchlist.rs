//! Mock watchlist for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::sources::{CollaboratorError, WatchlistItem, WatchlistSource};

/// Mock implementation of the WatchlistSource trait.
#[derive(Debug, Default)]
pub struct MockWatchlist {
    items: Arc<RwLock<Vec<WatchlistItem>>>,
    next_error: Arc<RwLock<Option<CollaboratorError>>>,
    fetch_count: Arc<RwLock<usize>>,
}

impl MockWatchlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_items(&self, items: Vec<WatchlistItem>) {
        *self.items.write().await = items;
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn set_next_error(&self, error: CollaboratorError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn fetch_count(&self) -> usize {
        *self.fetch_count.read().await
    }
}

#[async_trait]
impl WatchlistSource for MockWatchlist {
    async fn fetch_watchlist(&self) -> Result<Vec<WatchlistItem>, CollaboratorError> {
        *self.fetch_count.write().await += 1;
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        Ok(self.items.read().await.clone())
    }
}
