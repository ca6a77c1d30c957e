use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::DebridConfig;
use crate::metadata::Candidate;
use crate::sources::{CollaboratorError, HeldContentSource, HeldItem, SubmissionSink};
use crate::transport::{send_with_fallback, ProxyRotation};

use super::{AddMagnetResponse, DebridError, DebridTorrent};

/// Page size requested from `GET /torrents`.
const LIST_LIMIT: usize = 100;

/// Upper bound on pages fetched for one listing.
const MAX_PAGES: usize = 500;

/// Debrid REST client.
pub struct DebridClient {
    client: Client,
    config: DebridConfig,
    /// Last proxy rotation that reached the service.
    rotation: RwLock<ProxyRotation>,
}

impl DebridClient {
    /// Create a new debrid client.
    pub fn new(config: DebridConfig, rotation: ProxyRotation) -> Result<Self, DebridError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| DebridError::ClientInit(e.to_string()))?;

        Ok(Self {
            client,
            config,
            rotation: RwLock::new(rotation),
        })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// Send an authenticated request and check its status.
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        form: Option<&[(&str, &str)]>,
    ) -> Result<Response, DebridError> {
        let url = format!("{}{}", self.base_url(), endpoint);
        let rotation = self.rotation.read().await.clone();

        let sent = send_with_fallback(&self.client, &url, &rotation, |client, target| {
            let builder = client
                .request(method.clone(), target)
                .bearer_auth(&self.config.api_token);
            match form {
                Some(params) => builder.form(params),
                None => builder,
            }
        })
        .await?;

        if sent.rotation != rotation {
            *self.rotation.write().await = sent.rotation;
        }

        let response = sent.response;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = body.chars().take(100).collect::<String>();
        match status.as_u16() {
            401 | 403 => Err(DebridError::AuthenticationFailed(message)),
            code => Err(DebridError::ApiError {
                status: code,
                message,
            }),
        }
    }

    /// List every torrent on the account, one page at a time.
    ///
    /// Stops at a 204, an empty page or a page shorter than the limit.
    pub async fn list_torrents(&self) -> Result<Vec<DebridTorrent>, DebridError> {
        let mut torrents = Vec::new();
        for page in 1..=MAX_PAGES {
            let batch = self.list_page(page).await?;
            let last = batch.len() < LIST_LIMIT;
            torrents.extend(batch);
            if last {
                return Ok(torrents);
            }
        }
        warn!(
            "Stopped listing debrid torrents after {} pages ({} torrents)",
            MAX_PAGES,
            torrents.len()
        );
        Ok(torrents)
    }

    async fn list_page(&self, page: usize) -> Result<Vec<DebridTorrent>, DebridError> {
        let endpoint = format!("/torrents?page={}&limit={}", page, LIST_LIMIT);
        let response = self.request(Method::GET, &endpoint, None).await?;

        // Past the last page, or an empty account, the service answers 204
        if response.status().as_u16() == 204 {
            return Ok(Vec::new());
        }

        response
            .json::<Vec<DebridTorrent>>()
            .await
            .map_err(|e| DebridError::InvalidResponse(e.to_string()))
    }

    /// Add a magnet, returning the new torrent id.
    pub async fn add_magnet(&self, magnet: &str) -> Result<String, DebridError> {
        let response = self
            .request(
                Method::POST,
                "/torrents/addMagnet",
                Some(&[("magnet", magnet)][..]),
            )
            .await?;

        let added: AddMagnetResponse = response
            .json()
            .await
            .map_err(|e| DebridError::InvalidResponse(e.to_string()))?;
        Ok(added.id)
    }

    /// Start the download of every file in a torrent.
    pub async fn select_all_files(&self, id: &str) -> Result<(), DebridError> {
        let endpoint = format!("/torrents/selectFiles/{}", id);
        self.request(Method::POST, &endpoint, Some(&[("files", "all")][..]))
            .await?;
        Ok(())
    }

    pub async fn delete_torrent(&self, id: &str) -> Result<(), DebridError> {
        let endpoint = format!("/torrents/delete/{}", id);
        self.request(Method::DELETE, &endpoint, None).await?;
        Ok(())
    }
}

#[async_trait]
impl HeldContentSource for DebridClient {
    async fn list_held_items(&self) -> Result<Vec<HeldItem>, CollaboratorError> {
        let torrents = self
            .list_torrents()
            .await
            .map_err(|e| CollaboratorError::List(e.to_string()))?;
        debug!("Debrid account holds {} torrents", torrents.len());
        Ok(torrents.into_iter().map(HeldItem::from).collect())
    }
}

#[async_trait]
impl SubmissionSink for DebridClient {
    async fn submit(&self, candidate: &Candidate) -> Result<String, CollaboratorError> {
        let id = self
            .add_magnet(&candidate.source_id)
            .await
            .map_err(|e| CollaboratorError::Submit(e.to_string()))?;
        if let Err(e) = self.select_all_files(&id).await {
            // A torrent left waiting for file selection would block a retry
            if let Err(cleanup) = self.delete_torrent(&id).await {
                warn!("Failed to delete half-submitted torrent {}: {}", id, cleanup);
            }
            return Err(CollaboratorError::Submit(e.to_string()));
        }
        info!(
            "Submitted '{}' to debrid as {}",
            candidate.metadata.raw_title, id
        );
        Ok(id)
    }

    async fn remove(&self, id: &str) -> Result<(), CollaboratorError> {
        self.delete_torrent(id)
            .await
            .map_err(|e| CollaboratorError::Remove(e.to_string()))
    }
}
