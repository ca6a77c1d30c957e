use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::WatchlistConfig;
use crate::metadata::ContentType;
use crate::sources::{CollaboratorError, WatchlistItem, WatchlistSource};
use crate::transport::{send_with_fallback, ProxyRotation};

use super::WatchlistError;

const API_VERSION: &str = "2";

#[derive(Debug, Deserialize)]
struct TraktEntry {
    #[serde(default)]
    movie: Option<TraktMedia>,
    #[serde(default)]
    show: Option<TraktMedia>,
}

#[derive(Debug, Deserialize)]
struct TraktMedia {
    title: String,
    #[serde(default)]
    year: Option<u32>,
}

/// Trakt-style watchlist client.
pub struct TraktClient {
    client: Client,
    config: WatchlistConfig,
    rotation: RwLock<ProxyRotation>,
}

impl TraktClient {
    pub fn new(config: WatchlistConfig, rotation: ProxyRotation) -> Result<Self, WatchlistError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| WatchlistError::ClientInit(e.to_string()))?;

        Ok(Self {
            client,
            config,
            rotation: RwLock::new(rotation),
        })
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// Fetch one watchlist section (`movies` or `shows`).
    async fn fetch_section(&self, kind: ContentType) -> Result<Vec<WatchlistItem>, WatchlistError> {
        let section = match kind {
            ContentType::Movie => "movies",
            ContentType::Tv => "shows",
        };
        let url = format!(
            "{}/users/{}/watchlist/{}",
            self.base_url(),
            urlencoding::encode(&self.config.username),
            section
        );
        let rotation = self.rotation.read().await.clone();

        let sent = send_with_fallback(&self.client, &url, &rotation, |client, target| {
            let builder = client
                .get(target)
                .header("trakt-api-key", &self.config.client_id)
                .header("trakt-api-version", API_VERSION)
                .header("Content-Type", "application/json");
            match self.config.access_token.as_deref() {
                Some(token) if !token.is_empty() => builder.bearer_auth(token),
                _ => builder,
            }
        })
        .await?;

        if sent.rotation != rotation {
            *self.rotation.write().await = sent.rotation;
        }

        let response = sent.response;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = body.chars().take(100).collect::<String>();
            return Err(match status.as_u16() {
                401 | 403 => WatchlistError::AuthenticationFailed(message),
                code => WatchlistError::ApiError {
                    status: code,
                    message,
                },
            });
        }

        let entries: Vec<TraktEntry> = response
            .json()
            .await
            .map_err(|e| WatchlistError::InvalidResponse(e.to_string()))?;

        let items = entries
            .into_iter()
            .filter_map(|entry| match kind {
                ContentType::Movie => entry.movie,
                ContentType::Tv => entry.show,
            })
            .map(|media| WatchlistItem {
                title: media.title,
                year: media.year,
                content_type: kind,
            })
            .collect::<Vec<_>>();
        debug!("Watchlist {}: {} items", section, items.len());
        Ok(items)
    }

    /// Movies first, then shows, each in remote order.
    pub async fn fetch_all(&self) -> Result<Vec<WatchlistItem>, WatchlistError> {
        let mut items = self.fetch_section(ContentType::Movie).await?;
        items.extend(self.fetch_section(ContentType::Tv).await?);
        Ok(items)
    }
}

#[async_trait]
impl WatchlistSource for TraktClient {
    async fn fetch_watchlist(&self) -> Result<Vec<WatchlistItem>, CollaboratorError> {
        self.fetch_all()
            .await
            .map_err(|e| CollaboratorError::Watchlist(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::header;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer, access_token: Option<&str>) -> WatchlistConfig {
        WatchlistConfig {
            url: server.uri(),
            client_id: "client-123".to_string(),
            access_token: access_token.map(String::from),
            username: "me".to_string(),
            timeout_secs: 5,
        }
    }

    async fn mount_section(server: &MockServer, section: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/users/me/watchlist/{}", section)))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    const MOVIES: &str = r#"[
        {"rank":1,"listed_at":"2024-01-01T00:00:00.000Z","type":"movie",
         "movie":{"title":"Movie Title","year":2023,"ids":{"trakt":1}}},
        {"rank":2,"type":"movie","movie":{"title":"Other Movie","year":null}}
    ]"#;

    const SHOWS: &str = r#"[
        {"rank":1,"type":"show","show":{"title":"Show Name","year":2019}}
    ]"#;

    #[tokio::test]
    async fn test_fetch_watchlist_movies_then_shows() {
        let server = MockServer::start().await;
        mount_section(&server, "movies", 200, MOVIES).await;
        mount_section(&server, "shows", 200, SHOWS).await;
        let client = TraktClient::new(config(&server, Some("tok")), ProxyRotation::direct_only())
            .unwrap();

        let items = client.fetch_watchlist().await.unwrap();
        assert_eq!(
            items,
            vec![
                WatchlistItem::movie("Movie Title", Some(2023)),
                WatchlistItem::movie("Other Movie", None),
                WatchlistItem::show("Show Name", Some(2019)),
            ]
        );

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.path(), "/users/me/watchlist/movies");
        assert_eq!(requests[1].url.path(), "/users/me/watchlist/shows");
        assert_eq!(header(&requests[0], "trakt-api-key"), Some("client-123"));
        assert_eq!(header(&requests[0], "trakt-api-version"), Some("2"));
        assert_eq!(header(&requests[0], "authorization"), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn test_no_token_sends_no_authorization() {
        let server = MockServer::start().await;
        mount_section(&server, "movies", 200, "[]").await;
        mount_section(&server, "shows", 200, "[]").await;
        let client =
            TraktClient::new(config(&server, None), ProxyRotation::direct_only()).unwrap();

        assert!(client.fetch_watchlist().await.unwrap().is_empty());
        let requests = server.received_requests().await.unwrap();
        assert!(header(&requests[0], "authorization").is_none());
    }

    #[tokio::test]
    async fn test_private_watchlist_is_auth_error() {
        let server = MockServer::start().await;
        mount_section(&server, "movies", 401, "").await;
        let client =
            TraktClient::new(config(&server, None), ProxyRotation::direct_only()).unwrap();

        let err = client.fetch_all().await.unwrap_err();
        assert!(matches!(err, WatchlistError::AuthenticationFailed(_)));

        let err = client.fetch_watchlist().await.unwrap_err();
        assert!(matches!(err, CollaboratorError::Watchlist(_)));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let server = MockServer::start().await;
        mount_section(&server, "movies", 200, "{not json").await;
        let client =
            TraktClient::new(config(&server, None), ProxyRotation::direct_only()).unwrap();
        let err = client.fetch_all().await.unwrap_err();
        assert!(matches!(err, WatchlistError::InvalidResponse(_)));
    }
}
