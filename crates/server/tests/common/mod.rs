//! Common test utilities for driving the router in-process.
//!
//! The fixture builds an `AppState` over mock collaborators, so sync and
//! upgrade endpoints run end-to-end without external services.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use hashsync_core::{
    testing::{MockCandidateSource, MockDebrid, MockWatchlist},
    Config, Preferences, SyncRunner, UpgradeScanner,
};
use hashsync_server::state::AppState;

/// Re-export fixtures for test convenience
pub use hashsync_core::testing::fixtures;

/// In-process server with controllable mocks.
pub struct TestFixture {
    pub router: Router,
    pub watchlist: Arc<MockWatchlist>,
    pub source: Arc<MockCandidateSource>,
    pub debrid: Arc<MockDebrid>,
    pub shutdown: CancellationToken,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

/// Which runners the fixture wires.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub enable_sync: bool,
    pub enable_upgrades: bool,
    pub preferences: Preferences,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            enable_sync: true,
            enable_upgrades: true,
            preferences: Preferences::default(),
        }
    }
}

impl TestConfig {
    /// No collaborators configured at all.
    pub fn unconfigured() -> Self {
        Self {
            enable_sync: false,
            enable_upgrades: false,
            preferences: Preferences::default(),
        }
    }

    pub fn with_preferences(preferences: Preferences) -> Self {
        Self {
            preferences,
            ..Self::default()
        }
    }
}

impl TestFixture {
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    pub async fn with_config(test_config: TestConfig) -> Self {
        let watchlist = Arc::new(MockWatchlist::new());
        let source = Arc::new(MockCandidateSource::new());
        let debrid = Arc::new(MockDebrid::new());
        let shutdown = CancellationToken::new();

        let config = Config {
            preferences: test_config.preferences,
            ..Config::default()
        };

        let sync_runner = test_config
            .enable_sync
            .then(|| SyncRunner::new(watchlist.clone(), source.clone(), debrid.clone()));
        let upgrade_scanner = test_config
            .enable_upgrades
            .then(|| UpgradeScanner::new(debrid.clone(), source.clone(), debrid.clone()));

        let state = Arc::new(AppState::new(
            config,
            sync_runner,
            upgrade_scanner,
            shutdown.clone(),
        ));
        let router = hashsync_server::api::create_router(state);

        Self {
            router,
            watchlist,
            source,
            debrid,
            shutdown,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body.to_string())).await
    }

    /// POST with no body at all.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// POST a raw string body (for malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        self.request("POST", path, Some(body.to_string())).await
    }

    async fn request(&self, method: &str, path: &str, body: Option<String>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = match body {
            Some(text) => {
                request_builder = request_builder.header("Content-Type", "application/json");
                Body::from(text)
            }
            None => Body::empty(),
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}
