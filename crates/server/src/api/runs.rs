//! Sync and upgrade-scan triggers.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use hashsync_core::{Preferences, SyncReport, UpgradeReport};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::handlers::{parse_json, resolve_preferences, ApiError, ErrorResponse};
use crate::state::AppState;

/// Optional body for run triggers.
#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub preferences: Option<Preferences>,
}

/// An empty body means "use the configured preferences".
fn parse_request(body: &Bytes) -> Result<RunRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RunRequest::default());
    }
    parse_json(body)
}

fn not_configured(what: &str) -> ApiError {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: format!("{} not configured", what),
        }),
    )
}

/// POST /api/v1/sync
///
/// Reconcile the watchlist once and return the report.
pub async fn run_sync(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SyncReport>, ApiError> {
    let request = parse_request(&body)?;
    let prefs = resolve_preferences(request.preferences.as_ref(), &state)?;

    info!("Sync requested via API");
    state
        .run_sync(prefs)
        .await
        .map(Json)
        .ok_or_else(|| not_configured("Sync (watchlist, hash list and debrid)"))
}

/// POST /api/v1/upgrades/scan
pub async fn run_upgrade_scan(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<UpgradeReport>, ApiError> {
    let request = parse_request(&body)?;
    let prefs = resolve_preferences(request.preferences.as_ref(), &state)?;

    info!("Upgrade scan requested via API");
    state
        .run_upgrade_scan(prefs)
        .await
        .map(Json)
        .ok_or_else(|| not_configured("Upgrade scan (hash list and debrid)"))
}
