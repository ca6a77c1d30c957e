use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use hashsync_core::{validate_preferences, ConfigError, Preferences, SanitizedConfig};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use crate::metrics::encode_metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Error body shared by every JSON endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn bad_request(error: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Deserialize a JSON body. Syntax and data errors are both a 400.
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| bad_request(format!("Invalid request body: {}", e)))
}

/// Preferences sent with a request, or the configured ones.
///
/// Request preferences go through the same checks as the config file.
pub fn resolve_preferences<'a>(
    requested: Option<&'a Preferences>,
    state: &'a AppState,
) -> Result<&'a Preferences, ApiError> {
    let Some(prefs) = requested else {
        return Ok(state.preferences());
    };
    validate_preferences(prefs).map_err(|e| match e {
        ConfigError::ValidationError(message) => {
            bad_request(format!("Invalid preferences: {}", message))
        }
        other => bad_request(other.to_string()),
    })?;
    Ok(prefs)
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
