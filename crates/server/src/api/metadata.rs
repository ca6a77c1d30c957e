//! Engine endpoints: label extraction and preference matching.

use axum::{body::Bytes, extract::State, Json};
use hashsync_core::{
    evaluate, extract, group_key, GroupingStrategy, MatchRejection, Preferences, ReleaseMetadata,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::handlers::{bad_request, parse_json, resolve_preferences, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct GroupKeys {
    pub generic: String,
    pub show_aware: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    #[serde(flatten)]
    pub metadata: ReleaseMetadata,
    pub group_keys: GroupKeys,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub label: String,
    /// Replaces the configured preferences when present.
    #[serde(default)]
    pub preferences: Option<Preferences>,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub matches: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<MatchRejection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn require_label(label: &str) -> Result<(), ApiError> {
    if label.trim().is_empty() {
        return Err(bad_request("label must not be empty"));
    }
    Ok(())
}

/// POST /api/v1/metadata/extract
///
/// Extract release metadata and the keys the label would be grouped under.
pub async fn extract_metadata(
    Json(body): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, ApiError> {
    require_label(&body.label)?;
    let metadata = extract(&body.label);
    let group_keys = GroupKeys {
        generic: group_key(&metadata, GroupingStrategy::Generic),
        show_aware: group_key(&metadata, GroupingStrategy::ShowAware),
    };
    Ok(Json(ExtractResponse {
        metadata,
        group_keys,
    }))
}

/// POST /api/v1/metadata/match
///
/// Check a label against preferences, reporting the first failed clause.
pub async fn match_preferences(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<MatchResponse>, ApiError> {
    let body: MatchRequest = parse_json(&body)?;
    require_label(&body.label)?;
    let prefs = resolve_preferences(body.preferences.as_ref(), &state)?;
    let metadata = extract(&body.label);

    let response = match evaluate(&metadata, prefs) {
        Ok(()) => MatchResponse {
            matches: true,
            rejection: None,
            message: None,
        },
        Err(rejection) => MatchResponse {
            matches: false,
            message: Some(rejection.to_string()),
            rejection: Some(rejection),
        },
    };
    Ok(Json(response))
}
