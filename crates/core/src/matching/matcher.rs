//! Preference predicate over release metadata.
//!
//! Clauses run in a fixed order and stop at the first failure:
//! HDR policy, quality bounds, release-type whitelist, size cap.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::metadata::{HdrTier, QualityTier, ReleaseMetadata};

use super::preferences::{HdrPreference, Preferences, ReleaseType};

static REMUX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)remux").unwrap());
static BLURAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)bluray|bdrip").unwrap());
static WEB: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)web-dl|webrip").unwrap());

/// Why a release failed the preference predicate.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum MatchRejection {
    #[error("HDR policy {policy} rejects {actual}")]
    HdrPolicy {
        policy: HdrPreference,
        actual: HdrTier,
    },

    #[error("quality {actual} is above preferred {preferred}")]
    QualityTooHigh {
        actual: QualityTier,
        preferred: QualityTier,
    },

    #[error("quality {actual} is below preferred {preferred}")]
    QualityTooLow {
        actual: QualityTier,
        preferred: QualityTier,
    },

    #[error("release type not in whitelist [{}]", .allowed.join(", "))]
    ReleaseType { allowed: Vec<String> },

    #[error("size {size_gb:.2} GB exceeds cap {cap_gb:.2} GB")]
    SizeCap { size_gb: f64, cap_gb: f64 },
}

/// Evaluate every clause, returning the first rejection.
pub fn evaluate(metadata: &ReleaseMetadata, prefs: &Preferences) -> Result<(), MatchRejection> {
    check_hdr(metadata, prefs)?;
    check_quality(metadata, prefs)?;
    check_release_type(metadata, prefs)?;
    check_size(metadata, prefs)
}

pub fn matches(metadata: &ReleaseMetadata, prefs: &Preferences) -> bool {
    evaluate(metadata, prefs).is_ok()
}

fn check_hdr(metadata: &ReleaseMetadata, prefs: &Preferences) -> Result<(), MatchRejection> {
    let rejected = match prefs.hdr_preference {
        HdrPreference::SdrOnly => metadata.hdr.is_hdr(),
        HdrPreference::HdrOnly => !metadata.hdr.is_hdr(),
        HdrPreference::Any | HdrPreference::HdrPreferred => false,
    };
    if rejected {
        return Err(MatchRejection::HdrPolicy {
            policy: prefs.hdr_preference,
            actual: metadata.hdr,
        });
    }
    Ok(())
}

fn check_quality(metadata: &ReleaseMetadata, prefs: &Preferences) -> Result<(), MatchRejection> {
    let Some(preferred) = prefs.quality else {
        return Ok(());
    };
    let actual = metadata.quality;
    if !actual.is_known() || actual == preferred {
        return Ok(());
    }
    if actual > preferred && !prefs.allow_higher_quality {
        return Err(MatchRejection::QualityTooHigh { actual, preferred });
    }
    if actual < preferred && !prefs.allow_lower_quality {
        return Err(MatchRejection::QualityTooLow { actual, preferred });
    }
    Ok(())
}

/// The whitelist is checked against the uncleaned label: cleaning strips the
/// very tags these patterns look for.
fn check_release_type(
    metadata: &ReleaseMetadata,
    prefs: &Preferences,
) -> Result<(), MatchRejection> {
    if prefs.file_types.is_empty() {
        return Ok(());
    }
    let label = &metadata.raw_title;
    if prefs
        .file_types
        .iter()
        .any(|t| release_type_matches(t, label))
    {
        return Ok(());
    }
    Err(MatchRejection::ReleaseType {
        allowed: prefs
            .file_types
            .iter()
            .map(|t| t.as_str().to_string())
            .collect(),
    })
}

pub fn release_type_matches(release_type: &ReleaseType, label: &str) -> bool {
    match release_type {
        ReleaseType::Remux => REMUX.is_match(label),
        ReleaseType::Bluray => BLURAY.is_match(label),
        ReleaseType::Web => WEB.is_match(label),
        ReleaseType::Unrecognized(_) => false,
    }
}

fn check_size(metadata: &ReleaseMetadata, prefs: &Preferences) -> Result<(), MatchRejection> {
    let (Some(cap), Some(size)) = (prefs.max_size, metadata.size) else {
        return Ok(());
    };
    let (size_gb, cap_gb) = (size.to_gb(), cap.to_gb());
    if size_gb > cap_gb {
        return Err(MatchRejection::SizeCap { size_gb, cap_gb });
    }
    Ok(())
}
