//! User preferences the matcher and selector evaluate against.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metadata::{QualityTier, ReleaseSize};

/// How dynamic range constrains matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HdrPreference {
    /// No HDR constraint.
    #[default]
    #[serde(alias = "ANY")]
    Any,
    /// Reject any HDR release.
    #[serde(alias = "sdr_only")]
    SdrOnly,
    /// Reject SDR releases.
    #[serde(alias = "hdr_only")]
    HdrOnly,
    /// No filtering; HDR wins ties between same-quality releases.
    #[serde(alias = "hdr_preferred")]
    HdrPreferred,
}

impl HdrPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            HdrPreference::Any => "any",
            HdrPreference::SdrOnly => "sdr-only",
            HdrPreference::HdrOnly => "hdr-only",
            HdrPreference::HdrPreferred => "hdr-preferred",
        }
    }
}

impl fmt::Display for HdrPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Release type a user can whitelist.
///
/// Names that are not recognized are kept so they can be reported, but they
/// never match any release.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReleaseType {
    Remux,
    Bluray,
    Web,
    Unrecognized(String),
}

impl ReleaseType {
    pub fn as_str(&self) -> &str {
        match self {
            ReleaseType::Remux => "remux",
            ReleaseType::Bluray => "bluray",
            ReleaseType::Web => "web",
            ReleaseType::Unrecognized(name) => name,
        }
    }
}

impl From<String> for ReleaseType {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "remux" => ReleaseType::Remux,
            "bluray" => ReleaseType::Bluray,
            "web" => ReleaseType::Web,
            _ => ReleaseType::Unrecognized(value),
        }
    }
}

impl From<&str> for ReleaseType {
    fn from(value: &str) -> Self {
        ReleaseType::from(value.to_string())
    }
}

impl From<ReleaseType> for String {
    fn from(value: ReleaseType) -> Self {
        value.as_str().to_string()
    }
}

/// Preferences for one selection or scan run.
///
/// Absent fields disable the clause they drive rather than rejecting
/// everything. The engine only ever borrows this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Target quality. Unset means "no ceiling".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityTier>,
    #[serde(default)]
    pub allow_higher_quality: bool,
    #[serde(default)]
    pub allow_lower_quality: bool,
    #[serde(default)]
    pub hdr_preference: HdrPreference,
    /// Release-type whitelist; empty accepts every type.
    #[serde(default)]
    pub file_types: Vec<ReleaseType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<ReleaseSize>,
    #[serde(default)]
    pub auto_upgrade: bool,
    #[serde(default)]
    pub delete_old_after_upgrade: bool,
    #[serde(default = "default_max_upgrade_matches")]
    pub max_upgrade_matches: usize,
    #[serde(default)]
    pub complete_seasons: bool,
}

fn default_max_upgrade_matches() -> usize {
    3
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            quality: None,
            allow_higher_quality: false,
            allow_lower_quality: false,
            hdr_preference: HdrPreference::Any,
            file_types: Vec::new(),
            max_size: None,
            auto_upgrade: false,
            delete_old_after_upgrade: false,
            max_upgrade_matches: default_max_upgrade_matches(),
            complete_seasons: false,
        }
    }
}

impl Preferences {
    /// Preferences targeting a single quality tier, everything else default.
    pub fn for_quality(quality: QualityTier) -> Self {
        Self {
            quality: Some(quality),
            ..Default::default()
        }
    }

    /// Ceiling used for selection and upgrade checks.
    ///
    /// Without a configured quality there is no ceiling, which is the same as
    /// targeting the highest tier.
    pub fn target_quality(&self) -> QualityTier {
        self.quality.unwrap_or(QualityTier::Uhd4k)
    }
}
