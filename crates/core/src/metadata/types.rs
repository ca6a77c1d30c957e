//! Types produced by the metadata extractor.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discrete resolution class of a release.
///
/// Ordered by [`QualityTier::rank`]; `Unknown` sorts below everything.
///
/// Serialized as [`QualityTier::as_str`] and parsed through [`FromStr`], so
/// config and API input accept any case (`"1080P"`, `"Uhd"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum QualityTier {
    Unknown,
    Other,
    Sd480,
    Hd720,
    FullHd1080,
    Uhd2160,
    Uhd4k,
}

impl QualityTier {
    /// All tiers, lowest rank first.
    pub const ALL: [QualityTier; 7] = [
        QualityTier::Unknown,
        QualityTier::Other,
        QualityTier::Sd480,
        QualityTier::Hd720,
        QualityTier::FullHd1080,
        QualityTier::Uhd2160,
        QualityTier::Uhd4k,
    ];

    /// Integer rank used for every quality comparison.
    pub fn rank(&self) -> i32 {
        match self {
            QualityTier::Unknown => -1,
            QualityTier::Other => 0,
            QualityTier::Sd480 => 1,
            QualityTier::Hd720 => 2,
            QualityTier::FullHd1080 => 3,
            QualityTier::Uhd2160 => 4,
            QualityTier::Uhd4k => 5,
        }
    }

    pub fn is_known(&self) -> bool {
        *self != QualityTier::Unknown
    }

    /// Returns the string representation for API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Unknown => "unknown",
            QualityTier::Other => "other",
            QualityTier::Sd480 => "480p",
            QualityTier::Hd720 => "720p",
            QualityTier::FullHd1080 => "1080p",
            QualityTier::Uhd2160 => "2160p",
            QualityTier::Uhd4k => "4k",
        }
    }
}

impl PartialOrd for QualityTier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QualityTier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityTier {
    type Err = MetadataParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unknown" => Ok(QualityTier::Unknown),
            "other" => Ok(QualityTier::Other),
            "480p" => Ok(QualityTier::Sd480),
            "720p" => Ok(QualityTier::Hd720),
            "1080p" => Ok(QualityTier::FullHd1080),
            "2160p" => Ok(QualityTier::Uhd2160),
            "4k" | "uhd" => Ok(QualityTier::Uhd4k),
            other => Err(MetadataParseError::UnknownQuality(other.to_string())),
        }
    }
}

impl TryFrom<String> for QualityTier {
    type Error = MetadataParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QualityTier> for String {
    fn from(tier: QualityTier) -> Self {
        tier.as_str().to_string()
    }
}

/// Dynamic-range classification of a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HdrTier {
    #[default]
    Sdr,
    Hdr,
    Hdr10,
    Hdr10Plus,
    DolbyVision,
}

impl HdrTier {
    pub fn is_hdr(&self) -> bool {
        *self != HdrTier::Sdr
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HdrTier::Sdr => "SDR",
            HdrTier::Hdr => "HDR",
            HdrTier::Hdr10 => "HDR10",
            HdrTier::Hdr10Plus => "HDR10+",
            HdrTier::DolbyVision => "Dolby Vision",
        }
    }
}

impl fmt::Display for HdrTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecKind {
    Hevc,
    H264,
    Av1,
    #[default]
    Unknown,
}

impl CodecKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodecKind::Hevc => "HEVC",
            CodecKind::H264 => "H.264",
            CodecKind::Av1 => "AV1",
            CodecKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Movie or TV content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Movie,
    Tv,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Movie => "movie",
            ContentType::Tv => "tv",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit a release size was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeUnit {
    #[serde(rename = "MB")]
    Mb,
    #[serde(rename = "GB")]
    Gb,
}

/// MB per GB.
pub const MB_PER_GB: f64 = 1024.0;

/// A size as written in a label: `{amount, unit}`, comparable in GB.
///
/// Serialized as a string such as `"1.5 GB"` so it can be written that way
/// in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReleaseSize {
    pub amount: f64,
    pub unit: SizeUnit,
}

impl ReleaseSize {
    pub fn gb(amount: f64) -> Self {
        Self {
            amount,
            unit: SizeUnit::Gb,
        }
    }

    pub fn mb(amount: f64) -> Self {
        Self {
            amount,
            unit: SizeUnit::Mb,
        }
    }

    /// Size in GB (1 GB = 1024 MB).
    pub fn to_gb(&self) -> f64 {
        match self.unit {
            SizeUnit::Gb => self.amount,
            SizeUnit::Mb => self.amount / MB_PER_GB,
        }
    }

    /// Size in bytes, rounded down.
    pub fn to_bytes(&self) -> u64 {
        let mb = match self.unit {
            SizeUnit::Gb => self.amount * MB_PER_GB,
            SizeUnit::Mb => self.amount,
        };
        (mb * 1024.0 * 1024.0) as u64
    }
}

impl fmt::Display for ReleaseSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            SizeUnit::Gb => "GB",
            SizeUnit::Mb => "MB",
        };
        write!(f, "{} {}", self.amount, unit)
    }
}

impl FromStr for ReleaseSize {
    type Err = MetadataParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        super::extractor::parse_size_value(s)
            .ok_or_else(|| MetadataParseError::InvalidSize(s.to_string()))
    }
}

impl TryFrom<String> for ReleaseSize {
    type Error = MetadataParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReleaseSize> for String {
    fn from(size: ReleaseSize) -> Self {
        size.to_string()
    }
}

/// Errors from parsing user-supplied metadata values (config, API input).
///
/// Label extraction itself never fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataParseError {
    #[error("Unknown quality tier: {0}")]
    UnknownQuality(String),

    #[error("Invalid size: {0} (expected e.g. \"1.5 GB\" or \"700MB\")")]
    InvalidSize(String),
}

/// Structured view of a free-text release label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseMetadata {
    /// Cleaned, human-readable title.
    pub title: String,
    /// The label exactly as it was extracted from.
    pub raw_title: String,
    pub quality: QualityTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<ReleaseSize>,
    pub content_type: ContentType,
    pub hdr: HdrTier,
    pub codec: CodecKind,
}

/// A discovered release competing for selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Magnet URI or other identifier the submission sink understands.
    pub source_id: String,
    pub metadata: ReleaseMetadata,
}

impl Candidate {
    /// Build a candidate by extracting metadata from its label.
    pub fn from_label(source_id: impl Into<String>, label: &str) -> Self {
        Self {
            source_id: source_id.into(),
            metadata: super::extract(label),
        }
    }

    pub fn quality(&self) -> QualityTier {
        self.metadata.quality
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_rank_is_monotonic() {
        for pair in QualityTier::ALL.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(QualityTier::Unknown.rank(), -1);
        assert_eq!(QualityTier::Uhd4k.rank(), 5);
    }

    #[test]
    fn test_quality_from_str() {
        assert_eq!("1080p".parse::<QualityTier>().unwrap(), QualityTier::FullHd1080);
        assert_eq!("UHD".parse::<QualityTier>().unwrap(), QualityTier::Uhd4k);
        assert_eq!("4K".parse::<QualityTier>().unwrap(), QualityTier::Uhd4k);
        assert!("1440".parse::<QualityTier>().is_err());
    }

    #[test]
    fn test_quality_serialization() {
        assert_eq!(
            serde_json::to_string(&QualityTier::FullHd1080).unwrap(),
            "\"1080p\""
        );
        let parsed: QualityTier = serde_json::from_str("\"uhd\"").unwrap();
        assert_eq!(parsed, QualityTier::Uhd4k);
    }

    #[test]
    fn test_quality_deserialize_any_case() {
        for (text, tier) in [
            ("\"1080P\"", QualityTier::FullHd1080),
            ("\"720P\"", QualityTier::Hd720),
            ("\"Uhd\"", QualityTier::Uhd4k),
            ("\"4K\"", QualityTier::Uhd4k),
            ("\"Unknown\"", QualityTier::Unknown),
        ] {
            let parsed: QualityTier = serde_json::from_str(text).unwrap();
            assert_eq!(parsed, tier, "{}", text);
        }
        assert!(serde_json::from_str::<QualityTier>("\"1440p\"").is_err());

        #[derive(Deserialize)]
        struct Wrapper {
            quality: QualityTier,
        }
        let wrapper: Wrapper = toml::from_str(r#"quality = "2160P""#).unwrap();
        assert_eq!(wrapper.quality, QualityTier::Uhd2160);
    }

    #[test]
    fn test_hdr_and_codec_display() {
        assert_eq!(HdrTier::Hdr10Plus.to_string(), "HDR10+");
        assert_eq!(HdrTier::DolbyVision.to_string(), "Dolby Vision");
        assert_eq!(CodecKind::H264.to_string(), "H.264");
        assert!(!HdrTier::Sdr.is_hdr());
        assert!(HdrTier::Hdr.is_hdr());
    }

    #[test]
    fn test_size_conversion() {
        assert_eq!(ReleaseSize::mb(1024.0).to_gb(), ReleaseSize::gb(1.0).to_gb());
        assert_eq!(ReleaseSize::gb(1.0).to_bytes(), 1024 * 1024 * 1024);
        assert_eq!(ReleaseSize::mb(512.0).to_gb(), 0.5);
    }

    #[test]
    fn test_size_string_round_trip_in_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            max: ReleaseSize,
        }
        let wrapper: Wrapper = toml::from_str(r#"max = "2.5 GB""#).unwrap();
        assert_eq!(wrapper.max, ReleaseSize::gb(2.5));

        let bad: Result<Wrapper, _> = toml::from_str(r#"max = "huge""#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_size_from_str_requires_whole_value() {
        assert_eq!("1.5 GB".parse::<ReleaseSize>().unwrap(), ReleaseSize::gb(1.5));
        assert_eq!(" 700mb ".parse::<ReleaseSize>().unwrap(), ReleaseSize::mb(700.0));
        assert_eq!("2,5GB".parse::<ReleaseSize>().unwrap(), ReleaseSize::gb(2.5));

        for bad in ["-5 GB", "about 5 GB", "5 GB please", "5 GB 2 GB", "GB", ""] {
            assert!(
                matches!(bad.parse::<ReleaseSize>(), Err(MetadataParseError::InvalidSize(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }
}
