//! Pattern tables used by the extractor.
//!
//! Each metadata field has its own ordered table; the first matching entry
//! wins. Patterns are compiled once.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::types::{CodecKind, HdrTier, QualityTier};

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

fn compile_table<T: Copy>(table: &[(&str, T)]) -> Vec<(Regex, T)> {
    table
        .iter()
        .map(|(pattern, value)| (compile(pattern), *value))
        .collect()
}

/// Resolution token as it appears in a label.
pub static QUALITY_TOKEN: Lazy<Regex> = Lazy::new(|| compile(r"(?i)\d{3,4}p|4k|uhd"));

/// Token text (lowercased) to tier. Tokens missing here map to `Other`.
pub const QUALITY_TOKENS: &[(&str, QualityTier)] = &[
    ("480p", QualityTier::Sd480),
    ("720p", QualityTier::Hd720),
    ("1080p", QualityTier::FullHd1080),
    ("2160p", QualityTier::Uhd2160),
    ("4k", QualityTier::Uhd4k),
    ("uhd", QualityTier::Uhd4k),
];

pub static SIZE: Lazy<Regex> = Lazy::new(|| compile(r"(?i)(\d+(?:[.,]\d+)?)\s?(gb|mb)"));

/// A user-supplied size value: the whole string must be `<number> <unit>`.
pub static SIZE_VALUE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)^\s*(\d+(?:[.,]\d+)?)\s?(gb|mb)\s*$"));

/// Any of these marks a label as TV content.
pub static TV_MARKERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)S\d{2}E\d{2}",
        r"(?i)\bS\d{2}\b",
        r"(?i)season|episode",
    ]
    .iter()
    .map(|p| compile(p))
    .collect()
});

/// Checked in order: the tiers are not mutually exclusive in labels.
pub static HDR_TABLE: Lazy<Vec<(Regex, HdrTier)>> = Lazy::new(|| {
    compile_table(&[
        (r"(?i)dolby[ ._-]?vision|\bdovi\b|\bdv\b", HdrTier::DolbyVision),
        (r"(?i)hdr10(?:\+|plus)", HdrTier::Hdr10Plus),
        (r"(?i)hdr10", HdrTier::Hdr10),
        (r"(?i)\bhdr\b", HdrTier::Hdr),
    ])
});

pub static CODEC_TABLE: Lazy<Vec<(Regex, CodecKind)>> = Lazy::new(|| {
    compile_table(&[
        (r"(?i)x265|hevc|h\.?265", CodecKind::Hevc),
        (r"(?i)x264|h\.?264", CodecKind::H264),
        (r"(?i)\bav1\b", CodecKind::Av1),
    ])
});

pub static BRACKETED: Lazy<Regex> = Lazy::new(|| compile(r"\[[^\]]*\]|\([^)]*\)"));

pub static RESOLUTION_TOKEN: Lazy<Regex> = Lazy::new(|| compile(r"(?i)\b\d{3,4}p\b"));

/// Source and codec tags, with a release group glued on by a dash.
pub static SOURCE_CODEC_TAGS: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)\b(?:bluray|web-dl|webrip|hdrip|brrip|x264|x265|hevc)\b(?:-[a-z0-9]+)?")
});

pub static SEPARATORS: Lazy<Regex> = Lazy::new(|| compile(r"[._]+"));

pub static WHITESPACE: Lazy<Regex> = Lazy::new(|| compile(r"\s+"));

pub static EPISODE_MARKER: Lazy<Regex> = Lazy::new(|| compile(r"(?i)\bS(\d{2})E\d{2}"));

pub static SEASON_MARKER: Lazy<Regex> = Lazy::new(|| compile(r"(?i)\bS(\d{2})\b"));

/// Start of any season marker, used to cut a show name out of a title.
pub static SEASON_START: Lazy<Regex> = Lazy::new(|| compile(r"(?i)\bS\d{2}"));

pub static COMPLETE_PACK: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)complete|\bseason\b|\bpack\b|\bS\d{2}\b"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tables_compile() {
        assert_eq!(HDR_TABLE.len(), 4);
        assert_eq!(CODEC_TABLE.len(), 3);
        assert_eq!(TV_MARKERS.len(), 3);
        assert!(QUALITY_TOKEN.is_match("1080p"));
        assert!(SIZE.is_match("1.5 GB"));
        assert!(BRACKETED.is_match("[rarbg]"));
    }

    #[test]
    fn test_hdr_rip_is_not_hdr() {
        let (hdr, _) = &HDR_TABLE[3];
        assert!(hdr.is_match("Movie.HDR.mkv"));
        assert!(!hdr.is_match("Movie.HDRip.mkv"));
    }

    #[test]
    fn test_dv_does_not_match_dvdrip() {
        let (dv, _) = &HDR_TABLE[0];
        assert!(dv.is_match("Movie.2160p.DV.HEVC"));
        assert!(!dv.is_match("Movie.DVDRip.XviD"));
    }

    #[test]
    fn test_tag_pattern_takes_release_group() {
        let cleaned = SOURCE_CODEC_TAGS.replace_all("Movie.BluRay.x264-GROUP", "");
        assert_eq!(cleaned, "Movie..");
    }

    #[test]
    fn test_episode_and_season_markers() {
        assert!(EPISODE_MARKER.is_match("Show.S01E02.720p"));
        assert!(!SEASON_MARKER.is_match("Show.S01E02.720p"));
        assert!(SEASON_MARKER.is_match("Show.S01.720p"));
    }
}
