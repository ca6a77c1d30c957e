//! Label to metadata extraction.
//!
//! Every function here is total: labels with no recognizable information
//! produce `Unknown`/`Sdr`/`Movie` defaults instead of errors.

use super::patterns::{
    BRACKETED, CODEC_TABLE, HDR_TABLE, QUALITY_TOKEN, QUALITY_TOKENS, RESOLUTION_TOKEN,
    SEPARATORS, SIZE, SIZE_VALUE, SOURCE_CODEC_TAGS, TV_MARKERS, WHITESPACE,
};
use super::types::{
    CodecKind, ContentType, HdrTier, QualityTier, ReleaseMetadata, ReleaseSize, SizeUnit,
};

/// Extract structured metadata from a release label.
pub fn extract(label: &str) -> ReleaseMetadata {
    ReleaseMetadata {
        title: clean_title(label),
        raw_title: label.to_string(),
        quality: extract_quality(label),
        size: extract_size(label),
        content_type: detect_content_type(label),
        hdr: detect_hdr(label),
        codec: detect_codec(label),
    }
}

/// Heuristic title normalizer.
///
/// Strips bracketed groups, resolution tokens and source/codec tags, turns
/// `.`/`_` separators into spaces and collapses whitespace. Applied until the
/// output stops changing, so `clean_title(clean_title(x)) == clean_title(x)`.
pub fn clean_title(label: &str) -> String {
    let mut current = label.to_string();
    loop {
        let next = clean_once(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn clean_once(input: &str) -> String {
    let s = BRACKETED.replace_all(input, " ");
    let s = RESOLUTION_TOKEN.replace_all(&s, " ");
    let s = SOURCE_CODEC_TAGS.replace_all(&s, " ");
    let s = SEPARATORS.replace_all(&s, " ");
    let s = WHITESPACE.replace_all(&s, " ");
    s.trim_matches(|c: char| c.is_whitespace() || c == '-')
        .to_string()
}

/// First resolution token in the uncleaned label.
pub fn extract_quality(label: &str) -> QualityTier {
    let Some(token) = QUALITY_TOKEN.find(label) else {
        return QualityTier::Unknown;
    };
    let token = token.as_str().to_lowercase();
    QUALITY_TOKENS
        .iter()
        .find(|(text, _)| *text == token)
        .map(|(_, tier)| *tier)
        .unwrap_or(QualityTier::Other)
}

/// First `<number>(GB|MB)` in the label.
pub fn extract_size(label: &str) -> Option<ReleaseSize> {
    size_from(&SIZE, label)
}

/// Parse a string that is exactly one size, such as `"1.5 GB"`.
///
/// Unlike [`extract_size`], surrounding text (a sign, a second value) makes
/// the whole input invalid.
pub fn parse_size_value(value: &str) -> Option<ReleaseSize> {
    size_from(&SIZE_VALUE, value)
}

fn size_from(pattern: &regex_lite::Regex, text: &str) -> Option<ReleaseSize> {
    let caps = pattern.captures(text)?;
    let amount: f64 = caps.get(1)?.as_str().replace(',', ".").parse().ok()?;
    let unit = if caps.get(2)?.as_str().eq_ignore_ascii_case("gb") {
        SizeUnit::Gb
    } else {
        SizeUnit::Mb
    };
    Some(ReleaseSize { amount, unit })
}

pub fn detect_content_type(label: &str) -> ContentType {
    if TV_MARKERS.iter().any(|re| re.is_match(label)) {
        ContentType::Tv
    } else {
        ContentType::Movie
    }
}

/// Dolby Vision > HDR10+ > HDR10 > HDR > SDR.
pub fn detect_hdr(label: &str) -> HdrTier {
    HDR_TABLE
        .iter()
        .find(|(re, _)| re.is_match(label))
        .map(|(_, tier)| *tier)
        .unwrap_or(HdrTier::Sdr)
}

/// HEVC aliases, then H.264 aliases, then AV1.
pub fn detect_codec(label: &str) -> CodecKind {
    CODEC_TABLE
        .iter()
        .find(|(re, _)| re.is_match(label))
        .map(|(_, codec)| *codec)
        .unwrap_or(CodecKind::Unknown)
}
