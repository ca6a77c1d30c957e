//! Release metadata extraction.
//!
//! Turns free-text release labels (magnet display names, downloaded
//! filenames) into [`ReleaseMetadata`]: cleaned title, quality tier, size,
//! content type, dynamic-range tier and codec.

mod extractor;
mod patterns;
mod types;

pub use extractor::{
    clean_title, detect_codec, detect_content_type, detect_hdr, extract, extract_quality,
    extract_size,
};
pub use types::*;

pub(crate) use patterns::{COMPLETE_PACK, EPISODE_MARKER, SEASON_MARKER, SEASON_START};
