//! Local hash-list index used as the candidate source.

mod index;
mod parser;

pub use index::HashListIndex;
pub use parser::{parse_hash_list, parse_line, HashEntry, ParsedHashList};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashListError {
    #[error("Failed to read hash list {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid info hash: {0}")]
    InvalidHash(String),

    #[error("Malformed line: {0}")]
    MalformedLine(String),
}
