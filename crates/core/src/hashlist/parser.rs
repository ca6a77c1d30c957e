//! Hash-list line parser.
//!
//! Accepted line shapes:
//!
//! ```text
//! magnet:?xt=urn:btih:<hash>&dn=<url-encoded name>[&...]
//! <40 hex chars> <name>
//! # comment
//! ```

use tracing::debug;

use crate::metadata::{extract, ReleaseMetadata};

use super::HashListError;

/// One release listed in a hash list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashEntry {
    /// Info hash, lowercase hex (or uppercase base32 as given).
    pub info_hash: String,
    /// Release name used for metadata extraction.
    pub name: String,
}

impl HashEntry {
    pub fn magnet_uri(&self) -> String {
        format!(
            "magnet:?xt=urn:btih:{}&dn={}",
            self.info_hash,
            urlencoding::encode(&self.name)
        )
    }

    pub fn metadata(&self) -> ReleaseMetadata {
        extract(&self.name)
    }
}

/// Result of parsing a whole hash list.
#[derive(Debug, Clone, Default)]
pub struct ParsedHashList {
    pub entries: Vec<HashEntry>,
    /// Non-blank, non-comment lines that could not be parsed.
    pub skipped: usize,
}

pub fn parse_hash_list(text: &str) -> ParsedHashList {
    let mut parsed = ParsedHashList::default();
    for (line_no, line) in text.lines().enumerate() {
        match parse_line(line) {
            Ok(Some(entry)) => parsed.entries.push(entry),
            Ok(None) => {}
            Err(e) => {
                debug!("Skipping hash list line {}: {}", line_no + 1, e);
                parsed.skipped += 1;
            }
        }
    }
    parsed
}

/// Parse one line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<HashEntry>, HashListError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    if let Some(query) = strip_prefix_ignore_case(line, "magnet:?") {
        return parse_magnet(line, query).map(Some);
    }

    let (hash, name) = line
        .split_once(char::is_whitespace)
        .ok_or_else(|| HashListError::MalformedLine(truncate(line)))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(HashListError::MalformedLine(truncate(line)));
    }
    Ok(Some(HashEntry {
        info_hash: normalize_hash(hash)?,
        name: name.to_string(),
    }))
}

fn parse_magnet(uri: &str, query: &str) -> Result<HashEntry, HashListError> {
    let mut info_hash = None;
    let mut name = None;

    for param in query.split('&') {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        match key.to_ascii_lowercase().as_str() {
            "xt" if info_hash.is_none() => {
                if let Some(hash) = strip_prefix_ignore_case(value, "urn:btih:") {
                    info_hash = Some(normalize_hash(hash)?);
                }
            }
            "dn" if name.is_none() => {
                let plus_decoded = value.replace('+', " ");
                let decoded = urlencoding::decode(&plus_decoded)
                    .map_err(|e| HashListError::MalformedLine(format!("bad dn: {}", e)))?;
                name = Some(decoded.trim().to_string());
            }
            _ => {}
        }
    }

    let info_hash = info_hash
        .ok_or_else(|| HashListError::MalformedLine(format!("no btih in {}", truncate(uri))))?;
    let name = name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| HashListError::MalformedLine(format!("no dn in {}", truncate(uri))))?;

    Ok(HashEntry { info_hash, name })
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        value.get(prefix.len()..)
    } else {
        None
    }
}

/// Accept 40-char hex (lowercased) or 32-char base32 (uppercased).
fn normalize_hash(hash: &str) -> Result<String, HashListError> {
    if hash.len() == 40 && hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return Ok(hash.to_ascii_lowercase());
    }
    if hash.len() == 32
        && hash
            .chars()
            .all(|c| c.is_ascii_alphabetic() || ('2'..='7').contains(&c))
    {
        return Ok(hash.to_ascii_uppercase());
    }
    Err(HashListError::InvalidHash(truncate(hash)))
}

fn truncate(s: &str) -> String {
    s.chars().take(80).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "0123456789abcdef0123456789abcdef01234567";

    #[test]
    fn test_parse_plain_line() {
        let entry = parse_line(&format!("{} Movie.Title.2023.1080p.BluRay.x264", HASH.to_uppercase()))
            .unwrap()
            .unwrap();
        assert_eq!(entry.info_hash, HASH);
        assert_eq!(entry.name, "Movie.Title.2023.1080p.BluRay.x264");
    }

    #[test]
    fn test_parse_magnet_line() {
        let line = format!(
            "magnet:?xt=urn:btih:{}&dn=Show.Name.S01E01.720p%20WEB-DL&tr=udp%3A%2F%2Ftracker",
            HASH
        );
        let entry = parse_line(&line).unwrap().unwrap();
        assert_eq!(entry.info_hash, HASH);
        assert_eq!(entry.name, "Show.Name.S01E01.720p WEB-DL");
    }

    #[test]
    fn test_magnet_plus_is_space() {
        let line = format!("magnet:?dn=Some+Movie+2020&xt=urn:btih:{}", HASH);
        let entry = parse_line(&line).unwrap().unwrap();
        assert_eq!(entry.name, "Some Movie 2020");
    }

    #[test]
    fn test_comments_and_blanks_are_ignored() {
        assert!(parse_line("").unwrap().is_none());
        assert!(parse_line("   ").unwrap().is_none());
        assert!(parse_line("# exported list").unwrap().is_none());
    }

    #[test]
    fn test_malformed_lines() {
        assert!(matches!(
            parse_line("nothashatall"),
            Err(HashListError::MalformedLine(_))
        ));
        assert!(matches!(
            parse_line("abc123 Some Name"),
            Err(HashListError::InvalidHash(_))
        ));
        assert!(matches!(
            parse_line("magnet:?dn=Name"),
            Err(HashListError::MalformedLine(_))
        ));
        assert!(matches!(
            parse_line(&format!("magnet:?xt=urn:btih:{}", HASH)),
            Err(HashListError::MalformedLine(_))
        ));
    }

    #[test]
    fn test_parse_hash_list_counts_skipped() {
        let text = format!(
            "# header\n{h} Movie.A.1080p\n\nbroken line\nmagnet:?xt=urn:btih:{h}&dn=Movie.B.720p\n",
            h = HASH
        );
        let parsed = parse_hash_list(&text);
        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn test_magnet_uri_round_trips_name() {
        let entry = HashEntry {
            info_hash: HASH.to_string(),
            name: "Movie Title [2023]".to_string(),
        };
        let reparsed = parse_line(&entry.magnet_uri()).unwrap().unwrap();
        assert_eq!(reparsed, entry);
    }
}
