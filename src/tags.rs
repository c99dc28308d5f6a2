//! Tag normalization
//!
//! Tags are stored lowercase and trimmed, in the order they were submitted

/// Normalize tags for storage
pub fn normalize(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| tag.trim().to_lowercase())
        .collect::<Vec<String>>()
}

/// Parse a comma separated tag filter into normalized tags
pub fn parse_filter(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|tag| tag.trim().to_lowercase())
        .collect::<Vec<String>>()
}
