//! Best-effort page title lookup for bookmarks
//!
//! Used when a bookmark is saved without a title. Nothing in here bubbles an
//! error: a failed fetch, a non-success status, or a page without a usable
//! title all resolve to [`FALLBACK_TITLE`]

use std::time::Duration;

/// Hard cap on the whole outbound request
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// User agent presented to the target site
const FETCH_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Title used when the page does not give one up
pub const FALLBACK_TITLE: &str = "Untitled";

/// Fetch the title of a page
///
/// Tries the `<title>` tag first, then the `og:title` meta property
pub async fn fetch_page_title(url: &str) -> String {
    match fetch_html(url).await {
        Ok(html) => extract_title(&html).unwrap_or_else(|| FALLBACK_TITLE.to_string()),
        Err(err) => {
            tracing::debug!("Could not fetch title from {url}: {err}");

            FALLBACK_TITLE.to_string()
        }
    }
}

async fn fetch_html(url: &str) -> Result<String, reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(FETCH_USER_AGENT)
        .build()?;

    let response = client.get(url).send().await?.error_for_status()?;

    response.text().await
}

fn extract_title(html: &str) -> Option<String> {
    extract_tag_text(html, "title").or_else(|| extract_meta_content(html, "og:title"))
}

/// Collapse whitespace, drop values that end up empty
fn text_value(raw: &str) -> Option<String> {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

fn extract_tag_text(html: &str, tag_name: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let open = format!("<{tag_name}");
    let close = format!("</{tag_name}>");

    let start_tag = lower.find(&open)?;
    let start_content = lower[start_tag..].find('>')? + start_tag + 1;
    let end_content = lower[start_content..].find(&close)? + start_content;

    text_value(&decode_entities(&html[start_content..end_content]))
}

fn extract_meta_content(html: &str, property: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let property = property.to_ascii_lowercase();
    let mut cursor = 0usize;

    while let Some(rel) = lower[cursor..].find("<meta") {
        let start = cursor + rel;
        let Some(close_rel) = lower[start..].find('>') else {
            break;
        };
        let end = start + close_rel + 1;

        let tag_lower = &lower[start..end];
        let matches = [
            format!("property=\"{property}\""),
            format!("property='{property}'"),
            format!("name=\"{property}\""),
            format!("name='{property}'"),
        ]
        .iter()
        .any(|needle| tag_lower.contains(needle));

        if matches {
            if let Some(content) = extract_attribute(&html[start..end], "content") {
                return Some(content);
            }
        }

        cursor = end;
    }

    None
}

fn extract_attribute(tag: &str, attribute: &str) -> Option<String> {
    let lower = tag.to_ascii_lowercase();
    let needle = format!("{attribute}=");

    let attr_pos = lower.find(&needle)?;
    let mut value = tag[attr_pos + needle.len()..].trim_start();

    if value.is_empty() {
        return None;
    }

    let extracted = if value.starts_with('"') {
        value = &value[1..];
        let end = value.find('"')?;
        &value[..end]
    } else if value.starts_with('\'') {
        value = &value[1..];
        let end = value.find('\'')?;
        &value[..end]
    } else {
        let end = value
            .find(|ch: char| ch.is_ascii_whitespace() || ch == '>')
            .unwrap_or(value.len());
        &value[..end]
    };

    text_value(&decode_entities(extracted))
}
