// post.rs — Social-post identifiers and fetched content.

use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Text and links of a fetched post.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostContent {
    pub text: String,
    /// Expanded URLs embedded in the post (shortened links resolved).
    #[serde(default)]
    pub embedded_urls: Vec<String>,
}

impl PostContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            embedded_urls: Vec::new(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.embedded_urls.push(url.into());
        self
    }
}

const POST_HOSTS: &[&str] = &["twitter.com", "x.com"];

/// Extract the numeric post id from a twitter.com / x.com status URL.
///
/// Accepts `www.` and `mobile.` subdomains and any path of the form
/// `.../status/<digits>[/...]`. Returns `None` for anything else.
pub fn parse_post_id(url: &str) -> Option<String> {
    let url = Url::parse(url.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let full_host = url.host_str()?.to_ascii_lowercase();
    let host = full_host
        .strip_prefix("www.")
        .or_else(|| full_host.strip_prefix("mobile."))
        .unwrap_or(full_host.as_str());
    if !POST_HOSTS.contains(&host) {
        return None;
    }

    let mut segments = url.path_segments()?;
    segments.find(|s| *s == "status" || *s == "statuses")?;
    let id = segments.next()?;
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
        Some(id.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_post_urls() {
        assert_eq!(
            parse_post_id("https://twitter.com/alice/status/1234567890"),
            Some("1234567890".to_string())
        );
        assert_eq!(
            parse_post_id("https://x.com/alice/status/42?s=20"),
            Some("42".to_string())
        );
        assert_eq!(
            parse_post_id("https://mobile.twitter.com/alice/status/7/photo/1"),
            Some("7".to_string())
        );
        assert_eq!(
            parse_post_id("https://www.x.com/i/web/status/99"),
            Some("99".to_string())
        );
    }

    #[test]
    fn rejects_other_urls() {
        assert_eq!(parse_post_id("not a url"), None);
        assert_eq!(parse_post_id("https://example.com/alice/status/1"), None);
        assert_eq!(parse_post_id("https://x.com/alice"), None);
        assert_eq!(parse_post_id("https://x.com/alice/status/abc"), None);
        assert_eq!(parse_post_id("ftp://x.com/alice/status/1"), None);
    }
}
