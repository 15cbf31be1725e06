// marker.rs — Dispute markers and matching.
//
// A dispute is settled by the owner publishing a social post that carries a
// marker the service can recognize. Two strategies exist and exactly one is
// configured per deployment:
//
//   Token      — a fresh single-use token (POD-XXXXXXXXXXXX) is persisted on
//                the goal and must appear in the post.
//   ProfileUrl — nothing is persisted; the owner's public profile link
//                (absolute, or the /u/<owner> path) must appear in the post.
//
// Either strategy may add a keyword fallback list: if the primary marker is
// absent, any configured keyword found in the post also verifies it.
// Matching is a case-insensitive substring search over the post text and
// its embedded URLs.

use rand::Rng;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::post::PostContent;

/// Base of the pre-filled social-post intent link.
pub const INTENT_BASE: &str = "https://twitter.com/intent/tweet";

/// How a dispute post is recognized.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStrategy {
    #[default]
    Token,
    ProfileUrl,
}

/// Generate a single-use dispute token: `POD-` + 12 upper-case hex chars.
pub fn generate_token() -> String {
    let bytes: [u8; 6] = rand::thread_rng().gen();
    let hex: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
    format!("POD-{}", hex)
}

/// Relative profile path for an owner.
pub fn profile_path(owner: &str) -> String {
    format!("/u/{}", owner)
}

/// Absolute public profile URL for an owner under `site_url`.
pub fn profile_url(site_url: &str, owner: &str) -> String {
    let base = site_url.trim_end_matches('/');
    match Url::parse(base) {
        Ok(mut url) => {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().push("u").push(owner);
            }
            url.to_string()
        }
        Err(_) => format!("{}{}", base, profile_path(owner)),
    }
}

/// The marker a dispute post must carry, plus what to tell the owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisputeMarker {
    pub strategy: MarkerStrategy,
    /// Present under the token strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub profile_url: String,
    pub profile_path: String,
}

impl DisputeMarker {
    /// Token-strategy marker.
    pub fn token(token: impl Into<String>, site_url: &str, owner: &str) -> Self {
        Self {
            strategy: MarkerStrategy::Token,
            token: Some(token.into()),
            profile_url: profile_url(site_url, owner),
            profile_path: profile_path(owner),
        }
    }

    /// Profile-URL-strategy marker.
    pub fn profile(site_url: &str, owner: &str) -> Self {
        Self {
            strategy: MarkerStrategy::ProfileUrl,
            token: None,
            profile_url: profile_url(site_url, owner),
            profile_path: profile_path(owner),
        }
    }

    /// The text a post must contain for the primary match.
    fn needles(&self) -> Vec<&str> {
        match self.strategy {
            MarkerStrategy::Token => self.token.as_deref().into_iter().collect(),
            MarkerStrategy::ProfileUrl => vec![&self.profile_url, &self.profile_path],
        }
    }

    /// The string shown to the owner as "the marker to include".
    pub fn display_marker(&self) -> &str {
        match self.strategy {
            MarkerStrategy::Token => self.token.as_deref().unwrap_or(&self.profile_url),
            MarkerStrategy::ProfileUrl => &self.profile_url,
        }
    }

    /// Pre-filled post text for the dispute.
    pub fn post_text(&self, title: &str) -> String {
        match (&self.strategy, &self.token) {
            (MarkerStrategy::Token, Some(token)) => format!(
                "Dispute: I completed \"{}\". Proof-of-Day token {} {}",
                title, token, self.profile_url
            ),
            _ => format!(
                "Dispute: I completed \"{}\". Proof-of-Day {}",
                title, self.profile_url
            ),
        }
    }

    /// Intent link that opens a pre-filled post.
    pub fn intent_url(&self, title: &str) -> String {
        let text = self.post_text(title);
        match Url::parse_with_params(INTENT_BASE, &[("text", text.as_str())]) {
            Ok(url) => url.to_string(),
            Err(_) => INTENT_BASE.to_string(),
        }
    }

    /// Whether `post` carries this marker, or any of `keywords` as a fallback.
    pub fn is_present_in(&self, post: &PostContent, keywords: &[String]) -> bool {
        let haystack = haystack(post);
        let found = |needle: &str| {
            let needle = needle.trim().to_lowercase();
            !needle.is_empty() && haystack.contains(&needle)
        };

        if self.needles().into_iter().any(found) {
            return true;
        }
        keywords.iter().any(|k| found(k))
    }
}

fn haystack(post: &PostContent) -> String {
    let mut text = post.text.to_lowercase();
    for url in &post.embedded_urls {
        text.push('\n');
        text.push_str(&url.to_lowercase());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: &str = "https://pod.example";

    #[test]
    fn token_format() {
        let token = generate_token();
        assert_eq!(token.len(), 16);
        assert!(token.starts_with("POD-"));
        assert!(token[4..]
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn profile_url_encodes_owner() {
        assert_eq!(profile_url(SITE, "alice"), "https://pod.example/u/alice");
        assert_eq!(profile_url("https://pod.example/", "alice"), "https://pod.example/u/alice");
        assert_eq!(profile_url(SITE, "a b"), "https://pod.example/u/a%20b");
    }

    #[test]
    fn token_match_is_case_insensitive() {
        let marker = DisputeMarker::token("POD-ABCDEF012345", SITE, "alice");
        let post = PostContent::new("did it! pod-abcdef012345 #proofofday");
        assert!(marker.is_present_in(&post, &[]));

        let other = PostContent::new("did it! POD-000000000000");
        assert!(!marker.is_present_in(&other, &[]));
    }

    #[test]
    fn token_strategy_ignores_profile_link() {
        let marker = DisputeMarker::token("POD-ABCDEF012345", SITE, "alice");
        let post = PostContent::new("see https://pod.example/u/alice");
        assert!(!marker.is_present_in(&post, &[]));
    }

    #[test]
    fn profile_match_checks_embedded_urls() {
        let marker = DisputeMarker::profile(SITE, "alice");
        let post = PostContent::new("finished https://t.co/xyz")
            .with_url("https://POD.example/u/alice");
        assert!(marker.is_present_in(&post, &[]));

        let relative = PostContent::new("check /u/alice");
        assert!(marker.is_present_in(&relative, &[]));

        let wrong = PostContent::new("https://pod.example/u/bob");
        assert!(!marker.is_present_in(&wrong, &[]));
    }

    #[test]
    fn keyword_fallback() {
        let marker = DisputeMarker::profile(SITE, "alice");
        let post = PostContent::new("Done with #ProofOfDay today");
        assert!(!marker.is_present_in(&post, &[]));
        assert!(marker.is_present_in(&post, &["#proofofday".to_string()]));
        assert!(!marker.is_present_in(&post, &["  ".to_string()]));
    }

    #[test]
    fn intent_url_carries_marker_text() {
        let marker = DisputeMarker::token("POD-ABCDEF012345", SITE, "alice");
        let intent = marker.intent_url("Read ch.1");
        assert!(intent.starts_with("https://twitter.com/intent/tweet?text="));

        let parsed = Url::parse(&intent).unwrap();
        let text = parsed
            .query_pairs()
            .find(|(k, _)| k == "text")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert_eq!(
            text,
            "Dispute: I completed \"Read ch.1\". Proof-of-Day token POD-ABCDEF012345 https://pod.example/u/alice"
        );
    }

    #[test]
    fn profile_strategy_text_has_no_token() {
        let marker = DisputeMarker::profile(SITE, "alice");
        assert_eq!(marker.display_marker(), "https://pod.example/u/alice");
        assert!(!marker.post_text("Run").contains("token"));
    }
}
