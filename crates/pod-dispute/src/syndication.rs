// syndication.rs — Public post fetcher over the syndication JSON endpoint.
//
// No authentication is involved. The endpoint rate-limits occasionally, so
// callers go through `fetch_with_retry`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::error::VerifyError;
use crate::post::PostContent;
use crate::verifier::PostVerifier;

pub const DEFAULT_BASE_URL: &str = "https://cdn.syndication.twimg.com";

pub struct SyndicationVerifier {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SyndicationPost {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    full_text: Option<String>,
    #[serde(default)]
    entities: Option<Entities>,
}

#[derive(Debug, Default, Deserialize)]
struct Entities {
    #[serde(default)]
    urls: Vec<EntityUrl>,
}

#[derive(Debug, Deserialize)]
struct EntityUrl {
    #[serde(default)]
    expanded_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl SyndicationVerifier {
    pub fn new(base_url: Option<String>, timeout: Duration) -> Result<Self, VerifyError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl From<SyndicationPost> for PostContent {
    fn from(post: SyndicationPost) -> Self {
        let text = post
            .text
            .filter(|t| !t.is_empty())
            .or(post.full_text)
            .unwrap_or_default();
        let embedded_urls = post
            .entities
            .unwrap_or_default()
            .urls
            .into_iter()
            .filter_map(|u| u.expanded_url.or(u.url))
            .collect();
        PostContent {
            text,
            embedded_urls,
        }
    }
}

#[async_trait]
impl PostVerifier for SyndicationVerifier {
    fn name(&self) -> &str {
        "syndication"
    }

    async fn fetch_post(&self, post_id: &str) -> Result<PostContent, VerifyError> {
        let response = self
            .client
            .get(format!("{}/widgets/tweet.json", self.base_url))
            .query(&[("id", post_id)])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(VerifyError::NotFound(post_id.to_string()));
        }
        if !status.is_success() {
            return Err(VerifyError::Fetch(format!("status {}", status.as_u16())));
        }

        let post: SyndicationPost = response
            .json()
            .await
            .map_err(|e| VerifyError::Parse(e.to_string()))?;
        tracing::debug!(post_id, "post fetched");
        Ok(post.into())
    }
}
