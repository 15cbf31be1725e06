// verifier.rs — Post fetching trait and bounded retry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::VerifyError;
use crate::post::PostContent;

/// Fetches the content of a public social post by id.
#[async_trait]
pub trait PostVerifier: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_post(&self, post_id: &str) -> Result<PostContent, VerifyError>;
}

fn default_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    1000
}

/// Fixed-delay retry bound for post fetches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryPolicy {
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts,
            delay_ms: delay.as_millis() as u64,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Fetch a post, retrying failures up to `policy.attempts` times.
///
/// A policy of zero attempts still makes one request. The delay is only
/// slept between attempts, never after the last one.
pub async fn fetch_with_retry(
    verifier: &dyn PostVerifier,
    post_id: &str,
    policy: &RetryPolicy,
) -> Result<PostContent, VerifyError> {
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match verifier.fetch_post(post_id).await {
            Ok(post) => return Ok(post),
            Err(e) if attempt >= attempts => {
                return Err(VerifyError::Exhausted {
                    attempts,
                    last: Box::new(e),
                })
            }
            Err(e) => {
                tracing::warn!(
                    verifier = verifier.name(),
                    post_id,
                    attempt,
                    error = %e,
                    "post fetch failed, retrying"
                );
                tokio::time::sleep(policy.delay()).await;
                attempt += 1;
            }
        }
    }
}

/// In-memory posts, for demo mode and tests.
#[derive(Default)]
pub struct StaticPostVerifier {
    posts: Mutex<HashMap<String, PostContent>>,
    failures_remaining: AtomicU32,
    calls: AtomicU32,
}

impl StaticPostVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a post under `post_id`.
    pub fn with_post(self, post_id: impl Into<String>, post: PostContent) -> Self {
        self.insert(post_id, post);
        self
    }

    /// Fail the next `n` fetches with a transport error.
    pub fn failing_first(self, n: u32) -> Self {
        self.failures_remaining.store(n, Ordering::SeqCst);
        self
    }

    pub fn insert(&self, post_id: impl Into<String>, post: PostContent) {
        if let Ok(mut posts) = self.posts.lock() {
            posts.insert(post_id.into(), post);
        }
    }

    /// Number of fetches attempted so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PostVerifier for StaticPostVerifier {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_post(&self, post_id: &str) -> Result<PostContent, VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(VerifyError::Fetch("scripted failure".to_string()));
        }

        let posts = self
            .posts
            .lock()
            .map_err(|e| VerifyError::Fetch(e.to_string()))?;
        posts
            .get(post_id)
            .cloned()
            .ok_or_else(|| VerifyError::NotFound(post_id.to_string()))
    }
}
