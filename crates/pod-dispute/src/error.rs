// error.rs — Error types for post verification.

use thiserror::Error;

/// Errors raised while fetching a social post.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The post does not exist (or is not public).
    #[error("post {0} not found")]
    NotFound(String),

    /// Transport failure or non-success status from the post source.
    #[error("post fetch failed: {0}")]
    Fetch(String),

    /// The post source answered with something unreadable.
    #[error("post response unparseable: {0}")]
    Parse(String),

    /// Every allowed attempt failed.
    #[error("post fetch failed after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<VerifyError>,
    },
}

impl From<reqwest::Error> for VerifyError {
    fn from(e: reqwest::Error) -> Self {
        VerifyError::Fetch(e.to_string())
    }
}
