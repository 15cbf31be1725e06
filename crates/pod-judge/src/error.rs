// error.rs — Error types for judge backends.

use thiserror::Error;

/// Errors that can occur while generating questions or grading answers.
#[derive(Debug, Error)]
pub enum JudgeError {
    /// The backend is not reachable or not configured.
    #[error("judge unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with a non-success status.
    #[error("judge request failed: {0}")]
    RequestFailed(String),

    /// Transport-level failure talking to the backend.
    #[error("judge network error: {0}")]
    Network(String),

    /// The backend's reply could not be interpreted.
    #[error("judge response unparseable: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for JudgeError {
    fn from(e: reqwest::Error) -> Self {
        JudgeError::Network(e.to_string())
    }
}
