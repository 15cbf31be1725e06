// error.rs — Error taxonomy for lifecycle transitions.

use std::fmt;

use pod_goal::{GoalError, GoalId, LifecycleState};
use thiserror::Error;

/// Errors returned by [`crate::Controller`] operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The referenced goal does not exist.
    #[error("goal not found: {0}")]
    NotFound(GoalId),

    /// Missing or malformed input. Nothing was mutated.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The transition is not allowed from the goal's current state.
    #[error("cannot {action} for goal {goal_id} in state {state}")]
    State {
        goal_id: GoalId,
        state: LifecycleState,
        action: &'static str,
    },

    /// A judge, attestor or post verifier call failed.
    #[error("{service} failed: {message}")]
    Upstream { service: String, message: String },

    /// The goal store failed.
    #[error("store error: {0}")]
    Store(#[from] GoalError),
}

/// Coarse classification used by the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    State,
    Upstream,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::State => "state",
            ErrorKind::Upstream => "upstream",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LifecycleError::NotFound(_) => ErrorKind::NotFound,
            LifecycleError::Validation(_) => ErrorKind::Validation,
            LifecycleError::State { .. } => ErrorKind::State,
            LifecycleError::Upstream { .. } => ErrorKind::Upstream,
            LifecycleError::Store(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        LifecycleError::Validation(message.into())
    }

    pub(crate) fn upstream(service: &str, error: impl fmt::Display) -> Self {
        LifecycleError::Upstream {
            service: service.to_string(),
            message: error.to_string(),
        }
    }
}
