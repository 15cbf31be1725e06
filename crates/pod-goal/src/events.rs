// events.rs — Lifecycle events and notification dispatch.
//
// The lifecycle controller emits a PodEvent at each transition. Notification
// sinks (a JSONL log file by default) subscribe to them. Sinks observe; they
// never influence a transition, and a failing sink never fails one.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GoalError;
use crate::goal::{AttestationRef, Goal, GoalId, GoalStatus, Verdict};

/// Events emitted at key lifecycle points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PodEvent {
    /// A new goal was created.
    GoalCreated {
        goal_id: GoalId,
        owner: String,
        title: String,
        timestamp: DateTime<Utc>,
    },

    /// Verification questions were (re)issued.
    QuestionsIssued {
        goal_id: GoalId,
        timestamp: DateTime<Utc>,
    },

    /// Answers were graded.
    GoalGraded {
        goal_id: GoalId,
        status: GoalStatus,
        timestamp: DateTime<Utc>,
    },

    /// An outcome was published to the attestation ledger.
    GoalAttested {
        goal_id: GoalId,
        attestation_id: String,
        result: Verdict,
        disputed: bool,
        mocked: bool,
        timestamp: DateTime<Utc>,
    },

    /// The owner started a dispute of a failed grading.
    DisputeStarted {
        goal_id: GoalId,
        timestamp: DateTime<Utc>,
    },

    /// A dispute was resolved from the fetched social post.
    DisputeResolved {
        goal_id: GoalId,
        verified: bool,
        status: GoalStatus,
        timestamp: DateTime<Utc>,
    },
}

impl PodEvent {
    /// Get the event type name as a string.
    pub fn event_type(&self) -> &str {
        match self {
            PodEvent::GoalCreated { .. } => "goal_created",
            PodEvent::QuestionsIssued { .. } => "questions_issued",
            PodEvent::GoalGraded { .. } => "goal_graded",
            PodEvent::GoalAttested { .. } => "goal_attested",
            PodEvent::DisputeStarted { .. } => "dispute_started",
            PodEvent::DisputeResolved { .. } => "dispute_resolved",
        }
    }

    pub fn goal_id(&self) -> GoalId {
        match self {
            PodEvent::GoalCreated { goal_id, .. }
            | PodEvent::QuestionsIssued { goal_id, .. }
            | PodEvent::GoalGraded { goal_id, .. }
            | PodEvent::GoalAttested { goal_id, .. }
            | PodEvent::DisputeStarted { goal_id, .. }
            | PodEvent::DisputeResolved { goal_id, .. } => *goal_id,
        }
    }

    pub fn goal_created(goal: &Goal) -> Self {
        PodEvent::GoalCreated {
            goal_id: goal.id,
            owner: goal.owner.clone(),
            title: goal.title.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn questions_issued(goal_id: GoalId) -> Self {
        PodEvent::QuestionsIssued {
            goal_id,
            timestamp: Utc::now(),
        }
    }

    pub fn goal_graded(goal_id: GoalId, status: GoalStatus) -> Self {
        PodEvent::GoalGraded {
            goal_id,
            status,
            timestamp: Utc::now(),
        }
    }

    pub fn goal_attested(goal_id: GoalId, attestation: &AttestationRef) -> Self {
        PodEvent::GoalAttested {
            goal_id,
            attestation_id: attestation.attestation_id.clone(),
            result: attestation.result,
            disputed: attestation.disputed,
            mocked: attestation.mocked,
            timestamp: Utc::now(),
        }
    }

    pub fn dispute_started(goal_id: GoalId) -> Self {
        PodEvent::DisputeStarted {
            goal_id,
            timestamp: Utc::now(),
        }
    }

    pub fn dispute_resolved(goal_id: GoalId, verified: bool, status: GoalStatus) -> Self {
        PodEvent::DisputeResolved {
            goal_id,
            verified,
            status,
            timestamp: Utc::now(),
        }
    }
}

/// Trait for receiving lifecycle events.
pub trait NotificationSink: Send + Sync {
    /// Handle an event. Errors are logged but don't stop the system.
    fn send(&self, event: &PodEvent) -> Result<(), GoalError>;
}

/// Logs events as JSONL to a file.
pub struct LogSink {
    path: PathBuf,
}

impl LogSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl NotificationSink for LogSink {
    fn send(&self, event: &PodEvent) -> Result<(), GoalError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| GoalError::IoError {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| GoalError::IoError {
                path: self.path.display().to_string(),
                source,
            })?;

        let json = serde_json::to_string(event)?;
        writeln!(file, "{}", json).map_err(|source| GoalError::IoError {
            path: self.path.display().to_string(),
            source,
        })?;

        Ok(())
    }
}

/// Dispatches events to multiple sinks.
///
/// Errors from individual sinks are logged (via tracing) but don't
/// prevent other sinks from receiving the event.
#[derive(Default)]
pub struct EventDispatcher {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl EventDispatcher {
    /// Create a new dispatcher with no sinks.
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Add a notification sink.
    pub fn add_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.sinks.push(sink);
    }

    /// Dispatch an event to all sinks.
    pub fn dispatch(&self, event: &PodEvent) {
        tracing::debug!(event = event.event_type(), goal_id = %event.goal_id(), "dispatching event");
        for sink in &self.sinks {
            if let Err(e) = sink.send(event) {
                tracing::warn!("notification sink error: {}", e);
            }
        }
    }
}
