// outcome.rs — Typed results of lifecycle transitions.
//
// These are what the HTTP boundary serializes. Each one carries the goal id
// and enough of the resulting state that a client never needs a follow-up
// read to learn what happened.

use pod_dispute::MarkerStrategy;
use pod_goal::{AttestationRef, GoalId, GoalStatus, QuestionPair, Verdict};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct QuestionsIssued {
    pub goal_id: GoalId,
    pub questions: QuestionPair,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeOutcome {
    pub goal_id: GoalId,
    pub pass: bool,
    pub status: GoalStatus,
    pub verdicts: [Verdict; 2],
    /// True if any verdict came from the judge-failure fallback.
    pub defaulted: bool,
    pub transcript: String,
}

/// Attest input. Absent fields default to the goal's own status and
/// disputed flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttestRequest {
    #[serde(default)]
    pub result: Option<Verdict>,
    #[serde(default)]
    pub disputed: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttestOutcome {
    pub goal_id: GoalId,
    pub attestation_id: String,
    pub tx_ref: String,
    pub mocked: bool,
    pub result: Verdict,
    pub disputed: bool,
    /// True when this attestation added the goal to the feed.
    pub added_to_feed: bool,
}

impl AttestOutcome {
    pub(crate) fn new(goal_id: GoalId, attestation: &AttestationRef, added_to_feed: bool) -> Self {
        Self {
            goal_id,
            attestation_id: attestation.attestation_id.clone(),
            tx_ref: attestation.tx_ref.clone(),
            mocked: attestation.mocked,
            result: attestation.result,
            disputed: attestation.disputed,
            added_to_feed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DisputeStart {
    pub goal_id: GoalId,
    pub strategy: MarkerStrategy,
    /// What the owner must include in the post.
    pub marker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub intent_url: String,
    pub profile_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DisputeOutcome {
    pub goal_id: GoalId,
    pub verified: bool,
    pub status: GoalStatus,
    pub disputed: bool,
    pub attestation: AttestOutcome,
}
