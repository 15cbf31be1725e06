// goal.rs — Goal: the record a user declares, answers for, and attests.
//
// The stored fields are deliberately flat (status + disputed + optional
// questions/answers/attestations) so that a partial patch can be merged
// into them the same way for every store. The richer lifecycle position is
// derived from those fields by `Goal::lifecycle_state()`:
//
//   Pending → Questioned → Passed | Failed
//   Failed → DisputePending → DisputedPassed | DisputedFailed

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Goal identifiers are random UUIDs assigned once at creation.
pub type GoalId = Uuid;

/// Persisted grading status of a goal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalStatus {
    /// Created, possibly questioned, not yet graded.
    Pending,
    /// Graded (or dispute-resolved) as a pass.
    Passed,
    /// Graded (or dispute-resolved) as a fail.
    Failed,
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalStatus::Pending => write!(f, "PENDING"),
            GoalStatus::Passed => write!(f, "PASSED"),
            GoalStatus::Failed => write!(f, "FAILED"),
        }
    }
}

impl GoalStatus {
    /// Passed and Failed are terminal for grading purposes.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GoalStatus::Pending)
    }

    /// The verdict a terminal status represents, if any.
    pub fn verdict(&self) -> Option<Verdict> {
        match self {
            GoalStatus::Pending => None,
            GoalStatus::Passed => Some(Verdict::Pass),
            GoalStatus::Failed => Some(Verdict::Fail),
        }
    }
}

impl From<Verdict> for GoalStatus {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Pass => GoalStatus::Passed,
            Verdict::Fail => GoalStatus::Failed,
        }
    }
}

/// A binary PASS/FAIL result, used for per-question grading and attestations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

impl Verdict {
    pub fn from_pass(pass: bool) -> Self {
        if pass {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    /// Logical AND: both verdicts must pass.
    pub fn and(self, other: Verdict) -> Verdict {
        Verdict::from_pass(self.is_pass() && other.is_pass())
    }
}

/// The two verification questions issued for a goal, in order.
///
/// `#[serde(transparent)]` keeps the JSON shape a plain two-element array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct QuestionPair([String; 2]);

impl QuestionPair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self([first.into(), second.into()])
    }

    pub fn first(&self) -> &str {
        &self.0[0]
    }

    pub fn second(&self) -> &str {
        &self.0[1]
    }

    pub fn as_array(&self) -> &[String; 2] {
        &self.0
    }
}

/// The two submitted answers; `answers[i]` answers `questions[i]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AnswerPair([String; 2]);

impl AnswerPair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self([first.into(), second.into()])
    }

    /// Build a pair from a submitted list. Returns the actual count on mismatch.
    pub fn from_vec(answers: Vec<String>) -> Result<Self, usize> {
        let count = answers.len();
        let pair: [String; 2] = answers.try_into().map_err(|_| count)?;
        Ok(Self(pair))
    }

    pub fn first(&self) -> &str {
        &self.0[0]
    }

    pub fn second(&self) -> &str {
        &self.0[1]
    }

    pub fn as_array(&self) -> &[String; 2] {
        &self.0
    }
}

/// Reference to one published attestation of a goal's outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttestationRef {
    /// Opaque identifier assigned by the ledger (or the mock fallback).
    pub attestation_id: String,

    /// Transaction reference on the ledger.
    pub tx_ref: String,

    /// True when the attestor fell back to a deterministic mock.
    pub mocked: bool,

    /// The result that was attested.
    pub result: Verdict,

    /// Whether the attested outcome was reached through a dispute.
    pub disputed: bool,

    pub attested_at: DateTime<Utc>,
}

/// Where a goal currently sits in its lifecycle, derived from stored fields.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Pending,
    Questioned,
    Passed,
    Failed,
    DisputePending,
    DisputedPassed,
    DisputedFailed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Pending => "pending",
            LifecycleState::Questioned => "questioned",
            LifecycleState::Passed => "passed",
            LifecycleState::Failed => "failed",
            LifecycleState::DisputePending => "dispute_pending",
            LifecycleState::DisputedPassed => "disputed_passed",
            LifecycleState::DisputedFailed => "disputed_failed",
        };
        write!(f, "{}", name)
    }
}

/// A daily goal: one unit of declared work, from creation to attestation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier, assigned at creation and never reassigned.
    pub id: GoalId,

    /// Username of the goal's owner.
    pub owner: String,

    /// Human-readable title (e.g., "Read ch.1").
    pub title: String,

    /// Optional free-text scope narrowing what the goal covers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Advisory deadline; never enforced by the lifecycle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,

    pub status: GoalStatus,

    /// Set once a dispute resolves; never reset to false.
    #[serde(default)]
    pub disputed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<QuestionPair>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<AnswerPair>,

    /// Append-only audit text: grading and dispute transcripts, user notes.
    #[serde(default)]
    pub notes: String,

    /// Single-use marker issued when a token-based dispute starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispute_token: Option<String>,

    /// When the current dispute was started; marks a dispute as pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispute_started_at: Option<DateTime<Utc>>,

    /// Every attestation published for this goal, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attestations: Vec<AttestationRef>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Create a new Goal in the Pending state.
    pub fn new(
        owner: impl Into<String>,
        title: impl Into<String>,
        scope: Option<String>,
        deadline: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            title: title.into(),
            scope,
            deadline,
            status: GoalStatus::Pending,
            disputed: false,
            questions: None,
            answers: None,
            notes: String::new(),
            dispute_token: None,
            dispute_started_at: None,
            attestations: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Derive the lifecycle position from the stored fields.
    pub fn lifecycle_state(&self) -> LifecycleState {
        match (self.status, self.disputed) {
            (GoalStatus::Pending, _) if self.questions.is_some() => LifecycleState::Questioned,
            (GoalStatus::Pending, _) => LifecycleState::Pending,
            (GoalStatus::Passed, true) => LifecycleState::DisputedPassed,
            (GoalStatus::Failed, true) => LifecycleState::DisputedFailed,
            (GoalStatus::Passed, false) => LifecycleState::Passed,
            (GoalStatus::Failed, false) if self.dispute_started_at.is_some() => {
                LifecycleState::DisputePending
            }
            (GoalStatus::Failed, false) => LifecycleState::Failed,
        }
    }

    /// The most recent attestation, if any.
    pub fn latest_attestation(&self) -> Option<&AttestationRef> {
        self.attestations.last()
    }

    /// Identifier of the most recent attestation.
    pub fn attestation_id(&self) -> Option<&str> {
        self.latest_attestation().map(|a| a.attestation_id.as_str())
    }

    /// Whether this exact outcome has already been attested.
    pub fn has_attestation_for(&self, result: Verdict, disputed: bool) -> bool {
        self.attestations
            .iter()
            .any(|a| a.result == result && a.disputed == disputed)
    }

    /// Scope if present, otherwise the title.
    pub fn scope_or_title(&self) -> &str {
        self.scope.as_deref().unwrap_or(&self.title)
    }
}

/// A partial update merged into a stored goal.
///
/// Only the fields that are set are applied. The merge itself upholds the
/// record's monotonic fields: `disputed` can only become true, notes are
/// appended, and attestations are pushed onto the history.
#[derive(Debug, Clone, Default)]
pub struct GoalPatch {
    pub status: Option<GoalStatus>,
    pub mark_disputed: bool,
    pub questions: Option<QuestionPair>,
    pub answers: Option<AnswerPair>,
    pub append_notes: Option<String>,
    pub dispute_token: Option<String>,
    pub dispute_started_at: Option<DateTime<Utc>>,
    pub attestation: Option<AttestationRef>,
}

impl GoalPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: GoalStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn disputed(mut self) -> Self {
        self.mark_disputed = true;
        self
    }

    pub fn with_questions(mut self, questions: QuestionPair) -> Self {
        self.questions = Some(questions);
        self
    }

    pub fn with_answers(mut self, answers: AnswerPair) -> Self {
        self.answers = Some(answers);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.append_notes = Some(note.into());
        self
    }

    pub fn with_dispute(mut self, token: Option<String>, started_at: DateTime<Utc>) -> Self {
        self.dispute_token = token;
        self.dispute_started_at = Some(started_at);
        self
    }

    pub fn with_attestation(mut self, attestation: AttestationRef) -> Self {
        self.attestation = Some(attestation);
        self
    }

    /// Merge this patch into `goal`, bumping `updated_at`.
    pub fn apply(self, goal: &mut Goal) {
        if let Some(status) = self.status {
            goal.status = status;
        }
        if self.mark_disputed {
            goal.disputed = true;
        }
        if let Some(questions) = self.questions {
            goal.questions = Some(questions);
        }
        if let Some(answers) = self.answers {
            goal.answers = Some(answers);
        }
        if let Some(note) = self.append_notes {
            if !goal.notes.is_empty() {
                goal.notes.push_str("\n\n");
            }
            goal.notes.push_str(&note);
        }
        if self.dispute_token.is_some() {
            goal.dispute_token = self.dispute_token;
        }
        if self.dispute_started_at.is_some() {
            goal.dispute_started_at = self.dispute_started_at;
        }
        if let Some(attestation) = self.attestation {
            goal.attestations.push(attestation);
        }
        goal.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_goal() -> Goal {
        Goal::new("alice", "Read ch.1", Some("pages 1-20".to_string()), None)
    }

    fn attestation(result: Verdict, disputed: bool) -> AttestationRef {
        AttestationRef {
            attestation_id: format!("att-{}-{}", result, disputed),
            tx_ref: "0xabc".to_string(),
            mocked: false,
            result,
            disputed,
            attested_at: Utc::now(),
        }
    }

    #[test]
    fn new_goal_starts_pending_and_undisputed() {
        let goal = test_goal();
        assert_eq!(goal.status, GoalStatus::Pending);
        assert!(!goal.disputed);
        assert!(goal.attestation_id().is_none());
        assert!(goal.questions.is_none());
        assert_eq!(goal.lifecycle_state(), LifecycleState::Pending);
    }

    #[test]
    fn lifecycle_state_follows_fields() {
        let mut goal = test_goal();
        GoalPatch::new()
            .with_questions(QuestionPair::new("q1", "q2"))
            .apply(&mut goal);
        assert_eq!(goal.lifecycle_state(), LifecycleState::Questioned);

        GoalPatch::new()
            .with_status(GoalStatus::Failed)
            .apply(&mut goal);
        assert_eq!(goal.lifecycle_state(), LifecycleState::Failed);

        GoalPatch::new()
            .with_dispute(Some("POD-1".to_string()), Utc::now())
            .apply(&mut goal);
        assert_eq!(goal.lifecycle_state(), LifecycleState::DisputePending);

        GoalPatch::new()
            .with_status(GoalStatus::Passed)
            .disputed()
            .apply(&mut goal);
        assert_eq!(goal.lifecycle_state(), LifecycleState::DisputedPassed);
    }

    #[test]
    fn patch_never_clears_disputed() {
        let mut goal = test_goal();
        GoalPatch::new().disputed().apply(&mut goal);
        GoalPatch::new()
            .with_status(GoalStatus::Failed)
            .apply(&mut goal);
        assert!(goal.disputed);
    }

    #[test]
    fn notes_are_appended() {
        let mut goal = test_goal();
        GoalPatch::new().with_note("first").apply(&mut goal);
        GoalPatch::new().with_note("second").apply(&mut goal);
        assert_eq!(goal.notes, "first\n\nsecond");
    }

    #[test]
    fn attestations_accumulate_and_latest_wins() {
        let mut goal = test_goal();
        GoalPatch::new()
            .with_attestation(attestation(Verdict::Fail, false))
            .apply(&mut goal);
        GoalPatch::new()
            .with_attestation(attestation(Verdict::Pass, true))
            .apply(&mut goal);

        assert_eq!(goal.attestations.len(), 2);
        assert_eq!(goal.attestation_id(), Some("att-PASS-true"));
        assert!(goal.has_attestation_for(Verdict::Fail, false));
        assert!(!goal.has_attestation_for(Verdict::Fail, true));
    }

    #[test]
    fn answer_pair_rejects_wrong_count() {
        assert_eq!(AnswerPair::from_vec(vec!["only".to_string()]), Err(1));
        assert_eq!(
            AnswerPair::from_vec(vec!["a".into(), "b".into(), "c".into()]),
            Err(3)
        );
        let pair = AnswerPair::from_vec(vec!["a".into(), "b".into()]).unwrap();
        assert_eq!(pair.first(), "a");
        assert_eq!(pair.second(), "b");
    }

    #[test]
    fn verdict_and_requires_both() {
        assert_eq!(Verdict::Pass.and(Verdict::Pass), Verdict::Pass);
        assert_eq!(Verdict::Pass.and(Verdict::Fail), Verdict::Fail);
        assert_eq!(Verdict::Fail.and(Verdict::Pass), Verdict::Fail);
    }

    #[test]
    fn status_serializes_upper_case() {
        let json = serde_json::to_string(&GoalStatus::Passed).unwrap();
        assert_eq!(json, "\"PASSED\"");
        assert_eq!(GoalStatus::Failed.to_string(), "FAILED");
        assert_eq!(Verdict::Pass.to_string(), "PASS");
    }

    #[test]
    fn pairs_serialize_as_arrays() {
        let mut goal = test_goal();
        goal.questions = Some(QuestionPair::new("q1", "q2"));
        let json = serde_json::to_value(&goal).unwrap();
        assert_eq!(json["questions"], serde_json::json!(["q1", "q2"]));
        assert!(json.get("answers").is_none());
        assert!(json.get("dispute_token").is_none());
    }

    #[test]
    fn scope_or_title_falls_back() {
        let goal = Goal::new("bob", "Run 5k", None, None);
        assert_eq!(goal.scope_or_title(), "Run 5k");
        assert_eq!(test_goal().scope_or_title(), "pages 1-20");
    }
}
