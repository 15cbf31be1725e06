// controller.rs — The goal lifecycle controller.
//
// Each public method is one transition. A transition loads the goal, checks
// it is in a state that allows the transition, calls at most the
// collaborators it needs, then persists a single GoalPatch. Input and state
// checks happen before any collaborator call so a rejected request never
// mutates anything.
//
// Attest is the only point where an external durable record is created. If
// the ledger accepts a record and the following store write fails, the
// attestation is orphaned; this is logged at error level with the
// attestation id and never rolled back.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pod_attest::{AttestationRecord, Attestor};
use pod_dispute::{
    fetch_with_retry, generate_token, parse_post_id, DisputeMarker, MarkerStrategy, PostVerifier,
};
use pod_goal::{
    AnswerPair, AttestationRef, EventDispatcher, Goal, GoalId, GoalPatch, GoalStatus, GoalStore,
    PodEvent, PublicGoal, Verdict, FEED_CAPACITY,
};
use pod_judge::Judge;
use serde::Deserialize;

use crate::config::{JudgeFailurePolicy, LifecycleConfig, TerminalPolicy};
use crate::error::LifecycleError;
use crate::outcome::{
    AttestOutcome, AttestRequest, DisputeOutcome, DisputeStart, GradeOutcome, QuestionsIssued,
};
use crate::transcript;

/// Input for [`Controller::create_goal`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewGoal {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

/// Orchestrates goal transitions over the injected collaborators.
pub struct Controller {
    store: Arc<dyn GoalStore>,
    judge: Arc<dyn Judge>,
    attestor: Arc<dyn Attestor>,
    verifier: Arc<dyn PostVerifier>,
    events: EventDispatcher,
    config: LifecycleConfig,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_owner(owner: &str) -> Result<String, LifecycleError> {
    let owner = owner.trim();
    if owner.is_empty() {
        return Err(LifecycleError::validation("owner is required"));
    }
    Ok(owner.to_string())
}

impl Controller {
    pub fn new(
        store: Arc<dyn GoalStore>,
        judge: Arc<dyn Judge>,
        attestor: Arc<dyn Attestor>,
        verifier: Arc<dyn PostVerifier>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            store,
            judge,
            attestor,
            verifier,
            events: EventDispatcher::new(),
            config,
        }
    }

    /// Replace the event dispatcher (no sinks by default).
    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    pub fn judge(&self) -> &dyn Judge {
        self.judge.as_ref()
    }

    pub fn attestor(&self) -> &dyn Attestor {
        self.attestor.as_ref()
    }

    pub fn verifier(&self) -> &dyn PostVerifier {
        self.verifier.as_ref()
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    fn load(&self, id: GoalId) -> Result<Goal, LifecycleError> {
        self.store.get(id)?.ok_or(LifecycleError::NotFound(id))
    }

    fn save(&self, id: GoalId, patch: GoalPatch) -> Result<Goal, LifecycleError> {
        self.store
            .update(id, patch)?
            .ok_or(LifecycleError::NotFound(id))
    }

    fn state_error(goal: &Goal, action: &'static str) -> LifecycleError {
        LifecycleError::State {
            goal_id: goal.id,
            state: goal.lifecycle_state(),
            action,
        }
    }

    /// Whether questions/answers may be (re)issued for `goal`.
    fn ensure_gradable(&self, goal: &Goal, action: &'static str) -> Result<(), LifecycleError> {
        if !goal.status.is_terminal() {
            return Ok(());
        }
        // Once an outcome is on the ledger the status must keep matching it.
        let reopenable = !goal.disputed
            && goal.dispute_started_at.is_none()
            && goal.attestations.is_empty();
        match self.config.terminal_goals {
            TerminalPolicy::Overwrite if reopenable => {
                tracing::warn!(
                    goal_id = %goal.id,
                    status = %goal.status,
                    action,
                    "overwriting a graded goal"
                );
                Ok(())
            }
            _ => Err(Self::state_error(goal, action)),
        }
    }

    // ── Create / read ────────────────────────────────────────────

    /// Create a new PENDING goal for `input.owner`.
    pub fn create_goal(&self, input: NewGoal) -> Result<Goal, LifecycleError> {
        let owner = normalize_owner(&input.owner)?;
        let title = input.title.trim();
        if title.is_empty() {
            return Err(LifecycleError::validation("title is required"));
        }

        let goal = Goal::new(owner, title, non_blank(input.scope), input.deadline);
        self.store.create(&goal)?;

        tracing::info!(
            goal_id = %goal.id,
            owner = %goal.owner,
            title = %goal.title,
            "goal created"
        );
        self.events.dispatch(&PodEvent::goal_created(&goal));
        Ok(goal)
    }

    pub fn get_goal(&self, id: GoalId) -> Result<Goal, LifecycleError> {
        self.load(id)
    }

    /// All goals of `owner`, most recent first.
    pub fn list_goals(&self, owner: &str) -> Result<Vec<Goal>, LifecycleError> {
        let owner = normalize_owner(owner)?;
        Ok(self.store.list_by_owner(&owner)?)
    }

    /// Public view of `owner`'s goals, most recent first.
    pub fn public_history(&self, owner: &str) -> Result<Vec<PublicGoal>, LifecycleError> {
        Ok(self.list_goals(owner)?.iter().map(PublicGoal::from).collect())
    }

    /// Recently attested goals, newest first.
    pub fn feed(&self, limit: Option<usize>) -> Result<Vec<PublicGoal>, LifecycleError> {
        let limit = limit.unwrap_or(self.config.feed_limit).min(FEED_CAPACITY);
        Ok(self.store.feed(limit)?.iter().map(PublicGoal::from).collect())
    }

    /// Every known username, sorted.
    pub fn list_users(&self) -> Result<Vec<String>, LifecycleError> {
        Ok(self.store.known_users()?)
    }

    /// Append free text to a goal's notes.
    pub fn append_note(&self, id: GoalId, text: &str) -> Result<Goal, LifecycleError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(LifecycleError::validation("note text is required"));
        }
        let goal = self.save(id, GoalPatch::new().with_note(text))?;
        tracing::debug!(goal_id = %id, "note appended");
        Ok(goal)
    }

    // ── Questioning and grading ──────────────────────────────────

    /// Ask the judge for two questions and persist them, replacing any
    /// previous pair.
    pub async fn request_questions(&self, id: GoalId) -> Result<QuestionsIssued, LifecycleError> {
        let goal = self.load(id)?;
        self.ensure_gradable(&goal, "request questions for")?;

        let questions = self
            .judge
            .generate_questions(&goal.title, goal.scope.as_deref())
            .await
            .map_err(|e| LifecycleError::upstream("judge", e))?;

        self.save(id, GoalPatch::new().with_questions(questions.clone()))?;

        tracing::info!(goal_id = %id, judge = self.judge.name(), "questions issued");
        self.events.dispatch(&PodEvent::questions_issued(id));
        Ok(QuestionsIssued {
            goal_id: id,
            questions,
        })
    }

    /// Grade exactly two answers and move the goal to PASSED or FAILED.
    pub async fn submit_answers(
        &self,
        id: GoalId,
        answers: Vec<String>,
    ) -> Result<GradeOutcome, LifecycleError> {
        let answers = AnswerPair::from_vec(answers).map_err(|count| {
            LifecycleError::validation(format!("exactly two answers required, got {}", count))
        })?;

        let goal = self.load(id)?;
        let Some(questions) = goal.questions.clone() else {
            return Err(LifecycleError::validation(
                "goal has no questions, request questions first",
            ));
        };
        self.ensure_gradable(&goal, "submit answers for")?;

        let mut verdicts = [(Verdict::Fail, false); 2];
        for (i, (question, answer)) in questions
            .as_array()
            .iter()
            .zip(answers.as_array().iter())
            .enumerate()
        {
            verdicts[i] = match self
                .judge
                .grade(&goal.title, goal.scope.as_deref(), question, answer)
                .await
            {
                Ok(verdict) => (verdict, false),
                Err(e) => match self.config.judge_failure {
                    JudgeFailurePolicy::Fail => return Err(LifecycleError::upstream("judge", e)),
                    JudgeFailurePolicy::PassDefault => {
                        tracing::warn!(
                            goal_id = %id,
                            question = i + 1,
                            error = %e,
                            "judge failed, defaulting to PASS"
                        );
                        (Verdict::Pass, true)
                    }
                },
            };
        }

        let overall = verdicts[0].0.and(verdicts[1].0);
        let status = GoalStatus::from(overall);
        let transcript = transcript::grading(&goal, &questions, &answers, verdicts);

        self.save(
            id,
            GoalPatch::new()
                .with_answers(answers)
                .with_note(transcript.clone())
                .with_status(status),
        )?;

        tracing::info!(goal_id = %id, status = %status, "goal graded");
        self.events.dispatch(&PodEvent::goal_graded(id, status));
        Ok(GradeOutcome {
            goal_id: id,
            pass: overall.is_pass(),
            status,
            verdicts: [verdicts[0].0, verdicts[1].0],
            defaulted: verdicts.iter().any(|(_, defaulted)| *defaulted),
            transcript,
        })
    }

    // ── Attestation ──────────────────────────────────────────────

    /// Publish the goal's outcome to the attestation ledger.
    ///
    /// The first attestation of a goal also enters it into the feed.
    pub async fn attest(
        &self,
        id: GoalId,
        request: AttestRequest,
    ) -> Result<AttestOutcome, LifecycleError> {
        let goal = self.load(id)?;
        let Some(current) = goal.status.verdict() else {
            return Err(Self::state_error(&goal, "attest"));
        };

        let result = request.result.unwrap_or(current);
        if result != current {
            return Err(LifecycleError::validation(format!(
                "result {} does not match goal status {}",
                result, goal.status
            )));
        }
        let disputed = request.disputed.unwrap_or(goal.disputed);
        if disputed != goal.disputed {
            return Err(LifecycleError::validation(format!(
                "disputed={} does not match goal (disputed={})",
                disputed, goal.disputed
            )));
        }
        if goal.has_attestation_for(result, disputed) {
            return Err(Self::state_error(&goal, "re-attest"));
        }

        let record = AttestationRecord::for_goal(&goal, result, disputed);
        let published = self
            .attestor
            .publish(&record)
            .await
            .map_err(|e| LifecycleError::upstream("attestor", e))?;

        let attestation = AttestationRef {
            attestation_id: published.attestation_id,
            tx_ref: published.tx_ref,
            mocked: published.mocked,
            result,
            disputed,
            attested_at: Utc::now(),
        };
        let first = goal.attestations.is_empty();

        match self.store.update(id, GoalPatch::new().with_attestation(attestation.clone())) {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::error!(
                    goal_id = %id,
                    attestation_id = %attestation.attestation_id,
                    "goal vanished after publishing, attestation orphaned"
                );
                return Err(LifecycleError::NotFound(id));
            }
            Err(e) => {
                tracing::error!(
                    goal_id = %id,
                    attestation_id = %attestation.attestation_id,
                    error = %e,
                    "failed to persist attestation, attestation orphaned"
                );
                return Err(e.into());
            }
        }

        let added_to_feed = first && self.store.append_feed(id)?;

        tracing::info!(
            goal_id = %id,
            attestation_id = %attestation.attestation_id,
            result = %result,
            disputed,
            mocked = attestation.mocked,
            "goal attested"
        );
        self.events
            .dispatch(&PodEvent::goal_attested(id, &attestation));
        Ok(AttestOutcome::new(id, &attestation, added_to_feed))
    }

    // ── Dispute ──────────────────────────────────────────────────

    fn marker_for(&self, goal: &Goal, token: Option<String>) -> Option<DisputeMarker> {
        let site = &self.config.dispute.site_url;
        match self.config.dispute.marker {
            MarkerStrategy::Token => token.map(|t| DisputeMarker::token(t, site, &goal.owner)),
            MarkerStrategy::ProfileUrl => Some(DisputeMarker::profile(site, &goal.owner)),
        }
    }

    /// Open a dispute on a FAILED goal and hand back the post template.
    ///
    /// Starting again before verification issues a fresh marker.
    pub fn start_dispute(&self, id: GoalId) -> Result<DisputeStart, LifecycleError> {
        let goal = self.load(id)?;
        if goal.status != GoalStatus::Failed || goal.disputed {
            return Err(Self::state_error(&goal, "start dispute"));
        }

        let token = match self.config.dispute.marker {
            MarkerStrategy::Token => Some(generate_token()),
            MarkerStrategy::ProfileUrl => None,
        };
        let Some(marker) = self.marker_for(&goal, token.clone()) else {
            return Err(Self::state_error(&goal, "start dispute"));
        };

        self.save(id, GoalPatch::new().with_dispute(token, Utc::now()))?;

        tracing::info!(goal_id = %id, owner = %goal.owner, "dispute started");
        self.events.dispatch(&PodEvent::dispute_started(id));
        Ok(DisputeStart {
            goal_id: id,
            strategy: marker.strategy,
            marker: marker.display_marker().to_string(),
            token: marker.token.clone(),
            intent_url: marker.intent_url(&goal.title),
            profile_url: marker.profile_url.clone(),
        })
    }

    /// Check a social post for the dispute marker, resolve the dispute,
    /// and attest the resolved outcome.
    ///
    /// If the attestation fails after the dispute is resolved, the goal
    /// keeps its disputed status and can be attested again with
    /// [`Controller::attest`].
    pub async fn verify_dispute(
        &self,
        id: GoalId,
        post_url: &str,
    ) -> Result<DisputeOutcome, LifecycleError> {
        let goal = self.load(id)?;
        let post_id = parse_post_id(post_url).ok_or_else(|| {
            LifecycleError::validation(format!("not a post URL: {}", post_url.trim()))
        })?;

        let pending = goal.status == GoalStatus::Failed
            && !goal.disputed
            && goal.dispute_started_at.is_some();
        if !pending {
            return Err(Self::state_error(&goal, "verify dispute"));
        }
        let Some(marker) = self.marker_for(&goal, goal.dispute_token.clone()) else {
            // Token strategy but the dispute was started without a token.
            return Err(Self::state_error(&goal, "verify dispute"));
        };

        let post = fetch_with_retry(
            self.verifier.as_ref(),
            &post_id,
            &self.config.dispute.retry,
        )
        .await
        .map_err(|e| LifecycleError::upstream("post verifier", e))?;

        let verified = marker.is_present_in(&post, &self.config.dispute.keywords);
        let status = if verified {
            GoalStatus::Passed
        } else {
            GoalStatus::Failed
        };

        self.save(
            id,
            GoalPatch::new()
                .with_status(status)
                .disputed()
                .with_note(transcript::dispute(
                    post_url.trim(),
                    marker.display_marker(),
                    verified,
                )),
        )?;

        tracing::info!(
            goal_id = %id,
            post_id = %post_id,
            verified,
            status = %status,
            "dispute resolved"
        );
        self.events
            .dispatch(&PodEvent::dispute_resolved(id, verified, status));

        let attestation = self
            .attest(
                id,
                AttestRequest {
                    result: status.verdict(),
                    disputed: Some(true),
                },
            )
            .await?;

        Ok(DisputeOutcome {
            goal_id: id,
            verified,
            status,
            disputed: true,
            attestation,
        })
    }
}
