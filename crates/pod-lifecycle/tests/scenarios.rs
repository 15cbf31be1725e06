//! End-to-end lifecycle scenarios against the JSON-file store.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pod_attest::{AttestError, Attestation, AttestationRecord, Attestor, LedgerAttestor, MockAttestor};
use pod_dispute::{PostContent, RetryPolicy, StaticPostVerifier};
use pod_goal::{
    EventDispatcher, FileGoalStore, GoalError, GoalStatus, NotificationSink, PodEvent, Verdict,
};
use pod_judge::MockJudge;
use pod_lifecycle::{
    AttestRequest, Controller, DisputeConfig, LifecycleConfig, LifecycleError, NewGoal,
};
use tempfile::TempDir;

const SITE: &str = "https://pod.example";

/// Records event types in memory.
#[derive(Clone, Default)]
struct RecordingSink {
    events: Arc<Mutex<Vec<String>>>,
}

impl NotificationSink for RecordingSink {
    fn send(&self, event: &PodEvent) -> Result<(), GoalError> {
        self.events
            .lock()
            .map_err(|e| GoalError::LockPoisoned(e.to_string()))?
            .push(event.event_type().to_string());
        Ok(())
    }
}

/// Attestor that always rejects.
struct RejectingAttestor;

#[async_trait]
impl Attestor for RejectingAttestor {
    fn name(&self) -> &str {
        "rejecting"
    }

    async fn publish(&self, _record: &AttestationRecord) -> Result<Attestation, AttestError> {
        Err(AttestError::Rejected {
            status: 503,
            message: "ledger down".to_string(),
        })
    }
}

struct Setup {
    controller: Controller,
    judge: Arc<MockJudge>,
    verifier: Arc<StaticPostVerifier>,
    sink: RecordingSink,
    _dir: TempDir,
}

fn config() -> LifecycleConfig {
    LifecycleConfig {
        dispute: DisputeConfig {
            site_url: SITE.to_string(),
            retry: RetryPolicy::new(3, Duration::from_millis(5)),
            ..DisputeConfig::default()
        },
        ..LifecycleConfig::default()
    }
}

fn setup_with(judge: MockJudge, attestor: Arc<dyn Attestor>) -> Setup {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileGoalStore::new(dir.path()).unwrap());
    let judge = Arc::new(judge);
    let verifier = Arc::new(StaticPostVerifier::new());
    let sink = RecordingSink::default();
    let mut events = EventDispatcher::new();
    events.add_sink(Box::new(sink.clone()));

    let controller = Controller::new(store, judge.clone(), attestor, verifier.clone(), config())
        .with_events(events);
    Setup {
        controller,
        judge,
        verifier,
        sink,
        _dir: dir,
    }
}

fn setup(judge: MockJudge) -> Setup {
    setup_with(judge, Arc::new(MockAttestor::new()))
}

fn create(s: &Setup) -> pod_goal::Goal {
    s.controller
        .create_goal(NewGoal {
            owner: "alice".into(),
            title: "Read ch.1".into(),
            ..NewGoal::default()
        })
        .unwrap()
}

fn answers() -> Vec<String> {
    vec!["ans1".into(), "ans2".into()]
}

#[tokio::test]
async fn scenario_a_pass_and_attest() {
    let s = setup(MockJudge::new().with_verdicts([Verdict::Pass, Verdict::Pass]));
    let goal = create(&s);
    assert_eq!(goal.status, GoalStatus::Pending);

    let issued = s.controller.request_questions(goal.id).await.unwrap();
    assert!(!issued.questions.first().is_empty());
    assert!(!issued.questions.second().is_empty());
    assert_eq!(
        s.controller.get_goal(goal.id).unwrap().questions,
        Some(issued.questions.clone())
    );

    let graded = s.controller.submit_answers(goal.id, answers()).await.unwrap();
    assert!(graded.pass);
    assert_eq!(graded.status, GoalStatus::Passed);

    let attested = s
        .controller
        .attest(
            goal.id,
            AttestRequest {
                result: Some(Verdict::Pass),
                disputed: Some(false),
            },
        )
        .await
        .unwrap();
    assert!(attested.mocked);
    assert_eq!(attested.attestation_id, format!("MOCK-PASS-{}", goal.id));

    let stored = s.controller.get_goal(goal.id).unwrap();
    assert_eq!(stored.attestation_id(), Some(attested.attestation_id.as_str()));

    let feed = s.controller.feed(None).unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].id, goal.id);
    assert_eq!(feed[0].attestation_id.as_deref(), Some(attested.attestation_id.as_str()));

    let events = s.sink.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec!["goal_created", "questions_issued", "goal_graded", "goal_attested"]
    );
}

#[tokio::test]
async fn scenario_b_dispute_without_marker_stays_failed() {
    let s = setup(MockJudge::new().with_verdicts([Verdict::Pass, Verdict::Fail]));
    let goal = create(&s);

    s.controller.request_questions(goal.id).await.unwrap();
    assert!(matches!(
        s.controller.start_dispute(goal.id).unwrap_err(),
        LifecycleError::State { .. }
    ));

    let graded = s.controller.submit_answers(goal.id, answers()).await.unwrap();
    assert_eq!(graded.status, GoalStatus::Failed);

    let first = s.controller.attest(goal.id, AttestRequest::default()).await.unwrap();
    assert_eq!(first.result, Verdict::Fail);
    assert!(first.added_to_feed);

    let start = s.controller.start_dispute(goal.id).unwrap();
    let token = start.token.clone().unwrap();
    assert!(token.starts_with("POD-"));
    assert!(start.intent_url.starts_with("https://twitter.com/intent/tweet?text="));
    assert_eq!(start.profile_url, "https://pod.example/u/alice");

    s.verifier
        .insert("111", PostContent::new("I really did finish, trust me"));
    let outcome = s
        .controller
        .verify_dispute(goal.id, "https://x.com/alice/status/111")
        .await
        .unwrap();
    assert!(!outcome.verified);
    assert_eq!(outcome.status, GoalStatus::Failed);
    assert!(outcome.disputed);
    assert_eq!(outcome.attestation.result, Verdict::Fail);
    assert!(outcome.attestation.disputed);
    assert!(!outcome.attestation.added_to_feed);

    let stored = s.controller.get_goal(goal.id).unwrap();
    assert!(stored.disputed);
    assert_eq!(stored.attestations.len(), 2);
    assert!(stored.notes.contains("RESULT: NOT VERIFIED"));

    // Feed membership is set once, on the first attestation.
    assert_eq!(s.controller.feed(None).unwrap().len(), 1);
}

#[tokio::test]
async fn scenario_c_dispute_with_marker_passes() {
    let s = setup(MockJudge::new().with_verdicts([Verdict::Fail, Verdict::Pass]));
    let goal = create(&s);
    s.controller.request_questions(goal.id).await.unwrap();
    s.controller.submit_answers(goal.id, answers()).await.unwrap();

    let start = s.controller.start_dispute(goal.id).unwrap();
    let token = start.token.unwrap();
    s.verifier.insert(
        "222",
        PostContent::new(format!("Dispute: done. Proof-of-Day token {}", token.to_lowercase())),
    );

    let outcome = s
        .controller
        .verify_dispute(goal.id, "https://twitter.com/alice/status/222?s=20")
        .await
        .unwrap();
    assert!(outcome.verified);
    assert_eq!(outcome.status, GoalStatus::Passed);
    assert_eq!(outcome.attestation.result, Verdict::Pass);
    assert_eq!(
        outcome.attestation.attestation_id,
        format!("MOCK-PASS-DISPUTED-{}", goal.id)
    );
    // Never attested before the dispute, so this one enters the feed.
    assert!(outcome.attestation.added_to_feed);

    let stored = s.controller.get_goal(goal.id).unwrap();
    assert_eq!(stored.status, GoalStatus::Passed);
    assert!(stored.disputed);

    // Disputed is permanent: nothing reopens the goal.
    assert!(matches!(
        s.controller.start_dispute(goal.id).unwrap_err(),
        LifecycleError::State { .. }
    ));
    assert!(matches!(
        s.controller.request_questions(goal.id).await.unwrap_err(),
        LifecycleError::State { .. }
    ));
    assert!(s.controller.get_goal(goal.id).unwrap().disputed);
}

#[tokio::test]
async fn transient_fetch_failures_are_retried() {
    let dir = TempDir::new().unwrap();
    let verifier = Arc::new(
        StaticPostVerifier::new()
            .with_post("333", PostContent::new("#proofofday done"))
            .failing_first(2),
    );
    let mut config = config();
    config.dispute.keywords = vec!["#ProofOfDay".to_string()];
    let controller = Controller::new(
        Arc::new(FileGoalStore::new(dir.path()).unwrap()),
        Arc::new(MockJudge::new().with_verdicts([Verdict::Fail])),
        Arc::new(MockAttestor::new()),
        verifier.clone(),
        config,
    );

    let goal = controller
        .create_goal(NewGoal {
            owner: "bob".into(),
            title: "Run 5k".into(),
            ..NewGoal::default()
        })
        .unwrap();
    controller.request_questions(goal.id).await.unwrap();
    controller.submit_answers(goal.id, answers()).await.unwrap();
    controller.start_dispute(goal.id).unwrap();

    let outcome = controller
        .verify_dispute(goal.id, "https://mobile.x.com/bob/status/333")
        .await
        .unwrap();
    assert!(outcome.verified);
    assert_eq!(verifier.calls(), 3);
}

#[tokio::test]
async fn one_answer_is_rejected_before_the_judge() {
    let s = setup(MockJudge::new());
    let goal = create(&s);
    s.controller.request_questions(goal.id).await.unwrap();
    let before = s.controller.get_goal(goal.id).unwrap();

    let err = s
        .controller
        .submit_answers(goal.id, vec!["only one".into()])
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Validation(_)));
    assert_eq!(s.judge.grade_calls(), 0);

    let after = s.controller.get_goal(goal.id).unwrap();
    assert_eq!(after.status, GoalStatus::Pending);
    assert!(after.answers.is_none());
    assert_eq!(after.updated_at, before.updated_at);
}

#[tokio::test]
async fn missing_ledger_credentials_still_update_goal_and_feed() {
    let attestor = LedgerAttestor::new(None, None, None, Duration::from_secs(1)).unwrap();
    let s = setup_with(MockJudge::new(), Arc::new(attestor));
    let goal = create(&s);
    s.controller.request_questions(goal.id).await.unwrap();
    s.controller.submit_answers(goal.id, answers()).await.unwrap();

    let outcome = s
        .controller
        .attest(goal.id, AttestRequest::default())
        .await
        .unwrap();
    assert!(outcome.mocked);
    assert_eq!(outcome.tx_ref, "0xMOCK");
    assert_eq!(outcome.attestation_id, format!("MOCK-PASS-{}", goal.id));
    assert_eq!(
        s.controller.get_goal(goal.id).unwrap().attestation_id(),
        Some(outcome.attestation_id.as_str())
    );
    assert_eq!(s.controller.feed(Some(10)).unwrap().len(), 1);
}

#[tokio::test]
async fn ledger_rejection_is_upstream_error_without_mutation() {
    let s = setup_with(MockJudge::new(), Arc::new(RejectingAttestor));
    let goal = create(&s);
    s.controller.request_questions(goal.id).await.unwrap();
    s.controller.submit_answers(goal.id, answers()).await.unwrap();

    let err = s
        .controller
        .attest(goal.id, AttestRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Upstream { .. }));
    assert!(s.controller.get_goal(goal.id).unwrap().attestations.is_empty());
    assert!(s.controller.feed(None).unwrap().is_empty());
}

#[tokio::test]
async fn owner_history_is_newest_first() {
    let s = setup(MockJudge::new());
    let first = create(&s);
    let second = create(&s);
    s.controller
        .create_goal(NewGoal {
            owner: "carol".into(),
            title: "Practice scales".into(),
            ..NewGoal::default()
        })
        .unwrap();

    let history = s.controller.public_history(" alice ").unwrap();
    let ids: Vec<_> = history.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert_eq!(s.controller.list_users().unwrap(), vec!["alice", "carol"]);
}

#[tokio::test]
async fn unknown_goal_is_not_found_everywhere() {
    let s = setup(MockJudge::new());
    let id = uuid::Uuid::new_v4();
    assert!(matches!(s.controller.get_goal(id), Err(LifecycleError::NotFound(_))));
    assert!(matches!(
        s.controller.request_questions(id).await,
        Err(LifecycleError::NotFound(_))
    ));
    assert!(matches!(
        s.controller.attest(id, AttestRequest::default()).await,
        Err(LifecycleError::NotFound(_))
    ));
    assert!(matches!(
        s.controller.start_dispute(id),
        Err(LifecycleError::NotFound(_))
    ));
    assert!(matches!(
        s.controller
            .verify_dispute(id, "https://x.com/a/status/1")
            .await,
        Err(LifecycleError::NotFound(_))
    ));
}
