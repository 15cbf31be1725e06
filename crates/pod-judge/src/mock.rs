// mock.rs — Deterministic offline judge.
//
// Lets the whole lifecycle run without a model: questions are templated
// from the goal and any non-blank answer passes. Tests can script verdicts
// and availability.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use pod_goal::{QuestionPair, Verdict};

use crate::error::JudgeError;
use crate::judge::Judge;

/// Mock judge with configurable verdicts.
pub struct MockJudge {
    available: AtomicBool,
    scripted: Mutex<VecDeque<Verdict>>,
    question_calls: AtomicU32,
    grade_calls: AtomicU32,
}

impl MockJudge {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            scripted: Mutex::new(VecDeque::new()),
            question_calls: AtomicU32::new(0),
            grade_calls: AtomicU32::new(0),
        }
    }

    /// Queue verdicts returned by successive `grade` calls (for non-blank answers).
    pub fn with_verdicts(self, verdicts: impl IntoIterator<Item = Verdict>) -> Self {
        if let Ok(mut scripted) = self.scripted.lock() {
            scripted.extend(verdicts);
        }
        self
    }

    /// Set availability. An unavailable mock fails every call.
    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    pub fn question_calls(&self) -> u32 {
        self.question_calls.load(Ordering::SeqCst)
    }

    pub fn grade_calls(&self) -> u32 {
        self.grade_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), JudgeError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(JudgeError::Unavailable("mock judge disabled".to_string()))
        }
    }
}

impl Default for MockJudge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Judge for MockJudge {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_mock(&self) -> bool {
        true
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn generate_questions(
        &self,
        title: &str,
        scope: Option<&str>,
    ) -> Result<QuestionPair, JudgeError> {
        self.question_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(QuestionPair::new(
            format!("Explain two key definitions you learned for: {}.", title),
            format!(
                "Give one concrete example (or mini proof outline) related to: {}.",
                scope.unwrap_or(title)
            ),
        ))
    }

    async fn grade(
        &self,
        _title: &str,
        _scope: Option<&str>,
        _question: &str,
        answer: &str,
    ) -> Result<Verdict, JudgeError> {
        self.grade_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        if answer.trim().is_empty() {
            return Ok(Verdict::Fail);
        }
        let scripted = self
            .scripted
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front());
        Ok(scripted.unwrap_or(Verdict::Pass))
    }
}
