// judge.rs — The Judge trait.

use async_trait::async_trait;
use pod_goal::{QuestionPair, Verdict};

use crate::error::JudgeError;

/// Produces verification questions for a goal and grades answers to them.
///
/// Grading happens one question at a time; the caller combines the two
/// verdicts. A blank answer must grade as `Verdict::Fail` rather than error.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Backend identifier (e.g., model name).
    fn name(&self) -> &str;

    /// True for offline judges that never call a model.
    fn is_mock(&self) -> bool {
        false
    }

    /// Check whether the backend is currently reachable.
    async fn is_available(&self) -> bool;

    /// Write exactly two questions for the goal.
    async fn generate_questions(
        &self,
        title: &str,
        scope: Option<&str>,
    ) -> Result<QuestionPair, JudgeError>;

    /// Grade a single answer against its question.
    async fn grade(
        &self,
        title: &str,
        scope: Option<&str>,
        question: &str,
        answer: &str,
    ) -> Result<Verdict, JudgeError>;
}
