// transcript.rs — Human-readable audit text appended to a goal's notes.

use pod_goal::{AnswerPair, Goal, QuestionPair, Verdict};

/// Per-question grading record.
#[derive(Debug, Clone)]
pub struct GradedQuestion<'a> {
    pub question: &'a str,
    pub answer: &'a str,
    pub verdict: Verdict,
    /// The judge failed and the verdict came from the fallback policy.
    pub defaulted: bool,
}

/// Render the grading transcript for `goal`.
pub fn grading(goal: &Goal, questions: &QuestionPair, answers: &AnswerPair, verdicts: [(Verdict, bool); 2]) -> String {
    let graded = [
        GradedQuestion {
            question: questions.first(),
            answer: answers.first(),
            verdict: verdicts[0].0,
            defaulted: verdicts[0].1,
        },
        GradedQuestion {
            question: questions.second(),
            answer: answers.second(),
            verdict: verdicts[1].0,
            defaulted: verdicts[1].1,
        },
    ];

    let mut lines = vec!["==== LLM TRANSCRIPT ====".to_string(), format!("Goal: {}", goal.title)];
    if let Some(scope) = &goal.scope {
        lines.push(format!("Scope: {}", scope));
    }
    for (i, g) in graded.iter().enumerate() {
        let n = i + 1;
        lines.push(String::new());
        lines.push(format!("Q{}: {}", n, g.question));
        lines.push(format!("A{}: {}", n, g.answer));
        if g.defaulted {
            lines.push(format!("Judge{}: {} (judge unavailable, default applied)", n, g.verdict));
        } else {
            lines.push(format!("Judge{}: {}", n, g.verdict));
        }
    }
    let overall = graded[0].verdict.and(graded[1].verdict);
    lines.push(String::new());
    lines.push(format!("RESULT: {}", overall));
    lines.join("\n")
}

/// Render the dispute resolution record.
pub fn dispute(post_url: &str, marker: &str, verified: bool) -> String {
    [
        "==== DISPUTE ====".to_string(),
        format!("Post: {}", post_url),
        format!("Marker: {}", marker),
        format!(
            "RESULT: {}",
            if verified { "VERIFIED" } else { "NOT VERIFIED" }
        ),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grading_transcript_layout() {
        let goal = Goal::new("alice", "Read ch.1", Some("Sections 1-3".into()), None);
        let text = grading(
            &goal,
            &QuestionPair::new("q1", "q2"),
            &AnswerPair::new("a1", "a2"),
            [(Verdict::Pass, false), (Verdict::Fail, false)],
        );
        assert_eq!(
            text,
            "==== LLM TRANSCRIPT ====\nGoal: Read ch.1\nScope: Sections 1-3\n\n\
             Q1: q1\nA1: a1\nJudge1: PASS\n\n\
             Q2: q2\nA2: a2\nJudge2: FAIL\n\n\
             RESULT: FAIL"
        );
    }

    #[test]
    fn defaulted_verdict_is_flagged() {
        let goal = Goal::new("alice", "Read ch.1", None, None);
        let text = grading(
            &goal,
            &QuestionPair::new("q1", "q2"),
            &AnswerPair::new("a1", "a2"),
            [(Verdict::Pass, true), (Verdict::Pass, false)],
        );
        assert!(!text.contains("Scope:"));
        assert!(text.contains("Judge1: PASS (judge unavailable, default applied)"));
        assert!(text.ends_with("RESULT: PASS"));
    }

    #[test]
    fn dispute_record() {
        let text = dispute("https://x.com/a/status/1", "POD-0123456789AB", false);
        assert!(text.starts_with("==== DISPUTE ===="));
        assert!(text.ends_with("RESULT: NOT VERIFIED"));
    }
}
