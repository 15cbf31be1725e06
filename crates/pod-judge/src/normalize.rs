// normalize.rs — Shape normalization for judge replies.
//
// Models return questions as plain strings or as objects carrying the text
// under `text` or `question`, sometimes wrapped in `{"questions": [...]}` and
// sometimes as a bare array. Verdicts arrive as `{"verdict": "PASS"}`,
// `{"result": "fail"}` or `{"pass": true}`. Everything is folded into the
// fixed QuestionPair / Verdict types here so nothing downstream branches on
// shape.

use pod_goal::{QuestionPair, Verdict};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuestion {
    Text(String),
    Object {
        #[serde(alias = "question", alias = "q")]
        text: String,
    },
}

impl RawQuestion {
    fn into_text(self) -> String {
        match self {
            RawQuestion::Text(text) | RawQuestion::Object { text } => text,
        }
    }
}

/// Extract the first two non-blank questions from a judge reply.
///
/// Returns `None` if fewer than two usable questions are present.
pub fn questions_from_value(value: &Value) -> Option<QuestionPair> {
    let list = match value {
        Value::Array(items) => items,
        Value::Object(map) => map.get("questions")?.as_array()?,
        _ => return None,
    };

    let mut texts = list
        .iter()
        .filter_map(|item| serde_json::from_value::<RawQuestion>(item.clone()).ok())
        .map(|q| q.into_text().trim().to_string())
        .filter(|q| !q.is_empty());

    let first = texts.next()?;
    let second = texts.next()?;
    Some(QuestionPair::new(first, second))
}

/// Generic questions used when the model does not return two usable ones.
pub fn fallback_questions(title: &str, scope: Option<&str>) -> QuestionPair {
    let focus = scope.filter(|s| !s.trim().is_empty()).unwrap_or(title);
    QuestionPair::new(
        format!("State a core concept related to: {}.", title),
        format!("Provide a worked example from: {}.", focus),
    )
}

/// Interpret a grading reply. Returns `None` when no verdict is recognizable.
pub fn verdict_from_value(value: &Value) -> Option<Verdict> {
    for key in ["verdict", "result", "grade"] {
        if let Some(text) = value.get(key).and_then(Value::as_str) {
            return verdict_from_str(text);
        }
    }
    value
        .get("pass")
        .and_then(Value::as_bool)
        .map(Verdict::from_pass)
}

fn verdict_from_str(text: &str) -> Option<Verdict> {
    match text.trim().to_ascii_uppercase().as_str() {
        "PASS" | "PASSED" => Some(Verdict::Pass),
        "FAIL" | "FAILED" => Some(Verdict::Fail),
        _ => None,
    }
}
