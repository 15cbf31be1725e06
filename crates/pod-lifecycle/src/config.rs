// config.rs — Lifecycle policy configuration.
//
// Loaded from the `[lifecycle]` table of pod.toml. Every field has a serde
// default so an empty table (or none at all) yields the strict defaults:
// terminal goals are blocked, judge failures surface, disputes use tokens.

use pod_dispute::{MarkerStrategy, RetryPolicy};
use pod_goal::DEFAULT_FEED_LIMIT;
use serde::{Deserialize, Serialize};

/// What to do when the judge errors while grading one answer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JudgeFailurePolicy {
    /// Surface an upstream error and leave the goal untouched.
    #[default]
    Fail,
    /// Record PASS for the affected question and note it in the transcript.
    PassDefault,
}

/// Whether questioning/grading may run again on a PASSED or FAILED goal.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TerminalPolicy {
    #[default]
    Block,
    /// Allowed for goals that are not disputed and have no dispute pending.
    Overwrite,
}

fn default_site_url() -> String {
    "http://localhost:3000".to_string()
}

/// Dispute sub-flow settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisputeConfig {
    #[serde(default)]
    pub marker: MarkerStrategy,

    /// Fallback keywords accepted when the primary marker is absent.
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Public base URL used to build owners' profile links.
    #[serde(default = "default_site_url")]
    pub site_url: String,

    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for DisputeConfig {
    fn default() -> Self {
        Self {
            marker: MarkerStrategy::default(),
            keywords: Vec::new(),
            site_url: default_site_url(),
            retry: RetryPolicy::default(),
        }
    }
}

fn default_feed_limit() -> usize {
    DEFAULT_FEED_LIMIT
}

/// Top-level lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LifecycleConfig {
    #[serde(default)]
    pub judge_failure: JudgeFailurePolicy,

    #[serde(default)]
    pub terminal_goals: TerminalPolicy,

    #[serde(default)]
    pub dispute: DisputeConfig,

    /// Feed entries returned when the reader gives no limit.
    #[serde(default = "default_feed_limit")]
    pub feed_limit: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            judge_failure: JudgeFailurePolicy::default(),
            terminal_goals: TerminalPolicy::default(),
            dispute: DisputeConfig::default(),
            feed_limit: default_feed_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: LifecycleConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LifecycleConfig::default());
        assert_eq!(config.judge_failure, JudgeFailurePolicy::Fail);
        assert_eq!(config.terminal_goals, TerminalPolicy::Block);
        assert_eq!(config.dispute.marker, MarkerStrategy::Token);
        assert_eq!(config.feed_limit, 200);
    }

    #[test]
    fn policies_use_snake_case_names() {
        let config: LifecycleConfig = serde_json::from_str(
            r##"{
                "judge_failure": "pass_default",
                "terminal_goals": "overwrite",
                "dispute": { "marker": "profile_url", "keywords": ["#proofofday"] }
            }"##,
        )
        .unwrap();
        assert_eq!(config.judge_failure, JudgeFailurePolicy::PassDefault);
        assert_eq!(config.terminal_goals, TerminalPolicy::Overwrite);
        assert_eq!(config.dispute.marker, MarkerStrategy::ProfileUrl);
        assert_eq!(config.dispute.keywords, vec!["#proofofday"]);
        assert_eq!(config.dispute.retry.attempts, 3);
    }
}
