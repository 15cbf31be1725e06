// feed.rs — The recent-attestation feed and the public goal projection.
//
// The feed is an index of goal ids, newest first, capped at FEED_CAPACITY.
// It is not a source of truth: readers resolve each id against the goal
// records and silently skip ids that no longer resolve.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::goal::{Goal, GoalId, GoalStatus};

/// Maximum number of entries retained in the feed index.
pub const FEED_CAPACITY: usize = 500;

/// Default number of feed entries returned to readers.
pub const DEFAULT_FEED_LIMIT: usize = 200;

/// One feed index entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedEntry {
    pub goal_id: GoalId,
    pub appended_at: DateTime<Utc>,
}

/// Insert `goal_id` at the head of `entries` unless it is already present,
/// then trim to `capacity`. Returns true if an entry was added.
pub(crate) fn push_entry(entries: &mut Vec<FeedEntry>, goal_id: GoalId, capacity: usize) -> bool {
    if entries.iter().any(|e| e.goal_id == goal_id) {
        return false;
    }
    entries.insert(
        0,
        FeedEntry {
            goal_id,
            appended_at: Utc::now(),
        },
    );
    entries.truncate(capacity);
    true
}

/// The publicly visible fields of a goal.
///
/// Answers, notes and dispute tokens never leave the service through
/// the public feed or a user's public history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicGoal {
    pub id: GoalId,
    pub owner: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub status: GoalStatus,
    pub disputed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Goal> for PublicGoal {
    fn from(goal: &Goal) -> Self {
        Self {
            id: goal.id,
            owner: goal.owner.clone(),
            title: goal.title.clone(),
            scope: goal.scope.clone(),
            status: goal.status,
            disputed: goal.disputed,
            attestation_id: goal.attestation_id().map(str::to_string),
            created_at: goal.created_at,
        }
    }
}
