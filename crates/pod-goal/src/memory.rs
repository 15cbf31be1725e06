// memory.rs — In-process goal store.
//
// Used by tests and by the daemon's demo mode when no data directory is
// configured. All state sits behind one mutex, so each operation is atomic
// but a read-modify-write spanning two calls is not.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use crate::error::GoalError;
use crate::feed::{self, FeedEntry, FEED_CAPACITY};
use crate::goal::{Goal, GoalId, GoalPatch};
use crate::store::GoalStore;

#[derive(Default)]
struct Inner {
    goals: HashMap<GoalId, Goal>,
    owners: HashMap<String, Vec<GoalId>>,
    feed: Vec<FeedEntry>,
    users: BTreeSet<String>,
}

/// A goal store held entirely in memory.
#[derive(Default)]
pub struct MemoryGoalStore {
    inner: Mutex<Inner>,
}

impl MemoryGoalStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, GoalError> {
        self.inner
            .lock()
            .map_err(|e| GoalError::LockPoisoned(e.to_string()))
    }

    /// Remove a goal record while leaving its index entries behind.
    /// Only used to exercise dangling-reference handling in tests.
    #[cfg(test)]
    pub(crate) fn forget(&self, id: GoalId) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.goals.remove(&id);
        }
    }
}

impl GoalStore for MemoryGoalStore {
    fn create(&self, goal: &Goal) -> Result<(), GoalError> {
        let mut inner = self.lock()?;
        inner.goals.insert(goal.id, goal.clone());
        inner
            .owners
            .entry(goal.owner.clone())
            .or_default()
            .insert(0, goal.id);
        inner.users.insert(goal.owner.clone());
        Ok(())
    }

    fn get(&self, id: GoalId) -> Result<Option<Goal>, GoalError> {
        Ok(self.lock()?.goals.get(&id).cloned())
    }

    fn list_by_owner(&self, owner: &str) -> Result<Vec<Goal>, GoalError> {
        let inner = self.lock()?;
        let mut goals: Vec<Goal> = inner
            .owners
            .get(owner)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.goals.get(id).cloned())
            .collect();
        goals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(goals)
    }

    fn update(&self, id: GoalId, patch: GoalPatch) -> Result<Option<Goal>, GoalError> {
        let mut inner = self.lock()?;
        Ok(inner.goals.get_mut(&id).map(|goal| {
            patch.apply(goal);
            goal.clone()
        }))
    }

    fn append_feed(&self, id: GoalId) -> Result<bool, GoalError> {
        let mut inner = self.lock()?;
        Ok(feed::push_entry(&mut inner.feed, id, FEED_CAPACITY))
    }

    fn feed(&self, limit: usize) -> Result<Vec<Goal>, GoalError> {
        let inner = self.lock()?;
        Ok(inner
            .feed
            .iter()
            .take(limit)
            .filter_map(|entry| inner.goals.get(&entry.goal_id).cloned())
            .collect())
    }

    fn add_known_user(&self, username: &str) -> Result<(), GoalError> {
        self.lock()?.users.insert(username.to_string());
        Ok(())
    }

    fn known_users(&self) -> Result<Vec<String>, GoalError> {
        Ok(self.lock()?.users.iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::{GoalStatus, QuestionPair};

    #[test]
    fn create_indexes_owner_and_user() {
        let store = MemoryGoalStore::new();
        let goal = Goal::new("alice", "Read ch.1", None, None);
        store.create(&goal).unwrap();

        assert_eq!(store.list_by_owner("alice").unwrap().len(), 1);
        assert_eq!(store.known_users().unwrap(), vec!["alice".to_string()]);
    }

    #[test]
    fn update_is_last_write_wins() {
        let store = MemoryGoalStore::new();
        let goal = Goal::new("alice", "Goal", None, None);
        store.create(&goal).unwrap();

        store
            .update(goal.id, GoalPatch::new().with_questions(QuestionPair::new("a", "b")))
            .unwrap();
        let merged = store
            .update(goal.id, GoalPatch::new().with_questions(QuestionPair::new("c", "d")))
            .unwrap()
            .unwrap();

        assert_eq!(merged.questions, Some(QuestionPair::new("c", "d")));
        assert_eq!(merged.status, GoalStatus::Pending);
    }

    #[test]
    fn feed_tolerates_missing_goals() {
        let store = MemoryGoalStore::new();
        let kept = Goal::new("alice", "Kept", None, None);
        let lost = Goal::new("alice", "Lost", None, None);
        store.create(&kept).unwrap();
        store.create(&lost).unwrap();
        store.append_feed(kept.id).unwrap();
        store.append_feed(lost.id).unwrap();

        store.forget(lost.id);

        let feed = store.feed(10).unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id, kept.id);
        assert_eq!(store.list_by_owner("alice").unwrap().len(), 1);
    }

    #[test]
    fn feed_respects_limit_newest_first() {
        let store = MemoryGoalStore::new();
        let mut ids = Vec::new();
        for i in 0..4 {
            let goal = Goal::new("alice", format!("Goal {}", i), None, None);
            store.create(&goal).unwrap();
            store.append_feed(goal.id).unwrap();
            ids.push(goal.id);
        }

        let feed = store.feed(2).unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].id, ids[3]);
        assert_eq!(feed[1].id, ids[2]);
    }
}
