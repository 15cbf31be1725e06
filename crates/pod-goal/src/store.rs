// store.rs — GoalStore trait and the JSON-file implementation.
//
// The GoalStore trait is the storage abstraction the lifecycle controller
// depends on. Every operation is atomic for a single key; consistency
// across keys (goal record vs. owner index vs. feed) is best-effort only.
//
// FileGoalStore layout under its root directory:
//   goals/<goal_id>.json   — one pretty-printed record per goal
//   owners.json            — owner → goal ids, newest first
//   feed.json              — recent-attestation feed entries, newest first
//   users.json             — known usernames

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::GoalError;
use crate::feed::{self, FeedEntry, FEED_CAPACITY};
use crate::goal::{Goal, GoalId, GoalPatch};

/// Storage for goal records and their indices.
///
/// Implementations must be shareable across request handlers, hence
/// `Send + Sync`. A store never enforces lifecycle rules; it only merges
/// what it is given.
pub trait GoalStore: Send + Sync {
    /// Persist a new goal, index it under its owner, and record the owner
    /// as a known user.
    fn create(&self, goal: &Goal) -> Result<(), GoalError>;

    /// Get a goal by id.
    fn get(&self, id: GoalId) -> Result<Option<Goal>, GoalError>;

    /// All goals of an owner, newest first. Dangling index entries are skipped.
    fn list_by_owner(&self, owner: &str) -> Result<Vec<Goal>, GoalError>;

    /// Read-modify-write merge of `patch` into the stored goal.
    /// Returns the merged record, or `None` if the goal does not exist.
    fn update(&self, id: GoalId, patch: GoalPatch) -> Result<Option<Goal>, GoalError>;

    /// Add a goal to the head of the feed. Returns false if already present.
    fn append_feed(&self, id: GoalId) -> Result<bool, GoalError>;

    /// Up to `limit` feed goals, newest first. Entries that no longer
    /// resolve to a goal are treated as absent.
    fn feed(&self, limit: usize) -> Result<Vec<Goal>, GoalError>;

    /// Record a username in the known-users set.
    fn add_known_user(&self, username: &str) -> Result<(), GoalError>;

    /// All known usernames, sorted.
    fn known_users(&self) -> Result<Vec<String>, GoalError>;
}

/// JSON-file backed goal store.
///
/// Each goal gets its own file so records stay isolated and easy to inspect
/// manually. The shared index files are rewritten under a process-wide
/// mutex; another process writing the same directory is not coordinated.
pub struct FileGoalStore {
    root: PathBuf,
    goals_dir: PathBuf,
    lock: Mutex<()>,
}

impl FileGoalStore {
    /// Create a new store rooted at the given directory.
    /// Creates the directory tree if it doesn't exist.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, GoalError> {
        let root = root.as_ref().to_path_buf();
        let goals_dir = root.join("goals");
        fs::create_dir_all(&goals_dir).map_err(|source| GoalError::IoError {
            path: goals_dir.display().to_string(),
            source,
        })?;
        Ok(Self {
            root,
            goals_dir,
            lock: Mutex::new(()),
        })
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn goal_file(&self, id: GoalId) -> PathBuf {
        self.goals_dir.join(format!("{}.json", id))
    }

    fn owners_file(&self) -> PathBuf {
        self.root.join("owners.json")
    }

    fn feed_file(&self) -> PathBuf {
        self.root.join("feed.json")
    }

    fn users_file(&self) -> PathBuf {
        self.root.join("users.json")
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>, GoalError> {
        self.lock
            .lock()
            .map_err(|e| GoalError::LockPoisoned(e.to_string()))
    }

    fn read_goal(&self, id: GoalId) -> Result<Option<Goal>, GoalError> {
        let path = self.goal_file(id);
        if !path.exists() {
            return Ok(None);
        }
        read_json(&path).map(Some)
    }

    fn write_goal(&self, goal: &Goal) -> Result<(), GoalError> {
        write_json(&self.goal_file(goal.id), goal)
    }

    fn read_owners(&self) -> Result<BTreeMap<String, Vec<GoalId>>, GoalError> {
        read_json_or_default(&self.owners_file())
    }

    fn read_feed(&self) -> Result<Vec<FeedEntry>, GoalError> {
        read_json_or_default(&self.feed_file())
    }

    fn read_users(&self) -> Result<BTreeSet<String>, GoalError> {
        read_json_or_default(&self.users_file())
    }

    fn insert_user(&self, username: &str) -> Result<(), GoalError> {
        let mut users = self.read_users()?;
        if users.insert(username.to_string()) {
            write_json(&self.users_file(), &users)?;
        }
        Ok(())
    }

    /// Resolve ids to goals, dropping ids whose record is missing or unreadable.
    fn resolve(&self, ids: impl IntoIterator<Item = GoalId>) -> Vec<Goal> {
        ids.into_iter()
            .filter_map(|id| match self.read_goal(id) {
                Ok(goal) => goal,
                Err(e) => {
                    tracing::warn!(goal_id = %id, error = %e, "skipping unreadable goal record");
                    None
                }
            })
            .collect()
    }
}

impl GoalStore for FileGoalStore {
    fn create(&self, goal: &Goal) -> Result<(), GoalError> {
        let _guard = self.guard()?;
        self.write_goal(goal)?;

        let mut owners = self.read_owners()?;
        owners.entry(goal.owner.clone()).or_default().insert(0, goal.id);
        write_json(&self.owners_file(), &owners)?;

        self.insert_user(&goal.owner)
    }

    fn get(&self, id: GoalId) -> Result<Option<Goal>, GoalError> {
        self.read_goal(id)
    }

    fn list_by_owner(&self, owner: &str) -> Result<Vec<Goal>, GoalError> {
        let ids = self.read_owners()?.remove(owner).unwrap_or_default();
        let mut goals = self.resolve(ids);
        goals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(goals)
    }

    fn update(&self, id: GoalId, patch: GoalPatch) -> Result<Option<Goal>, GoalError> {
        let _guard = self.guard()?;
        let Some(mut goal) = self.read_goal(id)? else {
            return Ok(None);
        };
        patch.apply(&mut goal);
        self.write_goal(&goal)?;
        Ok(Some(goal))
    }

    fn append_feed(&self, id: GoalId) -> Result<bool, GoalError> {
        let _guard = self.guard()?;
        let mut entries = self.read_feed()?;
        let added = feed::push_entry(&mut entries, id, FEED_CAPACITY);
        if added {
            write_json(&self.feed_file(), &entries)?;
        }
        Ok(added)
    }

    fn feed(&self, limit: usize) -> Result<Vec<Goal>, GoalError> {
        let entries = self.read_feed()?;
        Ok(self.resolve(entries.into_iter().take(limit).map(|e| e.goal_id)))
    }

    fn add_known_user(&self, username: &str) -> Result<(), GoalError> {
        let _guard = self.guard()?;
        self.insert_user(username)
    }

    fn known_users(&self) -> Result<Vec<String>, GoalError> {
        Ok(self.read_users()?.into_iter().collect())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, GoalError> {
    let json = fs::read_to_string(path).map_err(|source| GoalError::IoError {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&json)?)
}

fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T, GoalError> {
    if !path.exists() {
        return Ok(T::default());
    }
    read_json(path)
}

/// Write `value` next to `path` and rename it into place, so readers that
/// skip the lock see either the old record or the new one, never a partial file.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), GoalError> {
    let json = serde_json::to_string_pretty(value)?;
    let io_err = |source| GoalError::IoError {
        path: path.display().to_string(),
        source,
    };
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, json).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::{GoalStatus, QuestionPair};
    use tempfile::tempdir;
    use uuid::Uuid;

    fn make_goal(owner: &str, title: &str) -> Goal {
        Goal::new(owner, title, None, None)
    }

    #[test]
    fn create_and_get_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileGoalStore::new(dir.path()).unwrap();

        let goal = make_goal("alice", "Read ch.1");
        store.create(&goal).unwrap();

        let found = store.get(goal.id).unwrap().unwrap();
        assert_eq!(found.id, goal.id);
        assert_eq!(found.title, "Read ch.1");
        assert_eq!(store.known_users().unwrap(), vec!["alice".to_string()]);
    }

    #[test]
    fn get_nonexistent_returns_none() {
        let dir = tempdir().unwrap();
        let store = FileGoalStore::new(dir.path()).unwrap();
        assert!(store.get(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn list_by_owner_only_returns_that_owner() {
        let dir = tempdir().unwrap();
        let store = FileGoalStore::new(dir.path()).unwrap();

        store.create(&make_goal("alice", "One")).unwrap();
        store.create(&make_goal("bob", "Two")).unwrap();
        store.create(&make_goal("alice", "Three")).unwrap();

        let alice = store.list_by_owner("alice").unwrap();
        assert_eq!(alice.len(), 2);
        assert!(alice.iter().all(|g| g.owner == "alice"));
        assert!(store.list_by_owner("carol").unwrap().is_empty());
    }

    #[test]
    fn update_merges_and_persists() {
        let dir = tempdir().unwrap();
        let store = FileGoalStore::new(dir.path()).unwrap();
        let goal = make_goal("alice", "Goal");
        store.create(&goal).unwrap();

        let patch = GoalPatch::new()
            .with_questions(QuestionPair::new("q1", "q2"))
            .with_status(GoalStatus::Failed);
        let merged = store.update(goal.id, patch).unwrap().unwrap();
        assert_eq!(merged.status, GoalStatus::Failed);

        let reloaded = store.get(goal.id).unwrap().unwrap();
        assert_eq!(reloaded.questions, Some(QuestionPair::new("q1", "q2")));
    }

    #[test]
    fn update_nonexistent_returns_none() {
        let dir = tempdir().unwrap();
        let store = FileGoalStore::new(dir.path()).unwrap();
        assert!(store
            .update(Uuid::new_v4(), GoalPatch::new())
            .unwrap()
            .is_none());
    }

    #[test]
    fn feed_skips_dangling_entries() {
        let dir = tempdir().unwrap();
        let store = FileGoalStore::new(dir.path()).unwrap();
        let goal = make_goal("alice", "Goal");
        store.create(&goal).unwrap();

        assert!(store.append_feed(Uuid::new_v4()).unwrap());
        assert!(store.append_feed(goal.id).unwrap());
        assert!(!store.append_feed(goal.id).unwrap());

        let feed = store.feed(10).unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id, goal.id);
    }

    #[test]
    fn store_survives_reopen() {
        let dir = tempdir().unwrap();
        let goal = make_goal("alice", "Persistent");

        {
            let store = FileGoalStore::new(dir.path()).unwrap();
            store.create(&goal).unwrap();
            store.append_feed(goal.id).unwrap();
        }

        {
            let store = FileGoalStore::new(dir.path()).unwrap();
            assert_eq!(store.get(goal.id).unwrap().unwrap().title, "Persistent");
            assert_eq!(store.list_by_owner("alice").unwrap().len(), 1);
            assert_eq!(store.feed(5).unwrap().len(), 1);
        }
    }

    #[test]
    fn writes_replace_records_without_leftovers() {
        let dir = tempdir().unwrap();
        let store = FileGoalStore::new(dir.path()).unwrap();
        let goal = make_goal("alice", "Read ch.1");
        store.create(&goal).unwrap();
        store
            .update(goal.id, GoalPatch::new().with_note("first"))
            .unwrap();
        store
            .update(goal.id, GoalPatch::new().with_note("second"))
            .unwrap();

        let found = store.get(goal.id).unwrap().unwrap();
        assert_eq!(found.notes, "first\n\nsecond");

        let leftovers: Vec<_> = fs::read_dir(dir.path().join("goals"))
            .unwrap()
            .chain(fs::read_dir(dir.path()).unwrap())
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn known_users_are_sorted_and_unique() {
        let dir = tempdir().unwrap();
        let store = FileGoalStore::new(dir.path()).unwrap();
        store.add_known_user("zed").unwrap();
        store.add_known_user("amy").unwrap();
        store.add_known_user("zed").unwrap();
        assert_eq!(store.known_users().unwrap(), vec!["amy", "zed"]);
    }
}
