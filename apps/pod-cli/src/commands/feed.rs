// feed.rs — Recently attested goals, newest first.

use pod_goal::{GoalStore, PublicGoal, FEED_CAPACITY};

use super::truncate;

pub fn execute(store: &dyn GoalStore, limit: usize) -> anyhow::Result<()> {
    let entries: Vec<PublicGoal> = store
        .feed(limit.min(FEED_CAPACITY))?
        .iter()
        .map(PublicGoal::from)
        .collect();

    if entries.is_empty() {
        println!("Feed is empty.");
        return Ok(());
    }
    print!("{}", feed_table(&entries));
    println!("\n{} goal(s) total.", entries.len());
    Ok(())
}

fn feed_table(entries: &[PublicGoal]) -> String {
    let mut out = format!(
        "{:<20} {:<16} {:<30} {:<8} {:<8}\n",
        "CREATED", "OWNER", "TITLE", "STATUS", "DISPUTED"
    );
    out.push_str(&"-".repeat(86));
    out.push('\n');
    for g in entries {
        out.push_str(&format!(
            "{:<20} {:<16} {:<30} {:<8} {:<8}\n",
            g.created_at.format("%Y-%m-%d %H:%M"),
            truncate(&g.owner, 14),
            truncate(&g.title, 28),
            g.status.to_string(),
            if g.disputed { "yes" } else { "" },
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pod_goal::{FileGoalStore, Goal, GoalPatch, GoalStatus};
    use tempfile::TempDir;

    #[test]
    fn feed_lists_attested_goals_only() {
        let dir = TempDir::new().unwrap();
        let store = FileGoalStore::new(dir.path()).unwrap();
        let shown = Goal::new("alice", "Read ch.1", None, None);
        let hidden = Goal::new("bob", "Unattested", None, None);
        store.create(&shown).unwrap();
        store.create(&hidden).unwrap();
        store
            .update(shown.id, GoalPatch::new().with_status(GoalStatus::Passed))
            .unwrap();
        store.append_feed(shown.id).unwrap();

        let entries: Vec<PublicGoal> = store
            .feed(10)
            .unwrap()
            .iter()
            .map(PublicGoal::from)
            .collect();
        let table = feed_table(&entries);
        assert!(table.contains("Read ch.1"));
        assert!(table.contains("PASSED"));
        assert!(!table.contains("Unattested"));

        execute(&store, 10).unwrap();
    }
}
