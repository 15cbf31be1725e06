// users.rs — Known usernames.

use pod_goal::GoalStore;

pub fn execute(store: &dyn GoalStore) -> anyhow::Result<()> {
    let users = store.known_users()?;
    if users.is_empty() {
        println!("No users yet.");
        return Ok(());
    }
    for user in &users {
        let goals = store.list_by_owner(user)?;
        println!("{:<24} {} goal(s)", user, goals.len());
    }
    println!("\n{} user(s) total.", users.len());
    Ok(())
}
