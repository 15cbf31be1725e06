// goal.rs — Goal subcommands: list, show.

use clap::Subcommand;
use pod_goal::{Goal, GoalStore};

use super::truncate;

#[derive(Subcommand)]
pub enum GoalCommands {
    /// List an owner's goals, newest first.
    List {
        /// Owner username.
        owner: String,
    },
    /// Show one goal in full.
    Show {
        /// Goal ID.
        id: String,
        /// Print the raw JSON record.
        #[arg(long)]
        json: bool,
    },
}

pub fn execute(cmd: &GoalCommands, store: &dyn GoalStore) -> anyhow::Result<()> {
    match cmd {
        GoalCommands::List { owner } => list_goals(store, owner),
        GoalCommands::Show { id, json } => show_goal(store, id, *json),
    }
}

fn list_goals(store: &dyn GoalStore, owner: &str) -> anyhow::Result<()> {
    let goals = store.list_by_owner(owner.trim())?;
    if goals.is_empty() {
        println!("No goals found for {}.", owner.trim());
        return Ok(());
    }
    print!("{}", goal_table(&goals));
    println!("\n{} goal(s) total.", goals.len());
    Ok(())
}

fn show_goal(store: &dyn GoalStore, id: &str, json: bool) -> anyhow::Result<()> {
    let goal_id = uuid::Uuid::parse_str(id)?;
    match store.get(goal_id)? {
        Some(goal) if json => println!("{}", serde_json::to_string_pretty(&goal)?),
        Some(goal) => print!("{}", goal_details(&goal)),
        None => {
            eprintln!("Goal not found: {}", id);
            std::process::exit(1);
        }
    }
    Ok(())
}

pub(crate) fn goal_table(goals: &[Goal]) -> String {
    let mut out = format!(
        "{:<38} {:<30} {:<16} {:<8}\n",
        "ID", "TITLE", "STATE", "ATTESTED"
    );
    out.push_str(&"-".repeat(94));
    out.push('\n');
    for g in goals {
        out.push_str(&format!(
            "{:<38} {:<30} {:<16} {:<8}\n",
            g.id,
            truncate(&g.title, 28),
            g.lifecycle_state().to_string(),
            if g.attestations.is_empty() { "no" } else { "yes" },
        ));
    }
    out
}

fn goal_details(g: &Goal) -> String {
    let mut lines = vec![
        format!("Goal:     {}", g.id),
        format!("Owner:    {}", g.owner),
        format!("Title:    {}", g.title),
    ];
    if let Some(scope) = &g.scope {
        lines.push(format!("Scope:    {}", scope));
    }
    lines.push(format!("Status:   {}", g.status));
    lines.push(format!("State:    {}", g.lifecycle_state()));
    lines.push(format!("Disputed: {}", g.disputed));
    if let Some(deadline) = g.deadline {
        lines.push(format!("Deadline: {}", deadline.to_rfc3339()));
    }
    lines.push(format!("Created:  {}", g.created_at.to_rfc3339()));
    lines.push(format!("Updated:  {}", g.updated_at.to_rfc3339()));

    if let Some(questions) = &g.questions {
        lines.push(String::new());
        for (i, q) in questions.as_array().iter().enumerate() {
            lines.push(format!("Q{}: {}", i + 1, q));
            if let Some(answers) = &g.answers {
                lines.push(format!("A{}: {}", i + 1, answers.as_array()[i]));
            }
        }
    }

    if !g.attestations.is_empty() {
        lines.push(String::new());
        lines.push("Attestations:".to_string());
        for a in &g.attestations {
            lines.push(format!(
                "  {} {}{} tx={}{}",
                a.result,
                if a.disputed { "(disputed) " } else { "" },
                a.attestation_id,
                a.tx_ref,
                if a.mocked { " [mocked]" } else { "" },
            ));
        }
    }

    if !g.notes.is_empty() {
        lines.push(String::new());
        lines.push("Notes:".to_string());
        lines.push(g.notes.clone());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
