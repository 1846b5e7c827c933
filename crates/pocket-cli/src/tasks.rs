use std::io::Write;

use color_eyre::Result;
use pocket_core::{
    tasks::{Category, Task, TaskId},
    view::{TaskQuery, TaskStats},
};
use pocket_task::{NoOp, Outcome, TaskPersistence, TaskStore};

use crate::{cli::TaskCommand, config::Config};

const SHORT_ID_LEN: usize = 8;

/// Execute a task subcommand against a loaded store, writing results to `out`.
pub async fn handle<P: TaskPersistence>(
    cmd: TaskCommand,
    store: &mut TaskStore<P>,
    config: &Config,
    out: &mut impl Write,
) -> Result<()> {
    match cmd {
        TaskCommand::List { category, search } => {
            let query = TaskQuery::new(category, search.unwrap_or_default());
            writeln!(out, "{}", render_stats(&store.stats()))?;
            let view = store.view(&query);
            if view.is_empty() {
                writeln!(out, "No tasks found. Add one with `pocket add <text>`.")?;
                return Ok(());
            }
            writeln!(out, "Tasks ({}):", view.len())?;
            for task in view {
                writeln!(out, "{}", render_task(task))?;
            }
        }
        TaskCommand::Add { text, category } => {
            let category = category.unwrap_or_else(|| config.default_category());
            let outcome = store.add(&text.join(" "), category).await?;
            match outcome {
                Outcome::Created(id) => {
                    if let Some(task) = store.get(&id) {
                        writeln!(out, "Created task {}: {}", short_id(&id), task.text)?;
                    }
                }
                other => report(out, &other, "")?,
            }
        }
        TaskCommand::Toggle { id } => {
            let id = resolve_id(store.tasks(), &id)?;
            let outcome = store.toggle_complete(&id).await?;
            match store.get(&id) {
                Some(task) if outcome.is_applied() => {
                    let state = if task.completed { "done" } else { "open" };
                    writeln!(out, "Marked {state}: {}", task.text)?;
                }
                _ => report(out, &outcome, id.as_str())?,
            }
        }
        TaskCommand::Delete { id } => {
            let id = resolve_id(store.tasks(), &id)?;
            let text = store.get(&id).map(|t| t.text.clone());
            let outcome = store.delete(&id).await?;
            match text {
                Some(text) if outcome.is_applied() => writeln!(out, "Deleted: {text}")?,
                _ => report(out, &outcome, id.as_str())?,
            }
        }
        TaskCommand::Recategorize { id, category } => {
            let id = resolve_id(store.tasks(), &id)?;
            let outcome = store.recategorize(&id, category).await?;
            match store.get(&id) {
                Some(task) if outcome.is_applied() => {
                    writeln!(out, "Moved to {category}: {}", task.text)?
                }
                _ => report(out, &outcome, id.as_str())?,
            }
        }
        TaskCommand::ClearCompleted => {
            let before = store.tasks().len();
            let outcome = store.clear_completed().await?;
            if outcome.is_applied() {
                let removed = before - store.tasks().len();
                writeln!(out, "Cleared {removed} completed task(s).")?;
            } else {
                report(out, &outcome, "")?;
            }
        }
        TaskCommand::Stats => {
            writeln!(out, "{}", render_stats(&store.stats()))?;
        }
    }

    Ok(())
}

/// Accepts a full id or a prefix matching exactly one task. Unknown ids are
/// passed through so the store can treat them as a no-op.
fn resolve_id(tasks: &[Task], raw: &str) -> Result<TaskId> {
    let raw = raw.trim();
    if raw.is_empty() {
        color_eyre::eyre::bail!("task id must not be empty");
    }
    if let Some(exact) = tasks.iter().find(|t| t.id.as_str() == raw) {
        return Ok(exact.id.clone());
    }
    let matches: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.id.as_str().starts_with(raw))
        .collect();
    match matches.as_slice() {
        [one] => Ok(one.id.clone()),
        [] => Ok(TaskId::from(raw)),
        many => color_eyre::eyre::bail!(
            "id prefix `{raw}` is ambiguous ({} tasks match)",
            many.len()
        ),
    }
}

fn report(out: &mut impl Write, outcome: &Outcome, id: &str) -> Result<()> {
    let message = match outcome {
        Outcome::Unchanged(NoOp::EmptyText) => "Nothing to add: task text is empty.".to_string(),
        Outcome::Unchanged(NoOp::NotFound) => format!("No task with id {id}."),
        Outcome::Unchanged(NoOp::NothingCompleted) => "No completed tasks to clear.".to_string(),
        Outcome::Unchanged(NoOp::Rejected) => {
            "Nothing changed; the failure was logged.".to_string()
        }
        Outcome::Created(_) | Outcome::Applied => return Ok(()),
    };
    writeln!(out, "{message}")?;
    Ok(())
}

fn short_id(id: &TaskId) -> &str {
    let raw = id.as_str();
    raw.get(..SHORT_ID_LEN).unwrap_or(raw)
}

fn render_task(task: &Task) -> String {
    let mark = if task.completed { "[x]" } else { "[ ]" };
    format!(
        "{} {mark} {:<8} {}  ({})",
        short_id(&task.id),
        task.category,
        task.text,
        task.created_at_utc().format("%Y-%m-%d")
    )
}

fn render_stats(stats: &TaskStats) -> String {
    let per_category = Category::ALL
        .iter()
        .map(|c| format!("{c} {}", stats.for_category(*c)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Total {} | Completed {} | {per_category}",
        stats.total, stats.completed
    )
}
