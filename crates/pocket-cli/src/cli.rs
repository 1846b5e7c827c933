use clap::{Parser, Subcommand};
use pocket_core::tasks::{Category, CategoryFilter};

/// CLI surface definition.
#[derive(Parser, Debug)]
#[command(
    name = "pocket",
    about = "Local-first task list with categories, search and stats",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Optional subcommand; defaults to listing every task when absent.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    #[command(flatten)]
    Task(TaskCommand),
    /// Print version and exit.
    Version,
    /// Round-trip a probe value through the configured storage.
    Health,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    /// Add a task.
    Add {
        /// Task text; surrounding whitespace is trimmed.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// work, personal or shopping (defaults to the configured category).
        #[arg(short, long)]
        category: Option<Category>,
    },
    /// List tasks, optionally narrowed by category and search text.
    List {
        /// all, work, personal or shopping.
        #[arg(short, long, default_value = "all")]
        category: CategoryFilter,
        /// Case-insensitive substring to match against task text.
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Flip a task between open and completed.
    Toggle {
        /// Task id or a unique prefix of it.
        id: String,
    },
    /// Delete a task.
    Delete {
        /// Task id or a unique prefix of it.
        id: String,
    },
    /// Move a task to another category.
    #[command(visible_alias = "category")]
    Recategorize {
        /// Task id or a unique prefix of it.
        id: String,
        category: Category,
    },
    /// Remove every completed task.
    ClearCompleted,
    /// Show task counts.
    Stats,
}

impl TaskCommand {
    pub fn list_all() -> Self {
        TaskCommand::List {
            category: CategoryFilter::All,
            search: None,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}
