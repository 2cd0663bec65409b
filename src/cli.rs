use crate::dates;
use crate::models::{Priority, TodoFilter, Workspace};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Personal and work todos kept in two Notion databases.
#[derive(Debug, Parser)]
#[command(name = "notion-todos", version, about)]
pub struct Cli {
    /// Path to the YAML settings file
    #[arg(long, global = true, value_name = "PATH", env = "NOTION_TODOS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List open todos grouped by due date
    List(ListArgs),
    /// Add a todo
    Add(AddArgs),
    /// Describe a todo in plain language and let the assistant fill in the fields
    QuickAdd(QuickAddArgs),
    /// Edit fields of a todo; omitted or empty values are left unchanged
    Edit(EditArgs),
    /// Mark a todo as completed
    Done(TargetArgs),
    /// Archive a todo
    Delete(TargetArgs),
    /// Move a todo's due date to tomorrow or next Monday
    Postpone(PostponeArgs),
    /// Manage integration tokens stored in the OS keychain
    #[command(subcommand)]
    Token(TokenCommand),
    /// Show where settings are read from and what is missing
    Config,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Which workspace to show
    #[arg(long, short, default_value = "all", value_parser = parse_filter)]
    pub filter: TodoFilter,

    /// Only todos whose title contains this text
    #[arg(long, short)]
    pub search: Option<String>,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long, short, default_value = "personal", value_parser = parse_workspace)]
    pub workspace: Workspace,

    #[arg(long, short)]
    pub title: String,

    #[arg(long, short)]
    pub description: Option<String>,

    /// YYYY-MM-DD, today, tomorrow or next-monday
    #[arg(long, value_parser = parse_due)]
    pub due: Option<String>,

    /// MUY ALTA, Alta, Media, Baja or Delegar
    #[arg(long, short, value_parser = parse_priority)]
    pub priority: Option<Priority>,
}

#[derive(Debug, Args)]
pub struct QuickAddArgs {
    /// What to do, e.g. "llamar al banco mañana, urgente"
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,

    /// Create without asking for confirmation
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Page id as shown by `list`
    pub id: String,

    #[arg(long, short, value_parser = parse_workspace)]
    pub workspace: Workspace,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[arg(long, short)]
    pub title: Option<String>,

    #[arg(long, short)]
    pub description: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    #[arg(long, value_parser = parse_due)]
    pub due: Option<String>,

    #[arg(long, short, value_parser = parse_priority)]
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PostponeTarget {
    Tomorrow,
    NextMonday,
}

#[derive(Debug, Args)]
pub struct PostponeArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[arg(long, value_enum, default_value = "tomorrow")]
    pub to: PostponeTarget,
}

#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Store a token for a workspace
    Set {
        #[arg(value_parser = parse_workspace)]
        workspace: Workspace,
        token: String,
    },
    /// Remove a stored token
    Clear {
        #[arg(value_parser = parse_workspace)]
        workspace: Workspace,
    },
    /// Show which workspaces have a stored token
    Status,
}

pub fn parse_workspace(raw: &str) -> Result<Workspace, String> {
    Workspace::parse(&raw.trim().to_ascii_lowercase())
        .ok_or_else(|| format!("unknown workspace '{raw}', expected personal or work"))
}

pub fn parse_filter(raw: &str) -> Result<TodoFilter, String> {
    let wanted = raw.trim().to_ascii_lowercase();
    TodoFilter::ALL
        .into_iter()
        .find(|filter| filter.as_str() == wanted)
        .ok_or_else(|| format!("unknown filter '{raw}', expected all, personal or work"))
}

/// Accepts the exact labels case-insensitively, plus `muy-alta`.
pub fn parse_priority(raw: &str) -> Result<Priority, String> {
    let wanted = raw.trim().replace(['-', '_'], " ");
    Priority::ALL
        .into_iter()
        .find(|priority| priority.as_str().eq_ignore_ascii_case(&wanted))
        .ok_or_else(|| {
            let labels: Vec<&str> = Priority::ALL.iter().map(|p| p.as_str()).collect();
            format!("unknown priority '{raw}', expected one of: {}", labels.join(", "))
        })
}

pub fn parse_due(raw: &str) -> Result<String, String> {
    let today = dates::today_local();
    let date = match raw.trim().to_ascii_lowercase().as_str() {
        "today" => today,
        "tomorrow" => dates::tomorrow_from(today),
        "next-monday" | "monday" => dates::next_monday_from(today),
        other => chrono::NaiveDate::parse_from_str(other, "%Y-%m-%d")
            .map_err(|_| format!("invalid date '{raw}', expected YYYY-MM-DD"))?,
    };
    Ok(dates::format_local_date(date))
}
