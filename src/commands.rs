use crate::cli::{
    AddArgs, Cli, Command, EditArgs, ListArgs, PostponeArgs, PostponeTarget, QuickAddArgs, TargetArgs,
    TokenCommand,
};
use crate::config::Settings;
use crate::credentials::{CredentialStore, KeyringCredentials};
use crate::dates;
use crate::errors::{AppError, AppResult};
use crate::models::{
    BooleanResponse, CreateOutcome, CreateTodoInput, ParsedTodo, Todo, TodoGroup, TodoUpdate, Workspace,
    WorkspaceFailure,
};
use crate::projection;
use crate::service::TodoService;
use crate::to_client_error;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListOutput {
    groups: Vec<TodoGroup>,
    failures: Vec<WorkspaceFailure>,
}

pub async fn execute(cli: Cli) -> Result<(), String> {
    let Cli { config, json, command } = cli;
    let credentials = KeyringCredentials::new();

    match command {
        Command::Token(token) => token_command(&credentials, token, json),
        Command::Config => {
            let (path, settings) = load_settings(config, &credentials).map_err(to_client_error)?;
            show_config(&path, &settings, json)
        }
        other => {
            let (path, settings) = load_settings(config, &credentials).map_err(to_client_error)?;
            tracing::debug!(path = %path.display(), "settings loaded");
            let service = TodoService::from_settings(&settings);
            dispatch(&service, other, json, dates::today_local()).await
        }
    }
}

/// File settings, then `NOTION_TODOS_*` variables, then keychain tokens for whatever is
/// still missing.
pub fn load_settings(
    path_override: Option<PathBuf>,
    credentials: &dyn CredentialStore,
) -> AppResult<(PathBuf, Settings)> {
    let path = path_override
        .or_else(Settings::default_path)
        .ok_or_else(|| AppError::Config("Could not determine the config directory".to_string()))?;
    let mut settings = Settings::load_from(&path)?;
    settings.apply_env_overrides(|key| std::env::var(key).ok());
    settings.fill_tokens_from(credentials);
    Ok((path, settings))
}

pub async fn dispatch(
    service: &TodoService,
    command: Command,
    json: bool,
    today: NaiveDate,
) -> Result<(), String> {
    match command {
        Command::List(args) => list(service, args, json, today).await,
        Command::Add(args) => add(service, args, json).await,
        Command::QuickAdd(args) => quick_add(service, args, json, today).await,
        Command::Edit(args) => edit(service, args, json).await,
        Command::Done(TargetArgs { id, workspace }) => {
            let success = service.complete(&id, workspace).await.map_err(to_client_error)?;
            report(success, json, format!("Completed {id}"), format!("Could not complete {id}"))
        }
        Command::Delete(TargetArgs { id, workspace }) => {
            let success = service.delete(&id, workspace).await.map_err(to_client_error)?;
            report(success, json, format!("Deleted {id}"), format!("Could not delete {id}"))
        }
        Command::Postpone(args) => postpone(service, args, json).await,
        Command::Token(_) | Command::Config => Ok(()),
    }
}

async fn list(service: &TodoService, args: ListArgs, json: bool, today: NaiveDate) -> Result<(), String> {
    let load = service.load_all().await;
    for failure in &load.failures {
        tracing::warn!(workspace = %failure.workspace, message = %failure.message, "workspace load failed");
        eprintln!("warning: {}: {}", failure.workspace.label(), failure.message);
    }
    if load.failures.len() == Workspace::ALL.len() {
        return Err("Could not load any workspace".to_string());
    }

    let todos = projection::search(load.todos, args.search.as_deref());
    let groups = service.project(&todos, args.filter, today);
    tracing::info!(filter = args.filter.as_str(), groups = groups.len(), "listing todos");
    if json {
        return print_json(&ListOutput {
            groups,
            failures: load.failures,
        });
    }
    print!("{}", render_groups(&groups, today));
    Ok(())
}

async fn add(service: &TodoService, args: AddArgs, json: bool) -> Result<(), String> {
    let input = CreateTodoInput {
        title: args.title,
        description: args.description,
        due_date: args.due,
        priority: args.priority,
    };
    create(service, args.workspace, &input, json).await
}

async fn quick_add(
    service: &TodoService,
    args: QuickAddArgs,
    json: bool,
    today: NaiveDate,
) -> Result<(), String> {
    let text = args.text.join(" ");
    let parsed = service
        .parse_quick_add(&text, today)
        .await
        .map_err(to_client_error)?;
    eprint!("{}", render_parsed(&parsed, today));

    if !args.yes && !confirm("Create this todo?").await.map_err(to_client_error)? {
        eprintln!("Cancelled");
        return Ok(());
    }
    let (workspace, input) = parsed.into_create_input();
    create(service, workspace, &input, json).await
}

async fn create(
    service: &TodoService,
    workspace: Workspace,
    input: &CreateTodoInput,
    json: bool,
) -> Result<(), String> {
    if dates::is_overdue(input.due_date.as_deref()) {
        eprintln!("warning: due date {} is already past", input.due_date.as_deref().unwrap_or_default());
    }
    let outcome = service.create(workspace, input).await.map_err(to_client_error)?;
    if json {
        print_json(&outcome)?;
    }
    match outcome {
        CreateOutcome::Created { page_id } => {
            if !json {
                println!("Created \"{}\" in {} ({page_id})", input.title, workspace.label());
            }
            Ok(())
        }
        CreateOutcome::Failed { error } => Err(error),
    }
}

async fn edit(service: &TodoService, args: EditArgs, json: bool) -> Result<(), String> {
    let update = TodoUpdate {
        title: args.title,
        description: args.description,
        notes: args.notes,
        due_date: args.due,
        priority: args.priority,
    };
    if update == TodoUpdate::default() {
        return Err("Nothing to update".to_string());
    }
    let TargetArgs { id, workspace } = args.target;
    let success = service
        .update(&id, workspace, &update)
        .await
        .map_err(to_client_error)?;
    report(success, json, format!("Updated {id}"), format!("Could not update {id}"))
}

async fn postpone(service: &TodoService, args: PostponeArgs, json: bool) -> Result<(), String> {
    let TargetArgs { id, workspace } = args.target;
    let (result, when) = match args.to {
        PostponeTarget::Tomorrow => (service.move_to_tomorrow(&id, workspace).await, "tomorrow"),
        PostponeTarget::NextMonday => (service.move_to_next_monday(&id, workspace).await, "next Monday"),
    };
    let success = result.map_err(to_client_error)?;
    report(success, json, format!("Moved {id} to {when}"), format!("Could not move {id}"))
}

fn token_command(credentials: &dyn CredentialStore, command: TokenCommand, json: bool) -> Result<(), String> {
    match command {
        TokenCommand::Set { workspace, token } => {
            credentials
                .save_token(workspace, &token)
                .map_err(to_client_error)?;
            let kept = credentials
                .get_token(workspace)
                .map_err(to_client_error)?
                .is_some();
            if !kept {
                return Err(format!(
                    "The OS keychain did not keep the {} token",
                    workspace.label()
                ));
            }
            report(true, json, format!("Saved {} token", workspace.label()), String::new())
        }
        TokenCommand::Clear { workspace } => {
            let removed = credentials.clear_token(workspace).map_err(to_client_error)?;
            if json {
                return print_json(&BooleanResponse { success: removed });
            }
            if removed {
                println!("Removed {} token", workspace.label());
            } else {
                println!("No {} token was stored", workspace.label());
            }
            Ok(())
        }
        TokenCommand::Status => {
            let mut statuses = Vec::new();
            for workspace in Workspace::ALL {
                let stored = credentials
                    .get_token(workspace)
                    .map_err(to_client_error)?
                    .is_some();
                statuses.push((workspace, stored));
            }
            if json {
                let value: serde_json::Map<String, serde_json::Value> = statuses
                    .iter()
                    .map(|(workspace, stored)| (workspace.as_str().to_string(), json!(stored)))
                    .collect();
                return print_json(&value);
            }
            for (workspace, stored) in statuses {
                let state = if stored { "stored" } else { "not stored" };
                println!("{}: {state}", workspace.label());
            }
            Ok(())
        }
    }
}

fn show_config(path: &std::path::Path, settings: &Settings, json: bool) -> Result<(), String> {
    let missing = settings.missing_settings();
    if json {
        return print_json(&json!({
            "path": path.display().to_string(),
            "missing": missing,
        }));
    }
    println!("Config file: {}", path.display());
    if missing.is_empty() {
        println!("All required settings are present");
    } else {
        println!("Missing required settings: {}", missing.join(", "));
    }
    Ok(())
}

fn report(success: bool, json: bool, done: String, failed: String) -> Result<(), String> {
    if json {
        print_json(&BooleanResponse { success })?;
    }
    if !success {
        return Err(failed);
    }
    if !json {
        println!("{done}");
    }
    Ok(())
}

fn print_json(value: &impl Serialize) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|error| to_client_error(error.into()))?;
    println!("{text}");
    Ok(())
}

async fn confirm(question: &str) -> AppResult<bool> {
    eprint!("{question} [y/N] ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(matches!(
        line.trim().to_lowercase().as_str(),
        "y" | "yes" | "s" | "si" | "sí"
    ))
}

fn visual_due(due_date: &str, today: NaiveDate) -> String {
    dates::parse_due_date(due_date)
        .map(|date| dates::format_visual_date(date, today))
        .unwrap_or_else(|| due_date.to_string())
}

pub fn render_todo_line(todo: &Todo, today: NaiveDate) -> String {
    let marker = if dates::is_overdue_on(todo.due_date.as_deref(), today) {
        '!'
    } else {
        '-'
    };
    let mut details = vec![todo.workspace.as_str().to_string()];
    if let Some(priority) = todo.priority {
        details.push(priority.as_str().to_string());
    }
    if let Some(due_date) = todo.due_date.as_deref() {
        details.push(visual_due(due_date, today));
    }
    let mut line = format!("  {marker} {}  ({})  {}", todo.title, details.join(" · "), todo.id);
    if let Some(notes) = todo.notes.as_deref().map(str::trim).filter(|notes| !notes.is_empty()) {
        let notes: Vec<&str> = notes.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        line.push_str("\n    ");
        line.push_str(&notes.join(" / "));
    }
    line
}

pub fn render_groups(groups: &[TodoGroup], today: NaiveDate) -> String {
    if groups.is_empty() {
        return "No open todos\n".to_string();
    }
    let mut out = String::new();
    for group in groups {
        out.push_str(&format!("{} ({})\n", group.group.title(), group.todos.len()));
        for todo in &group.todos {
            out.push_str(&render_todo_line(todo, today));
            out.push('\n');
        }
    }
    out
}

pub fn render_parsed(parsed: &ParsedTodo, today: NaiveDate) -> String {
    let mut out = format!("Title:       {}\nWorkspace:   {}\n", parsed.title, parsed.workspace.label());
    if let Some(due_date) = parsed.due_date.as_deref() {
        out.push_str(&format!("Due:         {}\n", visual_due(due_date, today)));
    }
    if let Some(priority) = parsed.priority {
        out.push_str(&format!("Priority:    {priority}\n"));
    }
    if let Some(description) = parsed.description.as_deref() {
        out.push_str(&format!("Description: {description}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::QueryPage;
    use crate::cli::ListArgs;
    use crate::credentials::testing::MemoryCredentials;
    use crate::models::{Priority, TodoDateGroup, TodoFilter};
    use crate::store::testing::{Call, FakeRemote};
    use crate::store::WorkspaceStore;
    use serde_json::json;
    use std::sync::Arc;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn todo(id: &str, due_date: Option<&str>, priority: Option<Priority>) -> Todo {
        Todo {
            id: id.to_string(),
            title: format!("Task {id}"),
            description: None,
            done: false,
            due_date: due_date.map(str::to_string),
            priority,
            notes: None,
            workspace: Workspace::Work,
            url: String::new(),
        }
    }

    #[test]
    fn renders_overdue_marker_and_details() {
        let today = ymd(2025, 6, 10);
        let line = render_todo_line(&todo("a", Some("2025-06-01"), Some(Priority::Alta)), today);
        assert_eq!(line, "  ! Task a  (work · Alta · 1 June)  a");

        let line = render_todo_line(&todo("b", Some("2026-01-05"), None), today);
        assert_eq!(line, "  - Task b  (work · 5 January 2026)  b");
    }

    #[test]
    fn renders_notes_below_the_title() {
        let today = ymd(2025, 6, 10);
        let mut with_notes = todo("n", None, None);
        with_notes.notes = Some("bring receipts\nask about fees ".to_string());
        assert_eq!(
            render_todo_line(&with_notes, today),
            "  - Task n  (work)  n\n    bring receipts / ask about fees"
        );

        with_notes.notes = Some("   ".to_string());
        assert_eq!(render_todo_line(&with_notes, today), "  - Task n  (work)  n");
    }

    #[test]
    fn renders_groups_with_counts() {
        let today = ymd(2025, 6, 10);
        let groups = vec![TodoGroup {
            group: TodoDateGroup::NoDate,
            todos: vec![todo("c", None, None)],
        }];
        assert_eq!(render_groups(&groups, today), "No Date (1)\n  - Task c  (work)  c\n");
        assert_eq!(render_groups(&[], today), "No open todos\n");
    }

    #[test]
    fn renders_parsed_preview() {
        let parsed = ParsedTodo {
            title: "Call mom".to_string(),
            workspace: Workspace::Personal,
            description: None,
            due_date: Some("2025-06-11".to_string()),
            priority: Some(Priority::MuyAlta),
        };
        let preview = render_parsed(&parsed, ymd(2025, 6, 10));
        assert!(preview.contains("Workspace:   Personal"));
        assert!(preview.contains("Due:         11 June"));
        assert!(preview.contains("Priority:    MUY ALTA"));
        assert!(!preview.contains("Description"));
    }

    #[test]
    fn load_settings_prefers_stored_token_only_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "personal:\n  database_id: db-p\n  token: file-token\nwork:\n  database_id: db-w\n",
        )
        .expect("write config");
        let credentials = MemoryCredentials::default();
        credentials.save_token(Workspace::Personal, "keychain-p").expect("save");
        credentials.save_token(Workspace::Work, "keychain-w").expect("save");

        let (loaded_path, settings) = load_settings(Some(path.clone()), &credentials).expect("load");
        assert_eq!(loaded_path, path);
        assert_eq!(settings.personal.token.as_deref(), Some("file-token"));
        assert_eq!(settings.work.token.as_deref(), Some("keychain-w"));
    }

    struct ForgetfulCredentials;

    impl CredentialStore for ForgetfulCredentials {
        fn get_token(&self, _workspace: Workspace) -> AppResult<Option<String>> {
            Ok(None)
        }

        fn save_token(&self, _workspace: Workspace, _token: &str) -> AppResult<()> {
            Ok(())
        }

        fn clear_token(&self, _workspace: Workspace) -> AppResult<bool> {
            Ok(false)
        }
    }

    #[test]
    fn token_set_fails_when_the_keychain_drops_the_token() {
        let command = || TokenCommand::Set {
            workspace: Workspace::Work,
            token: "secret_value".to_string(),
        };
        let error = token_command(&ForgetfulCredentials, command(), false).expect_err("not kept");
        assert_eq!(error, "The OS keychain did not keep the Work token");

        let credentials = MemoryCredentials::default();
        token_command(&credentials, command(), false).expect("kept");
        assert_eq!(
            credentials.get_token(Workspace::Work).expect("get"),
            Some("secret_value".to_string())
        );
    }

    #[tokio::test]
    async fn edit_without_fields_is_rejected_before_any_call() {
        let remote = Arc::new(FakeRemote::default());
        let store = WorkspaceStore::new(Workspace::Work, "db-w".to_string(), remote.clone(), 3);
        let service = TodoService::from_stores(None, Some(store), None);
        let command = Command::Edit(EditArgs {
            target: TargetArgs {
                id: "w1".to_string(),
                workspace: Workspace::Work,
            },
            title: None,
            description: None,
            notes: None,
            due: None,
            priority: None,
        });

        let error = dispatch(&service, command, false, ymd(2025, 6, 10))
            .await
            .expect_err("empty edit");
        assert_eq!(error, "Nothing to update");
        assert!(remote.calls().is_empty());
    }

    #[tokio::test]
    async fn list_fails_only_when_every_workspace_fails() {
        let remote = Arc::new(FakeRemote::with_pages(vec![QueryPage {
            results: vec![json!({ "id": "w1", "properties": {} })],
            has_more: false,
            next_cursor: None,
        }]));
        let store = WorkspaceStore::new(Workspace::Work, "db-w".to_string(), remote.clone(), 3);
        let service = TodoService::from_stores(None, Some(store), None);
        let list = |filter| {
            Command::List(ListArgs {
                filter,
                search: None,
            })
        };

        dispatch(&service, list(TodoFilter::All), true, ymd(2025, 6, 10))
            .await
            .expect("work still loads");
        assert_eq!(
            remote.calls(),
            vec![Call::Query {
                database_id: "db-w".to_string(),
                cursor: None
            }]
        );

        let empty = TodoService::from_stores(None, None, None);
        let error = dispatch(&empty, list(TodoFilter::All), false, ymd(2025, 6, 10))
            .await
            .expect_err("nothing configured");
        assert_eq!(error, "Could not load any workspace");
    }

    #[tokio::test]
    async fn unconfigured_workspace_surfaces_config_message() {
        let service = TodoService::from_stores(None, None, None);
        let command = Command::Done(TargetArgs {
            id: "p1".to_string(),
            workspace: Workspace::Personal,
        });
        let error = dispatch(&service, command, false, ymd(2025, 6, 10))
            .await
            .expect_err("not configured");
        assert!(error.contains("not configured"), "{error}");
    }
}
