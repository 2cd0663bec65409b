use crate::assistant::{self, command::CommandAssistant, Creativity, TodoAssistant};
use crate::backend::notion::NotionClient;
use crate::config::Settings;
use crate::dates;
use crate::errors::{AppError, AppResult};
use crate::models::{
    CreateOutcome, CreateTodoInput, ParsedTodo, Todo, TodoFilter, TodoGroup, TodoLoad, TodoUpdate,
    Workspace, WorkspaceFailure,
};
use crate::projection;
use crate::redaction::Redactor;
use crate::store::WorkspaceStore;
use chrono::NaiveDate;
use std::sync::Arc;

/// Entry point for the command surface: one store per configured workspace plus the
/// optional natural-language assistant.
#[derive(Clone)]
pub struct TodoService {
    personal: Result<WorkspaceStore, String>,
    work: Result<WorkspaceStore, String>,
    assistant: Option<Arc<dyn TodoAssistant>>,
    creativity: Creativity,
    redactor: Redactor,
}

impl TodoService {
    pub fn from_settings(settings: &Settings) -> Self {
        let build = |workspace: Workspace| -> Result<WorkspaceStore, String> {
            let credentials = settings
                .credentials(workspace)
                .map_err(|error| error.user_message())?;
            let client = NotionClient::new(&settings.backend, &credentials.token)
                .map_err(|error| error.user_message())?;
            Ok(WorkspaceStore::new(
                workspace,
                credentials.database_id,
                Arc::new(client),
                settings.backend.max_pages,
            ))
        };

        Self {
            personal: build(Workspace::Personal),
            work: build(Workspace::Work),
            assistant: Some(Arc::new(CommandAssistant::new(&settings.assistant))),
            creativity: settings.assistant.creativity,
            redactor: Redactor::new(true),
        }
    }

    pub fn from_stores(
        personal: Option<WorkspaceStore>,
        work: Option<WorkspaceStore>,
        assistant: Option<Arc<dyn TodoAssistant>>,
    ) -> Self {
        let slot = |store: Option<WorkspaceStore>, workspace: Workspace| {
            store.ok_or_else(|| format!("{} workspace is not configured", workspace.label()))
        };
        Self {
            personal: slot(personal, Workspace::Personal),
            work: slot(work, Workspace::Work),
            assistant,
            creativity: Creativity::default(),
            redactor: Redactor::new(true),
        }
    }

    /// Fails with a configuration error before any network call when the workspace
    /// lacks credentials.
    pub fn store(&self, workspace: Workspace) -> AppResult<&WorkspaceStore> {
        let slot = match workspace {
            Workspace::Personal => &self.personal,
            Workspace::Work => &self.work,
        };
        slot.as_ref()
            .map_err(|message| AppError::Config(message.clone()))
    }

    pub async fn fetch_all(&self, workspace: Workspace) -> AppResult<Vec<Todo>> {
        self.store(workspace)?.fetch_all().await
    }

    /// Loads both workspaces concurrently. A failing workspace is reported in
    /// `failures` without hiding the other workspace's todos.
    pub async fn load_all(&self) -> TodoLoad {
        let (personal, work) = tokio::join!(
            self.fetch_all(Workspace::Personal),
            self.fetch_all(Workspace::Work)
        );

        let mut load = TodoLoad::default();
        for (workspace, result) in [(Workspace::Personal, personal), (Workspace::Work, work)] {
            match result {
                Ok(todos) => load.todos.extend(todos),
                Err(error) => load.failures.push(WorkspaceFailure {
                    workspace,
                    message: self.redactor.redact(&error.user_message()).content,
                }),
            }
        }
        load
    }

    pub async fn create(&self, workspace: Workspace, input: &CreateTodoInput) -> AppResult<CreateOutcome> {
        Ok(self.store(workspace)?.create(input).await)
    }

    pub async fn update(&self, id: &str, workspace: Workspace, update: &TodoUpdate) -> AppResult<bool> {
        Ok(self.store(workspace)?.update(id, update).await)
    }

    pub async fn complete(&self, id: &str, workspace: Workspace) -> AppResult<bool> {
        Ok(self.store(workspace)?.complete(id).await)
    }

    pub async fn delete(&self, id: &str, workspace: Workspace) -> AppResult<bool> {
        Ok(self.store(workspace)?.archive(id).await)
    }

    pub async fn move_to_tomorrow(&self, id: &str, workspace: Workspace) -> AppResult<bool> {
        self.reschedule(id, workspace, dates::tomorrow()).await
    }

    pub async fn move_to_next_monday(&self, id: &str, workspace: Workspace) -> AppResult<bool> {
        self.reschedule(id, workspace, dates::next_monday()).await
    }

    async fn reschedule(&self, id: &str, workspace: Workspace, due_date: String) -> AppResult<bool> {
        self.update(id, workspace, &TodoUpdate::due_date(due_date)).await
    }

    pub fn project(&self, todos: &[Todo], filter: TodoFilter, today: NaiveDate) -> Vec<TodoGroup> {
        projection::project(todos, filter, today)
    }

    pub async fn parse_quick_add(&self, text: &str, today: NaiveDate) -> AppResult<ParsedTodo> {
        let assistant = self
            .assistant
            .as_ref()
            .ok_or_else(|| AppError::Config("No assistant configured".to_string()))?;
        assistant::parse_todo(assistant.as_ref(), text, today, self.creativity).await
    }
}
