use crate::backend::properties::{PropertyPatch, PropertyValue};
use crate::backend::{PageRecord, PageUpdate, RemoteStore};
use crate::errors::{AppError, AppResult};
use crate::mapper::map_record_to_todo;
use crate::models::{CreateOutcome, CreateTodoInput, Todo, TodoUpdate, Workspace};
use crate::schema::FieldSchema;
use std::sync::Arc;

/// Todo operations against one workspace's database.
///
/// A store is built from exactly one credential pair and its `RemoteStore` carries that
/// credential, so requests for one workspace can never reach the other's database.
#[derive(Clone)]
pub struct WorkspaceStore {
    workspace: Workspace,
    database_id: String,
    schema: &'static FieldSchema,
    remote: Arc<dyn RemoteStore>,
    max_pages: u32,
}

impl WorkspaceStore {
    pub fn new(
        workspace: Workspace,
        database_id: impl Into<String>,
        remote: Arc<dyn RemoteStore>,
        max_pages: u32,
    ) -> Self {
        Self {
            workspace,
            database_id: database_id.into(),
            schema: FieldSchema::for_workspace(workspace),
            remote,
            max_pages: max_pages.max(1),
        }
    }

    pub fn workspace(&self) -> Workspace {
        self.workspace
    }

    /// All non-archived todos, newest first as the backend returns them.
    pub async fn fetch_all(&self) -> AppResult<Vec<Todo>> {
        let mut todos = Vec::new();
        let mut cursor: Option<String> = None;

        for page_number in 1..=self.max_pages {
            let page = self
                .remote
                .query_database(&self.database_id, cursor.as_deref())
                .await
                .inspect_err(|error| {
                    tracing::warn!(workspace = %self.workspace, error = %error, "todo query failed");
                })?;

            for raw in page.results {
                match serde_json::from_value::<PageRecord>(raw) {
                    Ok(record) => todos.push(map_record_to_todo(&record, self.schema, self.workspace)),
                    Err(error) => {
                        tracing::warn!(workspace = %self.workspace, error = %error, "skipping unreadable record");
                    }
                }
            }

            match (page.has_more, page.next_cursor) {
                (true, Some(next)) => {
                    if page_number == self.max_pages {
                        tracing::warn!(
                            workspace = %self.workspace,
                            pages = self.max_pages,
                            "page limit reached, later todos were not loaded"
                        );
                    }
                    cursor = Some(next);
                }
                _ => break,
            }
        }

        tracing::info!(workspace = %self.workspace, count = todos.len(), "fetched todos");
        Ok(todos)
    }

    pub fn build_create_patch(&self, input: &CreateTodoInput) -> PropertyPatch {
        let mut patch = PropertyPatch::new();
        patch.set(self.schema.title, PropertyValue::Title(input.title.clone()));
        patch.set(self.schema.done, PropertyValue::Checkbox(false));
        if let Some(description) = present(&input.description) {
            patch.set(self.schema.notes, PropertyValue::RichText(description.to_string()));
        }
        if let Some(due_date) = present(&input.due_date) {
            patch.set(self.schema.date, PropertyValue::Date(due_date.to_string()));
        }
        if let Some(priority) = input.priority {
            patch.set(self.schema.priority, PropertyValue::Select(priority.as_str().to_string()));
        }
        patch
    }

    /// Only present, non-empty values are written. `notes` is applied after
    /// `description` since both land in the notes field.
    pub fn build_update_patch(&self, update: &TodoUpdate) -> PropertyPatch {
        let mut patch = PropertyPatch::new();
        if let Some(title) = present(&update.title) {
            patch.set(self.schema.title, PropertyValue::Title(title.to_string()));
        }
        if let Some(priority) = update.priority {
            patch.set(self.schema.priority, PropertyValue::Select(priority.as_str().to_string()));
        }
        if let Some(description) = present(&update.description) {
            patch.set(self.schema.notes, PropertyValue::RichText(description.to_string()));
        }
        if let Some(notes) = present(&update.notes) {
            patch.set(self.schema.notes, PropertyValue::RichText(notes.to_string()));
        }
        if let Some(due_date) = present(&update.due_date) {
            patch.set(self.schema.date, PropertyValue::Date(due_date.to_string()));
        }
        patch
    }

    pub async fn create(&self, input: &CreateTodoInput) -> CreateOutcome {
        if input.title.trim().is_empty() {
            return CreateOutcome::Failed {
                error: AppError::Validation("Title is required".to_string()).user_message(),
            };
        }

        let patch = self.build_create_patch(input);
        match self.remote.create_page(&self.database_id, &patch).await {
            Ok(page) => {
                tracing::info!(workspace = %self.workspace, page_id = %page.id, "created todo");
                CreateOutcome::Created { page_id: page.id }
            }
            Err(error) => {
                tracing::warn!(workspace = %self.workspace, error = %error, "failed to create todo");
                CreateOutcome::Failed {
                    error: error.user_message(),
                }
            }
        }
    }

    pub async fn update(&self, page_id: &str, update: &TodoUpdate) -> bool {
        let patch = self.build_update_patch(update);
        self.send_update(page_id, PageUpdate::properties(patch), "update todo")
            .await
    }

    pub async fn complete(&self, page_id: &str) -> bool {
        let mut patch = PropertyPatch::new();
        patch.set(self.schema.done, PropertyValue::Checkbox(true));
        self.send_update(page_id, PageUpdate::properties(patch), "mark todo completed")
            .await
    }

    /// Soft delete: the page is archived and drops out of later queries.
    pub async fn archive(&self, page_id: &str) -> bool {
        self.send_update(page_id, PageUpdate::archive(), "delete todo").await
    }

    async fn send_update(&self, page_id: &str, update: PageUpdate, action: &str) -> bool {
        match self.remote.update_page(page_id, &update).await {
            Ok(()) => {
                tracing::info!(workspace = %self.workspace, page_id, action, "todo updated");
                true
            }
            Err(error) => {
                tracing::warn!(workspace = %self.workspace, page_id, action, error = %error, "todo update failed");
                false
            }
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}
