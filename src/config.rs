use crate::assistant::Creativity;
use crate::credentials::CredentialStore;
use crate::errors::{AppError, AppResult};
use crate::models::Workspace;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "notion-todos";
pub const CONFIG_PATH_ENV: &str = "NOTION_TODOS_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "snake_case")]
pub struct WorkspaceSettings {
    pub database_id: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "snake_case")]
pub struct BackendSettings {
    pub base_url: String,
    pub notion_version: String,
    pub request_timeout_secs: u64,
    pub max_pages: u32,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.notion.com/v1".to_string(),
            notion_version: "2022-06-28".to_string(),
            request_timeout_secs: 30,
            max_pages: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "snake_case")]
pub struct AssistantSettings {
    pub program: String,
    pub args: Vec<String>,
    pub timeout_secs: u64,
    pub creativity: Creativity,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            program: "claude".to_string(),
            args: vec!["-p".to_string()],
            timeout_secs: 60,
            creativity: Creativity::Low,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "snake_case")]
pub struct Settings {
    pub personal: WorkspaceSettings,
    pub work: WorkspaceSettings,
    pub backend: BackendSettings,
    pub assistant: AssistantSettings,
}

/// Credential pair for one workspace. Only constructed when both halves are present.
#[derive(Clone, PartialEq, Eq)]
pub struct WorkspaceCredentials {
    pub workspace: Workspace,
    pub database_id: String,
    pub token: String,
}

impl std::fmt::Debug for WorkspaceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceCredentials")
            .field("workspace", &self.workspace)
            .field("database_id", &self.database_id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("config.yaml"))
    }

    /// Reads the YAML file at `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&raw)?)
    }

    /// Applies `NOTION_TODOS_<WORKSPACE>_{TOKEN,DATABASE_ID}` overrides from `lookup`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for workspace in Workspace::ALL {
            let prefix = format!("NOTION_TODOS_{}", workspace.as_str().to_ascii_uppercase());
            let target = self.workspace_mut(workspace);
            if let Some(token) = non_empty(lookup(&format!("{prefix}_TOKEN"))) {
                target.token = Some(token);
            }
            if let Some(database_id) = non_empty(lookup(&format!("{prefix}_DATABASE_ID"))) {
                target.database_id = Some(database_id);
            }
        }
    }

    /// Fills tokens that are still missing from the OS keychain.
    pub fn fill_tokens_from(&mut self, credentials: &dyn CredentialStore) {
        for workspace in Workspace::ALL {
            if non_empty(self.workspace(workspace).token.clone()).is_some() {
                continue;
            }
            match credentials.get_token(workspace) {
                Ok(Some(token)) => self.workspace_mut(workspace).token = Some(token),
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(workspace = %workspace, error = %error, "keychain lookup failed");
                }
            }
        }
    }

    pub fn workspace(&self, workspace: Workspace) -> &WorkspaceSettings {
        match workspace {
            Workspace::Personal => &self.personal,
            Workspace::Work => &self.work,
        }
    }

    fn workspace_mut(&mut self, workspace: Workspace) -> &mut WorkspaceSettings {
        match workspace {
            Workspace::Personal => &mut self.personal,
            Workspace::Work => &mut self.work,
        }
    }

    /// Labels of required values that are missing, in display order.
    pub fn missing_settings(&self) -> Vec<String> {
        Workspace::ALL
            .into_iter()
            .flat_map(|workspace| self.missing_for(workspace))
            .collect()
    }

    pub fn missing_for(&self, workspace: Workspace) -> Vec<String> {
        let settings = self.workspace(workspace);
        let mut missing = Vec::new();
        if non_empty(settings.token.clone()).is_none() {
            missing.push(format!("{} Notion Token", workspace.label()));
        }
        if non_empty(settings.database_id.clone()).is_none() {
            missing.push(format!("{} Database ID", workspace.label()));
        }
        missing
    }

    pub fn credentials(&self, workspace: Workspace) -> AppResult<WorkspaceCredentials> {
        let settings = self.workspace(workspace);
        match (
            non_empty(settings.token.clone()),
            non_empty(settings.database_id.clone()),
        ) {
            (Some(token), Some(database_id)) => Ok(WorkspaceCredentials {
                workspace,
                database_id,
                token,
            }),
            _ => Err(AppError::Config(format!(
                "Missing required settings: {}",
                self.missing_for(workspace).join(", ")
            ))),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
