use crate::errors::{AppError, AppResult};
use crate::models::Workspace;

const KEYRING_SERVICE: &str = "notion-todos";

pub trait CredentialStore: Send + Sync {
    fn get_token(&self, workspace: Workspace) -> AppResult<Option<String>>;
    fn save_token(&self, workspace: Workspace, token: &str) -> AppResult<()>;
    /// Returns whether a token was present.
    fn clear_token(&self, workspace: Workspace) -> AppResult<bool>;
}

/// Integration tokens kept in the OS keychain, one entry per workspace.
#[derive(Debug, Clone)]
pub struct KeyringCredentials {
    service: String,
}

impl Default for KeyringCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringCredentials {
    pub fn new() -> Self {
        Self::with_service(KEYRING_SERVICE)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, workspace: Workspace) -> AppResult<keyring::Entry> {
        keyring::Entry::new(&self.service, &entry_name(workspace))
            .map_err(|error| AppError::Io(error.to_string()))
    }
}

fn entry_name(workspace: Workspace) -> String {
    format!("{}-token", workspace.as_str())
}

impl CredentialStore for KeyringCredentials {
    fn get_token(&self, workspace: Workspace) -> AppResult<Option<String>> {
        match self.entry(workspace)?.get_password() {
            Ok(value) if !value.trim().is_empty() => Ok(Some(value)),
            Ok(_) => Ok(None),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(AppError::Io(error.to_string())),
        }
    }

    fn save_token(&self, workspace: Workspace, token: &str) -> AppResult<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::Validation("Token cannot be empty".to_string()));
        }
        self.entry(workspace)?
            .set_password(token)
            .map_err(|error| AppError::Io(error.to_string()))
    }

    fn clear_token(&self, workspace: Workspace) -> AppResult<bool> {
        match self.entry(workspace)?.delete_credential() {
            Ok(_) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(error) => Err(AppError::Io(error.to_string())),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MemoryCredentials;
    use super::*;
    use crate::config::Settings;

    #[test]
    fn keychain_fills_only_missing_tokens() {
        let store = MemoryCredentials::default();
        store
            .save_token(Workspace::Personal, "from-keychain")
            .expect("save personal");
        store
            .save_token(Workspace::Work, "keychain-work")
            .expect("save work");

        let mut settings = Settings::default();
        settings.work.token = Some("from-file".to_string());
        settings.fill_tokens_from(&store);

        assert_eq!(settings.personal.token.as_deref(), Some("from-keychain"));
        assert_eq!(settings.work.token.as_deref(), Some("from-file"));
    }

    #[test]
    fn clear_reports_presence() {
        let store = MemoryCredentials::default();
        assert!(!store.clear_token(Workspace::Work).expect("clear"));
        store.save_token(Workspace::Work, "tok").expect("save");
        assert!(store.clear_token(Workspace::Work).expect("clear"));
        assert_eq!(store.get_token(Workspace::Work).expect("get"), None);
    }

    #[test]
    #[ignore = "needs an unlocked OS keychain or secret service"]
    fn keychain_token_is_readable_from_a_fresh_entry() {
        let service = "notion-todos-test";
        let store = KeyringCredentials::with_service(service);
        store
            .save_token(Workspace::Work, "secret_roundtrip_value_123")
            .expect("save");

        let entry = keyring::Entry::new(service, &entry_name(Workspace::Work)).expect("entry");
        let stored = entry.get_password();
        let _ = store.clear_token(Workspace::Work);
        assert_eq!(stored.expect("read back"), "secret_roundtrip_value_123");
        assert_eq!(
            KeyringCredentials::with_service(service)
                .get_token(Workspace::Work)
                .expect("get after clear"),
            None
        );
    }
}
