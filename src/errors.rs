use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("CONFIG_MISSING: {0}")]
    Config(String),
    #[error("VALIDATION: {0}")]
    Validation(String),
    #[error("UNAUTHORIZED: {0}")]
    Unauthorized(String),
    #[error("TRANSPORT: {0}")]
    Transport(String),
    #[error("BACKEND: {status} {message}")]
    Backend { status: u16, message: String },
    #[error("ASSISTANT_PARSE: {0}")]
    AssistantParse(String),
    #[error("ASSISTANT: {0}")]
    Assistant(String),
    #[error("IO_FAILURE: {0}")]
    Io(String),
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl AppError {
    /// Message without the code prefix, for display next to a failed action.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized(_) => {
                "Unauthorized: Check your Notion token and database sharing.".to_string()
            }
            Self::Backend { message, .. } => message.clone(),
            Self::Config(message)
            | Self::Validation(message)
            | Self::Transport(message)
            | Self::AssistantParse(message)
            | Self::Assistant(message)
            | Self::Io(message)
            | Self::Internal(message) => message.clone(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Config(value.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
