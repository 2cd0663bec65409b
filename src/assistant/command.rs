use super::{Creativity, TodoAssistant};
use crate::config::AssistantSettings;
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

pub const CREATIVITY_ENV: &str = "TODO_ASSISTANT_CREATIVITY";

static CLI_MISSING_PATTERNS: &[&str] = &[
    "not installed",
    "command not found",
    "no such file or directory",
    "is not recognized as an internal or external command",
];

pub fn is_cli_missing_line(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    CLI_MISSING_PATTERNS
        .iter()
        .any(|pattern| lower.contains(pattern))
}

/// Runs an external model CLI with the prompt on stdin and returns its stdout.
#[derive(Debug, Clone)]
pub struct CommandAssistant {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandAssistant {
    pub fn new(settings: &AssistantSettings) -> Self {
        Self {
            program: settings.program.clone(),
            args: settings.args.clone(),
            timeout: Duration::from_secs(settings.timeout_secs.max(1)),
        }
    }

    fn missing(&self) -> AppError {
        AppError::Assistant(format!(
            "Assistant program '{}' is not installed or not on PATH",
            self.program
        ))
    }
}

#[async_trait]
impl TodoAssistant for CommandAssistant {
    async fn ask(&self, prompt: &str, creativity: Creativity) -> AppResult<String> {
        if self.program.trim().is_empty() {
            return Err(AppError::Config("No assistant program configured".to_string()));
        }

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .env(CREATIVITY_ENV, creativity.as_str())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|error| {
            if error.kind() == std::io::ErrorKind::NotFound {
                self.missing()
            } else {
                AppError::Assistant(format!("Failed to start assistant: {}", error))
            }
        })?;

        // Writing the prompt and collecting output share one timeout.
        let stdin = child.stdin.take();
        let write_prompt = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(prompt.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };

        tracing::debug!(program = %self.program, creativity = creativity.as_str(), "waiting for assistant");
        let (written, output) = timeout(self.timeout, async {
            tokio::join!(write_prompt, child.wait_with_output())
        })
        .await
        .map_err(|_| {
            AppError::Assistant(format!(
                "Assistant did not answer within {}s",
                self.timeout.as_secs()
            ))
        })?;
        let output = output?;
        match written {
            Ok(()) => {}
            // The child quit without reading; its exit status and stderr are reported below.
            Err(error) if error.kind() == std::io::ErrorKind::BrokenPipe => {
                tracing::debug!(program = %self.program, "assistant closed stdin early");
            }
            Err(error) => return Err(error.into()),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.lines().any(is_cli_missing_line) {
                return Err(self.missing());
            }
            let detail = stderr.lines().rev().find(|line| !line.trim().is_empty()).unwrap_or("");
            return Err(AppError::Assistant(format!(
                "Assistant exited with {}: {}",
                output.status,
                detail.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
