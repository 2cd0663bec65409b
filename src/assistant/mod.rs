pub mod command;

use crate::dates;
use crate::errors::{AppError, AppResult};
use crate::models::{ParsedTodo, Priority, Workspace};
use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Sampling hint forwarded to the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Creativity {
    #[default]
    Low,
    Medium,
    High,
}

impl Creativity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Free-text model that answers a prompt. Its output is untrusted.
#[async_trait]
pub trait TodoAssistant: Send + Sync {
    async fn ask(&self, prompt: &str, creativity: Creativity) -> AppResult<String>;
}

const PROMPT_TEMPLATE: &str = r#"You are a todo parser. Extract todo information from the user's natural language input.
Today's date is {today}.

Return ONLY a valid JSON object with these fields:
- title (required): The main task description, clean and concise
- workspace: Either "personal" or "work". Default to "personal" if not specified. Look for keywords like "work", "office", "job", "trabajo", "oficina" for work tasks.
- description: Any additional notes or context (optional)
- dueDate: ISO date string (YYYY-MM-DD) if a date is mentioned. Interpret relative dates like "tomorrow", "next Monday", "mañana", "próximo lunes" based on today's date.
- priority: One of "MUY ALTA", "Alta", "Media", "Baja", "Delegar" if priority is mentioned. Map terms like:
  - "urgent", "urgente", "very high", "muy alta", "asap" → "MUY ALTA"
  - "high", "alta", "important", "importante" → "Alta"
  - "medium", "media", "normal" → "Media"
  - "low", "baja", "not urgent", "no urgente" → "Baja"
  - "delegate", "delegar" → "Delegar"

Understand both English and Spanish input.

User input: "#;

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```(?:json)?\n?").expect("valid regex"));

static REPLY_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string", "minLength": 1 }
        },
        "required": ["title"]
    })
});

pub fn build_prompt(today: NaiveDate, user_input: &str) -> String {
    let mut prompt = PROMPT_TEMPLATE.replace("{today}", &dates::format_local_date(today));
    prompt.push_str(user_input);
    prompt
}

/// Removes markdown code fences the model may wrap its JSON in.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    CODE_FENCE.replace_all(trimmed, "").trim().to_string()
}

fn parse_json_object(raw: &str) -> Option<Value> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return Some(value);
    }
    // Tolerate prose around a single object.
    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&cleaned[start..=end]).ok()
}

fn validate_reply_shape(value: &Value) -> AppResult<()> {
    let compiled = jsonschema::JSONSchema::compile(&REPLY_SCHEMA)
        .map_err(|error| AppError::Internal(format!("Invalid reply schema: {}", error)))?;
    let errors: Vec<String> = compiled
        .validate(value)
        .err()
        .map(|errors| errors.map(|error| error.to_string()).collect())
        .unwrap_or_default();
    if errors.is_empty() {
        return Ok(());
    }
    tracing::debug!(errors = ?errors, "assistant reply failed schema validation");
    Err(AppError::AssistantParse(
        "Could not extract a title from your input".to_string(),
    ))
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Turns an assistant reply into a [`ParsedTodo`].
///
/// `title` is required; an unknown `workspace` becomes personal; an unknown `priority`
/// or unreadable `dueDate` is dropped.
pub fn parse_reply(raw: &str) -> AppResult<ParsedTodo> {
    let value = parse_json_object(raw)
        .ok_or_else(|| AppError::AssistantParse("Reply was not valid JSON".to_string()))?;
    validate_reply_shape(&value)?;

    let title = string_field(&value, "title").ok_or_else(|| {
        AppError::AssistantParse("Could not extract a title from your input".to_string())
    })?;
    let workspace = value
        .get("workspace")
        .and_then(Value::as_str)
        .and_then(Workspace::parse)
        .unwrap_or(Workspace::Personal);
    let priority = value
        .get("priority")
        .and_then(Value::as_str)
        .and_then(Priority::from_label);
    let due_date = string_field(&value, "dueDate")
        .and_then(|raw| dates::parse_due_date(&raw))
        .map(dates::format_local_date);

    Ok(ParsedTodo {
        title,
        workspace,
        description: string_field(&value, "description"),
        due_date,
        priority,
    })
}

/// Asks the assistant about `user_input` and validates the answer.
pub async fn parse_todo(
    assistant: &dyn TodoAssistant,
    user_input: &str,
    today: NaiveDate,
    creativity: Creativity,
) -> AppResult<ParsedTodo> {
    if user_input.trim().is_empty() {
        return Err(AppError::Validation("Nothing to parse".to_string()));
    }
    let reply = assistant
        .ask(&build_prompt(today, user_input), creativity)
        .await?;
    parse_reply(&reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedAssistant(&'static str);

    #[async_trait]
    impl TodoAssistant for CannedAssistant {
        async fn ask(&self, prompt: &str, creativity: Creativity) -> AppResult<String> {
            assert!(prompt.contains("Today's date is 2025-06-01."));
            assert!(prompt.ends_with("User input: call mom tomorrow"));
            assert_eq!(creativity, Creativity::Low);
            Ok(self.0.to_string())
        }
    }

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn strips_fenced_json() {
        let raw = "```json\n{\"title\": \"Call mom\"}\n```";
        assert_eq!(strip_code_fences(raw), "{\"title\": \"Call mom\"}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn parses_full_reply() {
        let parsed = parse_reply(
            r#"```json
{"title": "Send report", "workspace": "work", "description": "Q3 numbers", "dueDate": "2025-06-02", "priority": "Alta"}
```"#,
        )
        .expect("parse");
        assert_eq!(
            parsed,
            ParsedTodo {
                title: "Send report".to_string(),
                workspace: Workspace::Work,
                description: Some("Q3 numbers".to_string()),
                due_date: Some("2025-06-02".to_string()),
                priority: Some(Priority::Alta),
            }
        );
    }

    #[test]
    fn defaults_workspace_and_drops_unknown_priority() {
        let parsed = parse_reply(r#"{"title": "Gym", "workspace": "Home", "priority": "urgent"}"#)
            .expect("parse");
        assert_eq!(parsed.workspace, Workspace::Personal);
        assert_eq!(parsed.priority, None);
        assert_eq!(parsed.description, None);
    }

    #[test]
    fn drops_unreadable_due_date() {
        let parsed = parse_reply(r#"{"title": "Gym", "dueDate": "next week"}"#).expect("parse");
        assert_eq!(parsed.due_date, None);
    }

    #[test]
    fn missing_title_is_a_parse_error() {
        for raw in [
            r#"{"workspace": "work"}"#,
            r#"{"title": ""}"#,
            r#"{"title": "   "}"#,
            r#"{"title": 42}"#,
        ] {
            let error = parse_reply(raw).expect_err("title required");
            assert!(matches!(error, AppError::AssistantParse(_)), "{raw}");
        }
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let error = parse_reply("Sure! I can't help with that.").expect_err("not json");
        assert!(error.to_string().starts_with("ASSISTANT_PARSE"));
    }

    #[test]
    fn tolerates_prose_around_object() {
        let parsed =
            parse_reply("Here you go: {\"title\": \"Water plants\"} Hope that helps").expect("parse");
        assert_eq!(parsed.title, "Water plants");
    }

    #[tokio::test]
    async fn parse_todo_sends_prompt_with_today() {
        let assistant = CannedAssistant(r#"{"title": "Call mom", "dueDate": "2025-06-02"}"#);
        let parsed = parse_todo(&assistant, "call mom tomorrow", ymd(2025, 6, 1), Creativity::Low)
            .await
            .expect("parse");
        assert_eq!(parsed.title, "Call mom");
        assert_eq!(parsed.due_date.as_deref(), Some("2025-06-02"));
    }

    #[tokio::test]
    async fn parse_todo_rejects_blank_input() {
        let assistant = CannedAssistant("{}");
        let error = parse_todo(&assistant, "  ", ymd(2025, 6, 1), Creativity::Low)
            .await
            .expect_err("blank input");
        assert!(matches!(error, AppError::Validation(_)));
    }
}
