use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

struct SecretPattern {
    regex: Regex,
    /// Capture group naming the secret, when the pattern is a `key=value` form.
    key_group: Option<usize>,
    label: &'static str,
}

static SECRET_PATTERNS: Lazy<Vec<SecretPattern>> = Lazy::new(|| {
    vec![
        SecretPattern {
            regex: Regex::new(r#"(?i)(api[_-]?key|token|secret|password)\s*[:=]\s*["']?([A-Za-z0-9_\-\.]{6,})["']?"#)
                .expect("valid regex"),
            key_group: Some(1),
            label: "secret",
        },
        SecretPattern {
            regex: Regex::new(r"(?i)\bbearer\s+[A-Za-z0-9_\-\.]{6,}").expect("valid regex"),
            key_group: None,
            label: "bearer",
        },
        SecretPattern {
            regex: Regex::new(r"\b(?:secret|ntn)_[A-Za-z0-9]{20,}\b").expect("valid regex"),
            key_group: None,
            label: "notion_token",
        },
    ]
});

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RedactionResult {
    pub content: String,
    pub redaction_count: usize,
}

/// Scrubs integration tokens out of text bound for logs or the terminal.
#[derive(Debug, Default, Clone)]
pub struct Redactor {
    aggressive: bool,
}

impl Redactor {
    pub fn new(aggressive: bool) -> Self {
        Self { aggressive }
    }

    pub fn redact(&self, input: &str) -> RedactionResult {
        if input.is_empty() {
            return RedactionResult {
                content: String::new(),
                redaction_count: 0,
            };
        }

        let mut result = input.to_string();
        let mut redaction_count = 0usize;

        if self.aggressive {
            let normalized = result
                .split(' ')
                .map(|token| {
                    if token.len() > 48 && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
                        redaction_count += 1;
                        "[REDACTED_LONG_TOKEN]".to_string()
                    } else {
                        token.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
            result = normalized;
        }

        for pattern in SECRET_PATTERNS.iter() {
            let matches = pattern.regex.find_iter(&result).count();
            if matches == 0 {
                continue;
            }

            redaction_count += matches;
            result = pattern
                .regex
                .replace_all(&result, |caps: &regex::Captures<'_>| {
                    let key = pattern
                        .key_group
                        .and_then(|group| caps.get(group))
                        .map(|m| m.as_str().to_ascii_lowercase())
                        .unwrap_or_else(|| pattern.label.to_string());
                    format!("{}=[REDACTED]", key)
                })
                .to_string();
        }

        RedactionResult {
            content: result,
            redaction_count,
        }
    }
}
