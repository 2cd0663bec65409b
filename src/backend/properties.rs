//! Typed access to Notion page properties.
//!
//! Reads never fail: each reader validates the shape it expects and returns a default or
//! `None` on anything else. Writes go through [`PropertyValue`], which renders the exact
//! JSON shape the API expects for each property type.

use serde_json::{json, Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Title(String),
    RichText(String),
    Checkbox(bool),
    Select(String),
    Date(String),
}

impl PropertyValue {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Title(content) => json!({ "title": [{ "text": { "content": content } }] }),
            Self::RichText(content) => {
                json!({ "rich_text": [{ "text": { "content": content } }] })
            }
            Self::Checkbox(checked) => json!({ "checkbox": checked }),
            Self::Select(name) => json!({ "select": { "name": name } }),
            Self::Date(start) => json!({ "date": { "start": start } }),
        }
    }
}

/// Ordered set of property writes keyed by backend field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyPatch {
    entries: Vec<(String, PropertyValue)>,
}

impl PropertyPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `field`, replacing any earlier write to the same field.
    pub fn set(&mut self, field: &str, value: PropertyValue) {
        match self.entries.iter_mut().find(|(name, _)| name == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field.to_string(), value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn to_json(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect()
    }
}

pub struct PropertyReader<'a> {
    properties: &'a Map<String, Value>,
}

impl<'a> PropertyReader<'a> {
    pub fn new(properties: &'a Map<String, Value>) -> Self {
        Self { properties }
    }

    fn field(&self, name: &str) -> Option<&'a Value> {
        self.properties.get(name)
    }

    /// Concatenated title text. `None` when the property isn't a title array or is empty.
    pub fn title(&self, name: &str) -> Option<String> {
        let fragments = self.field(name)?.get("title")?.as_array()?;
        let text = join_plain_text(fragments);
        (!text.is_empty()).then_some(text)
    }

    /// Concatenated rich text. An absent property is `None`; an empty array is `Some("")`.
    pub fn rich_text(&self, name: &str) -> Option<String> {
        let fragments = self.field(name)?.get("rich_text")?.as_array()?;
        Some(join_plain_text(fragments))
    }

    pub fn checkbox(&self, name: &str) -> bool {
        matches!(
            self.field(name).and_then(|prop| prop.get("checkbox")),
            Some(Value::Bool(true))
        )
    }

    pub fn date_start(&self, name: &str) -> Option<String> {
        self.field(name)?
            .get("date")?
            .get("start")?
            .as_str()
            .filter(|start| !start.is_empty())
            .map(str::to_string)
    }

    pub fn select_name(&self, name: &str) -> Option<&'a str> {
        self.field(name)?.get("select")?.get("name")?.as_str()
    }
}

fn join_plain_text(fragments: &[Value]) -> String {
    fragments
        .iter()
        .map(|fragment| match fragment.get("plain_text") {
            Some(Value::String(text)) => text.clone(),
            None | Some(Value::Null) => String::new(),
            Some(other) => other.to_string(),
        })
        .collect()
}
