pub mod notion;
pub mod properties;

use crate::errors::AppResult;
use async_trait::async_trait;
use properties::PropertyPatch;
use serde::Deserialize;
use serde_json::{Map, Value};

/// One page as returned by a database query, before mapping.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PageRecord {
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// A single page of query results. `results` stays raw so one malformed entry can be
/// skipped without losing the rest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryPage {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CreatedPage {
    pub id: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageUpdate {
    pub properties: PropertyPatch,
    pub archived: Option<bool>,
}

impl PageUpdate {
    pub fn properties(properties: PropertyPatch) -> Self {
        Self {
            properties,
            archived: None,
        }
    }

    pub fn archive() -> Self {
        Self {
            properties: PropertyPatch::new(),
            archived: Some(true),
        }
    }

    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        if !self.properties.is_empty() {
            body.insert(
                "properties".to_string(),
                Value::Object(self.properties.to_json()),
            );
        }
        if let Some(archived) = self.archived {
            body.insert("archived".to_string(), Value::Bool(archived));
        }
        Value::Object(body)
    }
}

/// Remote document store holding the todo pages. One instance is bound to one credential.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn query_database(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
    ) -> AppResult<QueryPage>;

    async fn create_page(
        &self,
        database_id: &str,
        properties: &PropertyPatch,
    ) -> AppResult<CreatedPage>;

    async fn update_page(&self, page_id: &str, update: &PageUpdate) -> AppResult<()>;
}
