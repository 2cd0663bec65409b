use super::properties::PropertyPatch;
use super::{CreatedPage, PageUpdate, QueryPage, RemoteStore};
use crate::config::BackendSettings;
use crate::errors::{AppError, AppResult};
use crate::redaction::Redactor;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const NOTION_VERSION_HEADER: &str = "Notion-Version";
const QUERY_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
struct NotionErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for the Notion REST API, authenticated with a single integration token.
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: Client,
    base_url: String,
    redactor: Redactor,
}

impl NotionClient {
    pub fn new(settings: &BackendSettings, token: &str) -> AppResult<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|_| AppError::Config("Notion token contains invalid characters".to_string()))?;
        auth.set_sensitive(true);
        let version = HeaderValue::from_str(&settings.notion_version)
            .map_err(|_| AppError::Config(format!("Invalid Notion version {}", settings.notion_version)))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(NOTION_VERSION_HEADER, version);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            redactor: Redactor::new(true),
        })
    }

    async fn check(&self, response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let parsed: Option<NotionErrorBody> = serde_json::from_str(&body).ok();
        let code = parsed.as_ref().and_then(|error| error.code.clone());
        let message = parsed
            .and_then(|error| error.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        let message = self.redactor.redact(&message).content;

        if status == StatusCode::UNAUTHORIZED || code.as_deref() == Some("unauthorized") {
            return Err(AppError::Unauthorized(message));
        }
        Err(AppError::Backend {
            status: status.as_u16(),
            message,
        })
    }

    fn transport_error(&self, error: reqwest::Error) -> AppError {
        AppError::Transport(self.redactor.redact(&error.to_string()).content)
    }
}

#[async_trait]
impl RemoteStore for NotionClient {
    async fn query_database(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
    ) -> AppResult<QueryPage> {
        let mut body = json!({
            "sorts": [{ "timestamp": "created_time", "direction": "descending" }],
            "page_size": QUERY_PAGE_SIZE,
        });
        if let Some(cursor) = start_cursor {
            body["start_cursor"] = Value::String(cursor.to_string());
        }

        let response = self
            .http
            .post(format!("{}/databases/{}/query", self.base_url, database_id))
            .json(&body)
            .send()
            .await
            .map_err(|error| self.transport_error(error))?;
        let response = self.check(response).await?;
        response
            .json::<QueryPage>()
            .await
            .map_err(|error| self.transport_error(error))
    }

    async fn create_page(
        &self,
        database_id: &str,
        properties: &PropertyPatch,
    ) -> AppResult<CreatedPage> {
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties.to_json(),
        });
        let response = self
            .http
            .post(format!("{}/pages", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|error| self.transport_error(error))?;
        let response = self.check(response).await?;
        response
            .json::<CreatedPage>()
            .await
            .map_err(|error| self.transport_error(error))
    }

    async fn update_page(&self, page_id: &str, update: &PageUpdate) -> AppResult<()> {
        let response = self
            .http
            .patch(format!("{}/pages/{}", self.base_url, page_id))
            .json(&update.to_json())
            .send()
            .await
            .map_err(|error| self.transport_error(error))?;
        self.check(response).await?;
        Ok(())
    }
}
