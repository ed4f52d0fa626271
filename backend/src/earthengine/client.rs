//! Client seam for the hosted compute service and its REST implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::auth::TokenProvider;
use super::error::{EngineError, EngineResult};
use super::expression::Expression;

/// Image encodings a thumbnail can be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailFormat {
    Png,
}

impl ThumbnailFormat {
    /// Value of the `fileFormat` request field.
    pub fn api_name(self) -> &'static str {
        match self {
            ThumbnailFormat::Png => "PNG",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ThumbnailFormat::Png => "image/png",
        }
    }
}

/// Operations the analysis procedures need from the compute service.
///
/// Handlers receive an `Arc<dyn EarthEngine>`; tests substitute a fake.
#[async_trait]
pub trait EarthEngine: Send + Sync {
    /// Evaluate `expression` and return its JSON result.
    async fn compute_value(&self, expression: &Expression) -> EngineResult<Value>;

    /// Register a thumbnail rendering of `expression` and return the URL its
    /// pixels can be downloaded from.
    async fn create_thumbnail(
        &self,
        expression: &Expression,
        format: ThumbnailFormat,
    ) -> EngineResult<String>;

    /// Fetch raw bytes from `url`.
    async fn download(&self, url: &str) -> EngineResult<Vec<u8>>;
}

/// [`EarthEngine`] over the public REST API (`/v1/projects/{project}/...`).
#[derive(Debug)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    project: String,
    tokens: TokenProvider,
}

impl RestClient {
    pub fn new(
        base_url: impl Into<String>,
        project: impl Into<String>,
        tokens: TokenProvider,
        timeout: Duration,
    ) -> EngineResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project: project.into(),
            tokens,
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    fn project_url(&self, method: &str) -> String {
        format!("{}/v1/projects/{}/{}", self.base_url, self.project, method)
    }

    async fn post_json(&self, url: &str, body: &Value) -> EngineResult<Value> {
        let token = self.tokens.token(&self.http).await?;
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(EngineError::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

/// Extract `error.message` from a Google API error body, falling back to the
/// raw text.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "<empty response>".to_string()
            } else {
                trimmed.to_string()
            }
        })
}

#[async_trait]
impl EarthEngine for RestClient {
    async fn compute_value(&self, expression: &Expression) -> EngineResult<Value> {
        log::debug!("value:compute with {} nodes", expression.len());
        let reply = self
            .post_json(
                &self.project_url("value:compute"),
                &json!({ "expression": expression }),
            )
            .await?;

        Ok(reply.get("result").cloned().unwrap_or(Value::Null))
    }

    async fn create_thumbnail(
        &self,
        expression: &Expression,
        format: ThumbnailFormat,
    ) -> EngineResult<String> {
        let reply = self
            .post_json(
                &self.project_url("thumbnails"),
                &json!({ "expression": expression, "fileFormat": format.api_name() }),
            )
            .await?;

        let name = reply
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| EngineError::Decode("thumbnail reply has no 'name'".to_string()))?;

        Ok(format!("{}/v1/{}:getPixels", self.base_url, name))
    }

    async fn download(&self, url: &str) -> EngineResult<Vec<u8>> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(EngineError::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
