//! OAuth access tokens for the compute service.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::Deserialize;

use super::error::{EngineError, EngineResult};

/// Token endpoint of the GCE/Cloud Run metadata server.
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// How requests to the compute service are authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// Pre-issued bearer token (e.g. `gcloud auth print-access-token`).
    AccessToken(String),
    /// Token minted by the metadata server for the attached service account.
    MetadataServer,
}

#[derive(Debug, Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    expires_in: i64,
    #[allow(dead_code)]
    token_type: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Resolves and caches bearer tokens.
#[derive(Debug)]
pub struct TokenProvider {
    method: AuthMethod,
    metadata_url: String,
    cache: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(method: AuthMethod) -> Self {
        Self::with_metadata_url(method, METADATA_TOKEN_URL)
    }

    pub fn with_metadata_url(method: AuthMethod, metadata_url: impl Into<String>) -> Self {
        Self {
            method,
            metadata_url: metadata_url.into(),
            cache: Mutex::new(None),
        }
    }

    /// Current bearer token, fetching a fresh one when the cache is stale.
    pub async fn token(&self, http: &reqwest::Client) -> EngineResult<String> {
        match &self.method {
            AuthMethod::AccessToken(token) => Ok(token.clone()),
            AuthMethod::MetadataServer => {
                if let Some(token) = self.cached(Utc::now()) {
                    return Ok(token);
                }
                let fresh = self.fetch_metadata_token(http).await?;
                let value = fresh.value.clone();
                *self.cache.lock() = Some(fresh);
                Ok(value)
            }
        }
    }

    fn cached(&self, now: DateTime<Utc>) -> Option<String> {
        self.cache
            .lock()
            .as_ref()
            .filter(|t| t.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > now)
            .map(|t| t.value.clone())
    }

    async fn fetch_metadata_token(&self, http: &reqwest::Client) -> EngineResult<CachedToken> {
        log::debug!("Requesting access token from {}", self.metadata_url);

        let response = http
            .get(&self.metadata_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| EngineError::Auth(format!("Failed to request metadata token: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<empty response>".to_string());

        if !status.is_success() {
            return Err(EngineError::Auth(format!(
                "Metadata token request failed ({}): {}",
                status,
                body.trim()
            )));
        }

        let parsed: MetadataTokenResponse = serde_json::from_str(&body).map_err(|e| {
            EngineError::Auth(format!("Failed to parse metadata token response: {}", e))
        })?;

        Ok(CachedToken {
            value: parsed.access_token,
            expires_at: Utc::now() + Duration::seconds(parsed.expires_in),
        })
    }
}
