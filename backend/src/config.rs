//! Server configuration from `crop-coverage.toml` and environment variables.
//!
//! Values are resolved in order: built-in defaults, then the first config
//! file found, then environment overrides.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 5000
//! static_dir = "../frontend/dist"
//!
//! [earthengine]
//! project = "my-gcp-project"
//! auth = "metadata"        # or "token"
//! access_token = "ya29..." # required when auth = "token"
//! timeout_secs = 120
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::earthengine::{AuthMethod, METADATA_TOKEN_URL};

pub const CONFIG_FILE_NAME: &str = "crop-coverage.toml";

/// Configuration loading or validation failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Full application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub earthengine: EarthEngineSettings,
}

/// Listener and static asset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Root of the built frontend; unknown paths fall back to its `index.html`.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

/// Compute-service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarthEngineSettings {
    /// Cloud project the requests are billed to.
    #[serde(default)]
    pub project: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// `token` or `metadata`.
    #[serde(default = "default_auth")]
    pub auth: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_metadata_url")]
    pub metadata_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EarthEngineSettings {
    fn default() -> Self {
        Self {
            project: String::new(),
            api_base_url: default_api_base_url(),
            auth: default_auth(),
            access_token: None,
            metadata_url: default_metadata_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("../frontend/dist")
}

fn default_api_base_url() -> String {
    "https://earthengine.googleapis.com".to_string()
}

fn default_auth() -> String {
    "metadata".to_string()
}

fn default_metadata_url() -> String {
    METADATA_TOKEN_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl AppConfig {
    /// Parse a TOML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Search `crop-coverage.toml` in `.`, `backend/` and `..`.
    ///
    /// Returns `Ok(None)` when no file exists.
    pub fn from_default_location() -> Result<Option<Self>, ConfigError> {
        let search_paths = [
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from("backend").join(CONFIG_FILE_NAME),
            PathBuf::from("..").join(CONFIG_FILE_NAME),
        ];

        for path in search_paths {
            if path.exists() {
                log::info!("Loading configuration from {}", path.display());
                return Self::from_file(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// Defaults, overlaid by the config file (if any), overlaid by the
    /// environment, then validated.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_default_location()?.unwrap_or_default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Override settings from environment variables.
    ///
    /// # Environment Variables
    /// - `HOST`, `PORT`, `STATIC_DIR`
    /// - `EE_PROJECT`, `EE_API_URL`, `EE_AUTH_METHOD`, `EE_ACCESS_TOKEN`,
    ///   `EE_METADATA_URL`, `EE_TIMEOUT_SECS`
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            self.server.port = port.parse().map_err(|_| {
                ConfigError::Invalid(format!("PORT must be a valid port number, got '{}'", port))
            })?;
        }
        if let Ok(dir) = env::var("STATIC_DIR") {
            self.server.static_dir = PathBuf::from(dir);
        }
        if let Ok(project) = env::var("EE_PROJECT") {
            self.earthengine.project = project;
        }
        if let Ok(url) = env::var("EE_API_URL") {
            self.earthengine.api_base_url = url;
        }
        if let Ok(auth) = env::var("EE_AUTH_METHOD") {
            self.earthengine.auth = auth;
        }
        if let Ok(token) = env::var("EE_ACCESS_TOKEN") {
            self.earthengine.access_token = Some(token);
        }
        if let Ok(url) = env::var("EE_METADATA_URL") {
            self.earthengine.metadata_url = url;
        }
        if let Ok(secs) = env::var("EE_TIMEOUT_SECS") {
            self.earthengine.timeout_secs = secs.parse().map_err(|_| {
                ConfigError::Invalid(format!("EE_TIMEOUT_SECS must be a number, got '{}'", secs))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.earthengine.project.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "earthengine.project (EE_PROJECT) must be set".to_string(),
            ));
        }
        if self.earthengine.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "earthengine.timeout_secs must be positive".to_string(),
            ));
        }
        self.earthengine.auth_method()?;
        Ok(())
    }
}

impl EarthEngineSettings {
    /// Resolve the configured authentication strategy.
    pub fn auth_method(&self) -> Result<AuthMethod, ConfigError> {
        match self.auth.to_lowercase().as_str() {
            "token" | "access_token" => match self.access_token.as_deref() {
                Some(token) if !token.trim().is_empty() => {
                    Ok(AuthMethod::AccessToken(token.trim().to_string()))
                }
                _ => Err(ConfigError::Invalid(
                    "earthengine.access_token (EE_ACCESS_TOKEN) must be set when auth = \"token\""
                        .to_string(),
                )),
            },
            "metadata" | "gce" => Ok(AuthMethod::MetadataServer),
            other => Err(ConfigError::Invalid(format!(
                "Unsupported earthengine.auth '{}'. Use token or metadata.",
                other
            ))),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
