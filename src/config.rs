//! # Service Configuration
//!
//! JSON configuration file loaded once by the CLI, validated, then turned
//! into the typed configs of each subsystem.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::JwtConfig;
use crate::http_server::HttpServerConfig;
use crate::media::UploadPolicy;
use crate::observability::{log_event, Event};

/// Shortest accepted signing secret, in bytes
const MIN_SECRET_LEN: usize = 16;

/// Configuration errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

// ==================
// Sections
// ==================

/// Bearer token settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSection {
    pub secret: String,

    #[serde(default = "default_issuer")]
    pub issuer: String,

    #[serde(default = "default_issuer")]
    pub audience: String,

    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
}

/// Object store and upload grant settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSection {
    /// Directory holding uploaded objects. Relative paths resolve against `data_dir`.
    #[serde(default = "default_object_root")]
    pub object_root: String,

    /// Externally reachable base URL that signed URLs point at
    pub public_base_url: String,

    pub signing_secret: String,

    #[serde(default = "default_grant_ttl_secs")]
    pub grant_ttl_secs: i64,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    /// Exact types or `type/*`. Empty allows anything.
    #[serde(default)]
    pub allowed_mime_types: Vec<String>,
}

fn default_issuer() -> String {
    "entrydesk".to_string()
}
fn default_token_ttl_minutes() -> i64 {
    60
}
fn default_database_file() -> String {
    "entrydesk.db".to_string()
}
fn default_object_root() -> String {
    "objects".to_string()
}
fn default_grant_ttl_secs() -> i64 {
    900
}
fn default_max_upload_bytes() -> u64 {
    50 * 1024 * 1024
} // 50 MiB
fn default_upload_timeout_secs() -> u64 {
    60
}

// ==================
// AppConfig
// ==================

/// Top-level configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub data_dir: String,

    #[serde(default = "default_database_file")]
    pub database_file: String,

    #[serde(default)]
    pub http: HttpServerConfig,

    pub auth: AuthSection,

    pub storage: StorageSection,

    /// Deadline for client-side direct uploads
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,
}

impl AppConfig {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let config = Self::from_json(&content)?;
        log_event(
            Event::ConfigLoaded,
            &[
                ("data_dir", &config.data_dir),
                ("path", &path.display().to_string()),
            ],
        );
        Ok(config)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: AppConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(ConfigError::Invalid("data_dir must not be empty".into()));
        }
        if self.database_file.trim().is_empty() {
            return Err(ConfigError::Invalid("database_file must not be empty".into()));
        }
        if self.auth.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid(format!(
                "auth.secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        if self.auth.token_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid("auth.token_ttl_minutes must be > 0".into()));
        }
        if self.storage.signing_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid(format!(
                "storage.signing_secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        if url::Url::parse(&self.storage.public_base_url).is_err() {
            return Err(ConfigError::Invalid(format!(
                "storage.public_base_url is not a URL: '{}'",
                self.storage.public_base_url
            )));
        }
        if self.storage.grant_ttl_secs <= 0 {
            return Err(ConfigError::Invalid("storage.grant_ttl_secs must be > 0".into()));
        }
        if self.storage.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid("storage.max_upload_bytes must be > 0".into()));
        }
        if self.upload_timeout_secs == 0 {
            return Err(ConfigError::Invalid("upload_timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_path().join(&self.database_file)
    }

    pub fn object_root(&self) -> PathBuf {
        let root = Path::new(&self.storage.object_root);
        if root.is_absolute() {
            root.to_path_buf()
        } else {
            self.data_path().join(root)
        }
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.auth.secret.clone(),
            access_token_ttl: chrono::Duration::minutes(self.auth.token_ttl_minutes),
            issuer: self.auth.issuer.clone(),
            audience: self.auth.audience.clone(),
        }
    }

    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy {
            grant_ttl: chrono::Duration::seconds(self.storage.grant_ttl_secs),
            max_upload_bytes: self.storage.max_upload_bytes,
            allowed_mime_types: self.storage.allowed_mime_types.clone(),
        }
    }

    pub fn upload_timeout(&self) -> StdDuration {
        StdDuration::from_secs(self.upload_timeout_secs)
    }
}
