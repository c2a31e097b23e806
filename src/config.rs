//! Configuration module for the school site.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::auth::is_password_hash;
use crate::{Result, SiteError};

/// Largest accepted upload limit, in megabytes.
pub const MAX_SIZE_LIMIT_MB: u64 = 4096;

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins (empty = permissive development mode).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/school.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Uploaded file configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Upload root. News images live directly under it and are served at `/uploads`.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Maximum total size of a document upload request in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Maximum total size of a news form (including the image) in megabytes.
    #[serde(default = "default_max_image_size")]
    pub max_image_size_mb: u64,
}

fn default_upload_dir() -> String {
    "public/uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    500
}

fn default_max_image_size() -> u64 {
    10
}

impl FilesConfig {
    /// Directory holding document blobs.
    pub fn documents_dir(&self) -> PathBuf {
        Path::new(&self.upload_dir).join("documents")
    }

    /// Directory holding news images.
    pub fn images_dir(&self) -> PathBuf {
        PathBuf::from(&self.upload_dir)
    }

    /// Document upload limit in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        mb_to_bytes(self.max_upload_size_mb)
    }

    /// News form limit in bytes.
    pub fn max_image_bytes(&self) -> usize {
        mb_to_bytes(self.max_image_size_mb)
    }
}

fn mb_to_bytes(mb: u64) -> usize {
    usize::try_from(mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_upload_size_mb: default_max_upload_size(),
            max_image_size_mb: default_max_image_size(),
        }
    }
}

/// Admin panel configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Admin login name.
    #[serde(default = "default_admin_username")]
    pub username: String,
    /// Admin password in plain text. Hashed at startup; ignored when
    /// `password_hash` is set.
    #[serde(default)]
    pub password: String,
    /// Argon2 PHC hash of the admin password.
    #[serde(default)]
    pub password_hash: String,
    /// Secret used to sign session cookies.
    #[serde(default)]
    pub session_secret: String,
    /// Session lifetime in seconds.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_session_ttl() -> u64 {
    8 * 3600
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            password: String::new(),
            password_hash: String::new(),
            session_secret: String::new(),
            session_ttl_secs: default_session_ttl(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/school-site.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Uploaded file configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Admin panel configuration.
    #[serde(default)]
    pub admin: AdminConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| SiteError::Config(e.to_string()))
    }

    /// Apply environment variable overrides.
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(secret) = non_empty_env("SESSION_SECRET") {
            self.admin.session_secret = secret;
        }
        if let Some(username) = non_empty_env("ADMIN_USERNAME") {
            self.admin.username = username;
        }
        if let Some(password) = non_empty_env("ADMIN_PASSWORD") {
            self.admin.password = password;
        }
        if let Some(hash) = non_empty_env("ADMIN_PASSWORD_HASH") {
            self.admin.password_hash = hash;
        }
        if let Some(path) = non_empty_env("DB_PATH") {
            self.database.path = path;
        }
        if let Some(port) = non_empty_env("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    /// Validate settings that have no safe default.
    pub fn validate(&self) -> Result<()> {
        if self.admin.session_secret.is_empty() {
            return Err(SiteError::Config(
                "admin.session_secret must be set (or SESSION_SECRET)".to_string(),
            ));
        }
        if self.admin.password_hash.is_empty() && self.admin.password.is_empty() {
            return Err(SiteError::Config(
                "admin.password_hash or admin.password must be set \
                 (or ADMIN_PASSWORD_HASH / ADMIN_PASSWORD)"
                    .to_string(),
            ));
        }
        if !self.admin.password_hash.is_empty() && !is_password_hash(&self.admin.password_hash) {
            return Err(SiteError::Config(
                "admin.password_hash is not a valid PHC hash string".to_string(),
            ));
        }
        for (name, value) in [
            ("max_upload_size_mb", self.files.max_upload_size_mb),
            ("max_image_size_mb", self.files.max_image_size_mb),
        ] {
            if value == 0 || value > MAX_SIZE_LIMIT_MB {
                return Err(SiteError::Config(format!(
                    "files.{name} must be between 1 and {MAX_SIZE_LIMIT_MB}"
                )));
            }
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
