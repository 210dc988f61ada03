//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Storage configuration
///
/// `path` is the public root; photos land under `{path}/images/user` and are
/// served from `/images`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Secret the token subject is encrypted with
    #[serde(default = "default_encryption_key")]
    pub encryption_key: String,
    /// Token lifetime; valid range 60-86400 seconds
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            encryption_key: default_encryption_key(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

/// Minimum allowed token lifetime (1 minute)
const MIN_TOKEN_TTL_SECS: i64 = 60;

/// Maximum allowed token lifetime (24 hours)
const MAX_TOKEN_TTL_SECS: i64 = 86400;

impl AuthConfig {
    /// Clamp the token TTL to [60, 86400] seconds, warning if adjusted
    pub fn validated_ttl_secs(&self) -> i64 {
        if self.token_ttl_secs < MIN_TOKEN_TTL_SECS {
            warn!(
                "token_ttl_secs {} is below minimum {}, using minimum",
                self.token_ttl_secs, MIN_TOKEN_TTL_SECS
            );
            MIN_TOKEN_TTL_SECS
        } else if self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            warn!(
                "token_ttl_secs {} exceeds maximum {}, using maximum",
                self.token_ttl_secs, MAX_TOKEN_TTL_SECS
            );
            MAX_TOKEN_TTL_SECS
        } else {
            self.token_ttl_secs
        }
    }
}

/// Upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_db_path() -> String {
    "./data/portrait.db".to_string()
}

fn default_storage_path() -> String {
    "./public".to_string()
}

fn default_jwt_secret() -> String {
    "change-me-in-production".to_string()
}

fn default_encryption_key() -> String {
    "change-me-in-production-too".to_string()
}

fn default_token_ttl_secs() -> i64 {
    3600
}

fn default_max_file_size() -> usize {
    10 * 1024 * 1024 // 10 MiB
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        if !config_path.exists() {
            info!("Config file not found at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        info!("Loaded configuration from {}", path);
        Ok(config)
    }

    /// Normalize values and warn about insecure settings
    pub fn validate(&mut self) {
        if self.auth.jwt_secret == default_jwt_secret() {
            warn!("auth.jwt_secret is the built-in default; set PORTRAIT_JWT_SECRET");
        }
        if self.auth.encryption_key == default_encryption_key() {
            warn!("auth.encryption_key is the built-in default; set PORTRAIT_ENCRYPTION_KEY");
        }
        if self.auth.jwt_secret == self.auth.encryption_key {
            warn!("auth.jwt_secret and auth.encryption_key should differ");
        }

        self.auth.token_ttl_secs = self.auth.validated_ttl_secs();

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            warn!(
                "Unknown logging.format {:?}, falling back to pretty",
                self.logging.format
            );
            self.logging.format = default_log_format();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/portrait.toml").unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert_eq!(config.upload.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.logging.format, "pretty");
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9000

[auth]
jwt_secret = "s3cret"

[logging]
format = "json"
"#
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.encryption_key, default_encryption_key());
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.storage.path, "./public");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();

        assert!(Config::load(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_validate_clamps_token_ttl() {
        let mut config = Config::default();

        config.auth.token_ttl_secs = 5;
        config.validate();
        assert_eq!(config.auth.token_ttl_secs, 60);

        config.auth.token_ttl_secs = 1_000_000;
        config.validate();
        assert_eq!(config.auth.token_ttl_secs, 86400);

        config.auth.token_ttl_secs = 900;
        config.validate();
        assert_eq!(config.auth.token_ttl_secs, 900);
    }

    #[test]
    fn test_validate_resets_unknown_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        config.validate();
        assert_eq!(config.logging.format, "pretty");
    }
}
