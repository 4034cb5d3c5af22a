//! Bootstrap configuration loading
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (applied by the binary, highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is never fatal: a warning is logged and defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default HTTP port for nr-web
pub const DEFAULT_PORT: u16 = 5780;

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Interface the HTTP server binds to
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Folder for local state (intent log)
    #[serde(default)]
    pub data_folder: Option<PathBuf>,

    /// Serve from a JSON content fixture instead of the hosted content store
    #[serde(default)]
    pub fixture: Option<PathBuf>,

    /// External content store connection
    #[serde(default)]
    pub content: ContentConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// External content store settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentConfig {
    #[serde(default)]
    pub space_id: Option<String>,

    #[serde(default = "default_environment")]
    pub environment: String,

    /// Read-only token for the delivery API
    #[serde(default)]
    pub delivery_token: Option<String>,

    /// Privileged token for the management API
    #[serde(default)]
    pub management_token: Option<String>,

    #[serde(default = "default_delivery_url")]
    pub delivery_url: String,

    #[serde(default = "default_management_url")]
    pub management_url: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Validated connection settings for both content APIs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentCredentials {
    pub space_id: String,
    pub environment: String,
    pub delivery_token: String,
    pub management_token: String,
    pub delivery_url: String,
    pub management_url: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_environment() -> String {
    "master".to_string()
}

fn default_delivery_url() -> String {
    "https://cdn.contentful.com".to_string()
}

fn default_management_url() -> String {
    "https://api.contentful.com".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_folder: None,
            fixture: None,
            content: ContentConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            space_id: None,
            environment: default_environment(),
            delivery_token: None,
            management_token: None,
            delivery_url: default_delivery_url(),
            management_url: default_management_url(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load the TOML tier and apply environment overrides.
    ///
    /// `explicit_path` comes from the command line; when absent the platform
    /// default location is tried. Only a malformed file is an error.
    pub fn resolve(explicit_path: Option<&Path>) -> Result<Self> {
        let path = explicit_path
            .map(Path::to_path_buf)
            .or_else(default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => {
                info!("Loading config from {}", path.display());
                Self::load(&path)?
            }
            Some(path) => {
                warn!(
                    "Config file not found at {} - using defaults",
                    path.display()
                );
                Self::default()
            }
            None => {
                warn!("Could not determine config directory - using defaults");
                Self::default()
            }
        };

        config.apply_env();
        Ok(config)
    }

    /// Apply environment variable overrides (tier 2)
    pub fn apply_env(&mut self) {
        if let Some(host) = env_value("NEXT_READS_HOST") {
            self.host = host;
        }
        if let Some(port) = env_value("NEXT_READS_PORT") {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(_) => warn!("Ignoring invalid NEXT_READS_PORT value: {}", port),
            }
        }
        if let Some(folder) = env_value("NEXT_READS_DATA_FOLDER") {
            self.data_folder = Some(PathBuf::from(folder));
        }
        if let Some(fixture) = env_value("NEXT_READS_FIXTURE") {
            self.fixture = Some(PathBuf::from(fixture));
        }
        if let Some(level) = env_value("NEXT_READS_LOG") {
            self.logging.level = level;
        }
        if let Some(space) = env_value("CONTENTFUL_SPACE_ID") {
            self.content.space_id = Some(space);
        }
        if let Some(environment) = env_value("CONTENTFUL_ENVIRONMENT") {
            self.content.environment = environment;
        }
        if let Some(token) = env_value("CONTENTFUL_ACCESS_TOKEN") {
            self.content.delivery_token = Some(token);
        }
        if let Some(token) = env_value("CONTENTFUL_MANAGEMENT_ACCESS_TOKEN") {
            self.content.management_token = Some(token);
        }
    }

    /// Folder for local state, falling back to the OS data directory
    pub fn data_folder(&self) -> PathBuf {
        self.data_folder
            .clone()
            .unwrap_or_else(default_data_folder)
    }

    /// `host:port` string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ContentConfig {
    /// Check that every credential needed to reach the content store is set
    pub fn credentials(&self) -> Result<ContentCredentials> {
        let mut missing = Vec::new();
        let space_id = required(&self.space_id, "space_id", &mut missing);
        let delivery_token = required(&self.delivery_token, "delivery_token", &mut missing);
        let management_token =
            required(&self.management_token, "management_token", &mut missing);

        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "Content store not configured, missing: {}. Set them in config.toml [content] \
                 or via CONTENTFUL_SPACE_ID / CONTENTFUL_ACCESS_TOKEN / \
                 CONTENTFUL_MANAGEMENT_ACCESS_TOKEN",
                missing.join(", ")
            )));
        }

        Ok(ContentCredentials {
            space_id,
            environment: self.environment.clone(),
            delivery_token,
            management_token,
            delivery_url: self.delivery_url.trim_end_matches('/').to_string(),
            management_url: self.management_url.trim_end_matches('/').to_string(),
        })
    }
}

fn required(value: &Option<String>, key: &'static str, missing: &mut Vec<&'static str>) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => {
            missing.push(key);
            String::new()
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Platform config file location: `<config_dir>/next-reads/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("next-reads").join("config.toml"))
}

/// Platform data folder: `<data_local_dir>/next-reads`
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("next-reads"))
        .unwrap_or_else(|| PathBuf::from("./next_reads_data"))
}
