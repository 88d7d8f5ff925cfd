//! Configuration management for accountflow
//!
//! This module handles loading, validation, and management of
//! accountflow configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::ConfigError;

/// Deepest degree an account may have in a chart of accounts
pub const MAX_DEGREE: u8 = 5;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins for the JSON API (empty = same origin only)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the data directory
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// Snapshot file holding every record (relative to data path)
    #[serde(default = "default_store_file")]
    pub store_file: String,
    /// Seed demo records when the snapshot does not exist yet
    #[serde(default = "default_false")]
    pub seed_demo: bool,
    /// Write the snapshot back after every mutation
    #[serde(default = "default_true")]
    pub autosave: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            store_file: default_store_file(),
            seed_demo: false,
            autosave: true,
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_store_file() -> String {
    "accountflow.json".to_string()
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

/// Chart-of-accounts hierarchy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyConfig {
    /// Maximum account degree (1..=5)
    #[serde(default = "default_max_degree")]
    pub max_degree: u8,
    /// Indentation in pixels per tree level
    #[serde(default = "default_indent_unit")]
    pub indent_unit: usize,
    /// Marker repeated per level in parent selectors
    #[serde(default = "default_option_marker")]
    pub option_marker: String,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            max_degree: default_max_degree(),
            indent_unit: default_indent_unit(),
            option_marker: default_option_marker(),
        }
    }
}

fn default_max_degree() -> u8 {
    MAX_DEGREE
}

fn default_indent_unit() -> usize {
    24
}

fn default_option_marker() -> String {
    "--".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Records per page for lists
    #[serde(default = "default_records_per_page")]
    pub records_per_page: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            records_per_page: default_records_per_page(),
        }
    }
}

fn default_records_per_page() -> usize {
    50
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Currency code shown next to amounts
    #[serde(default = "default_currency")]
    pub code: String,
    /// Currency symbol
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Number of decimal places
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    /// Thousands separator
    #[serde(default = "default_thousands_sep")]
    pub thousands_separator: String,
    /// Decimal separator
    #[serde(default = "default_decimal_sep")]
    pub decimal_separator: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            code: default_currency(),
            symbol: default_symbol(),
            decimal_places: default_decimal_places(),
            thousands_separator: default_thousands_sep(),
            decimal_separator: default_decimal_sep(),
        }
    }
}

fn default_currency() -> String {
    "BRL".to_string()
}

fn default_symbol() -> String {
    "R$".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

fn default_thousands_sep() -> String {
    ".".to_string()
}

fn default_decimal_sep() -> String {
    ",".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Data directory settings
    #[serde(default)]
    pub data: DataConfig,
    /// Account hierarchy settings
    #[serde(default)]
    pub hierarchy: HierarchyConfig,
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(&path).map_err(|_| ConfigError::IoError)?;
        Self::from_yaml(&content)
    }

    /// Load configuration without blocking the runtime
    pub async fn load_async(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                ConfigError::IoError
            }
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content).map_err(|_| ConfigError::InvalidYaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.data.store_file.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "data.store_file".to_string(),
            });
        }

        if self.hierarchy.max_degree == 0 || self.hierarchy.max_degree > MAX_DEGREE {
            return Err(ConfigError::InvalidValue {
                field: "hierarchy.max_degree".to_string(),
                reason: format!("Max degree must be between 1 and {}", MAX_DEGREE),
            });
        }

        if self.hierarchy.option_marker.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "hierarchy.option_marker".to_string(),
                reason: "Option marker must not be empty".to_string(),
            });
        }

        if self.pagination.records_per_page == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.records_per_page".to_string(),
                reason: "Records per page must be greater than 0".to_string(),
            });
        }

        if self.currency.decimal_places > 10 {
            return Err(ConfigError::InvalidValue {
                field: "currency.decimal_places".to_string(),
                reason: "Decimal places must be between 0 and 10".to_string(),
            });
        }

        if !matches!(
            self.logging.level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error" | "off"
        ) {
            return Err(ConfigError::ValidationError {
                message: format!("Unknown log level '{}'", self.logging.level),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Get the full path to the snapshot file
    pub fn store_path(&self) -> PathBuf {
        self.data.path.join(&self.data.store_file)
    }
}

// ==================== Tests ====================
