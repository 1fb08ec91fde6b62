//! Configuration management for typeahead
//!
//! This module handles loading, parsing, and managing configuration:
//! - Engine tuning (quiescence window, page size, direction)
//! - Output and logging settings for the command-line tool
//! - Named lookup screens (`[lookups.<name>]`)
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::error::{ConfigError, Result};
use crate::model::{Direction, FieldRole, FieldSpec, RequestDescriptor};
use crate::predicate::{self, Degenerate, PredicateInput};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Engine configuration
    #[serde(default)]
    pub engine: EngineConfig,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Named lookup screens
    #[serde(default)]
    pub lookups: BTreeMap<String, LookupConfig>,
}

/// Engine tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Debounce window in milliseconds
    #[serde(default = "default_quiescence_ms")]
    pub quiescence_ms: u64,

    /// Records per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Paging direction
    #[serde(default)]
    pub direction: Direction,
}

/// Display and output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    /// Output format (json, json-pretty, table)
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Enable colored output
    #[serde(default = "default_color_output")]
    pub color_output: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Compact JSON format (single-line)
    Json,

    /// Pretty-printed JSON format (multi-line)
    JsonPretty,

    /// Table format (ASCII table layout)
    Table,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// One lookup screen: where to search and how.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LookupConfig {
    /// Table (or join) name qualifying the fields
    #[serde(default)]
    pub table: String,

    /// Static conditions, optionally containing `$value`
    #[serde(default)]
    pub static_fragments: Vec<String>,

    /// Extra condition OR-ed with the search
    #[serde(default)]
    pub additional_where: Option<String>,

    /// Ordering clause
    #[serde(default)]
    pub order_by: Option<String>,

    /// Page size override
    #[serde(default)]
    pub page_size: Option<u32>,

    /// Direction override
    #[serde(default)]
    pub direction: Option<Direction>,

    /// Columns of the lookup
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

// Default value functions
fn default_quiescence_ms() -> u64 {
    100
}

fn default_page_size() -> u32 {
    predicate::DEFAULT_PAGE_SIZE
}

fn default_format() -> OutputFormat {
    OutputFormat::JsonPretty
}

fn default_color_output() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

/// Longest debounce window accepted by validation
const MAX_QUIESCENCE_MS: u64 = 10_000;

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quiescence_ms: default_quiescence_ms(),
            page_size: default_page_size(),
            direction: Direction::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            color_output: default_color_output(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from `path`, or the default path when `None`.
    ///
    /// A missing file yields the default configuration.
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Get the default configuration file path
    ///
    /// # Returns
    /// * `PathBuf` - Path to default configuration file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("typeahead")
            .join("config.toml")
    }

    /// Save configuration to a file
    ///
    /// # Arguments
    /// * `path` - Path where to save the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Success or error
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Validate the configuration
    ///
    /// Degenerate lookups (no searchable field, no table) are reported as
    /// warnings only; they still work, matching everything.
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;

        for (name, lookup) in &self.lookups {
            if lookup.page_size == Some(0) {
                return Err(ConfigError::InvalidValue {
                    field: format!("lookups.{name}.page_size"),
                    value: "0".to_string(),
                }
                .into());
            }
            if let Some(reason) = lookup.diagnose() {
                warn!("Lookup '{}': {}", name, reason);
            }
        }

        Ok(())
    }

    /// Get a named lookup
    pub fn lookup(&self, name: &str) -> Result<&LookupConfig> {
        self.lookups
            .get(name)
            .ok_or_else(|| ConfigError::UnknownLookup(name.to_string()).into())
    }
}

impl EngineConfig {
    /// Get the quiescence window as Duration
    pub fn quiescence(&self) -> Duration {
        Duration::from_millis(self.quiescence_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.page_size".to_string(),
                value: self.page_size.to_string(),
            }
            .into());
        }
        if self.quiescence_ms > MAX_QUIESCENCE_MS {
            return Err(ConfigError::InvalidValue {
                field: "engine.quiescence_ms".to_string(),
                value: self.quiescence_ms.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl LookupConfig {
    /// Create a lookup over `table` with the given fields.
    pub fn new(table: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            table: table.into(),
            fields,
            ..Self::default()
        }
    }

    /// Field matched on commit: first display field, else the primary one.
    pub fn display_field(&self) -> Option<&str> {
        self.field_with_role(FieldRole::Display)
            .or_else(|| self.field_with_role(FieldRole::Primary))
            .or_else(|| self.fields.first().map(|field| field.name.as_str()))
    }

    /// Field used as selection key: the primary field, else the display one.
    pub fn primary_field(&self) -> Option<&str> {
        self.field_with_role(FieldRole::Primary)
            .or_else(|| self.display_field())
    }

    /// Why this lookup cannot produce a meaningful predicate, if it cannot.
    pub fn diagnose(&self) -> Option<Degenerate> {
        predicate::diagnose(&self.fields, &self.table)
    }

    /// Build the first-page descriptor for `search_text`.
    pub fn descriptor(&self, search_text: &str, engine: &EngineConfig) -> RequestDescriptor {
        PredicateInput::new(search_text, &self.fields, &self.table)
            .static_fragments(&self.static_fragments)
            .additional_where(self.additional_where.as_deref())
            .order_by(self.order_by.as_deref())
            .page_size(self.page_size.unwrap_or(engine.page_size))
            .direction(self.direction.unwrap_or(engine.direction))
            .build()
    }

    fn field_with_role(&self, role: FieldRole) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.role == role && !field.name.trim().is_empty())
            .map(|field| field.name.as_str())
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookupError;

    const SAMPLE: &str = r#"
[engine]
quiescence_ms = 150
page_size = 25

[display]
format = "table"

[lookups.supplier]
table = "Supplier"
static_fragments = ["Supplier.active = 1"]
order_by = "Supplier.name ASC"
fields = [
    { name = "code", role = "primary" },
    { name = "name" },
    { name = "vat", role = "aux", visible = false },
]
"#;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.engine.quiescence(), Duration::from_millis(100));
        assert_eq!(config.engine.page_size, 50);
        assert_eq!(config.display.format, OutputFormat::JsonPretty);
        assert!(config.lookups.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_sample() {
        let config = Config::from_toml(SAMPLE).unwrap();
        assert_eq!(config.engine.quiescence_ms, 150);
        assert_eq!(config.display.format, OutputFormat::Table);
        assert_eq!(config.logging.level, LogLevel::Warn);

        let supplier = config.lookup("supplier").unwrap();
        assert_eq!(supplier.fields.len(), 3);
        assert_eq!(supplier.primary_field(), Some("code"));
        assert_eq!(supplier.display_field(), Some("name"));
        assert!(supplier.diagnose().is_none());
    }

    #[test]
    fn test_lookup_descriptor_uses_engine_defaults() {
        let config = Config::from_toml(SAMPLE).unwrap();
        let supplier = config.lookup("supplier").unwrap();
        let descriptor = supplier.descriptor("acme", &config.engine);

        assert_eq!(descriptor.page_size, 25);
        assert_eq!(descriptor.order_by.as_deref(), Some("Supplier.name ASC"));
        assert_eq!(
            descriptor.filter.as_deref(),
            Some(
                "(Supplier.active = 1) AND \
                 ((Supplier.code LIKE '%acme%') OR (Supplier.name LIKE '%acme%'))"
            )
        );
    }

    #[test]
    fn test_unknown_lookup() {
        let config = Config::default();
        assert!(matches!(
            config.lookup("nope"),
            Err(LookupError::Config(ConfigError::UnknownLookup(_)))
        ));
    }

    #[test]
    fn test_validation_rejects_zero_page_size() {
        let mut config = Config::default();
        config.engine.page_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        let mut lookup = LookupConfig::new("T", vec![FieldSpec::new("a")]);
        lookup.page_size = Some(0);
        config.lookups.insert("t".to_string(), lookup);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_degenerate_lookup_is_only_a_warning() {
        let mut config = Config::default();
        config
            .lookups
            .insert("empty".to_string(), LookupConfig::new("", Vec::new()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config::from_toml(SAMPLE).unwrap();

        config.save(&path).unwrap();
        let reloaded = Config::load_from_file(Some(&path)).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert_eq!(Config::load_from_file(Some(&path)).unwrap(), Config::default());
        assert!(matches!(
            Config::from_file(&path),
            Err(LookupError::Config(ConfigError::FileNotFound(_)))
        ));
    }
}
