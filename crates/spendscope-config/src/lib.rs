//! Configuration management for spendscope
//!
//! This module handles loading, validation, and management of
//! spendscope configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigResult};

/// English month names, January first. Used when no localized list is configured.
pub const DEFAULT_MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

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
    /// Header carrying the user id set by the upstream auth proxy
    #[serde(default = "default_identity_header")]
    pub identity_header: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            identity_header: default_identity_header(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_identity_header() -> String {
    "x-user-id".to_string()
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the seed transaction file
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// JSON file mapping user ids to their transactions
    #[serde(default = "default_transactions_file")]
    pub transactions_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            transactions_file: default_transactions_file(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_transactions_file() -> String {
    "transactions.json".to_string()
}

/// Session defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Start new sessions in demo mode
    #[serde(default = "default_false")]
    pub demo_mode: bool,
    /// User id the demo source serves
    #[serde(default = "default_demo_user")]
    pub demo_user_id: String,
    /// Sessions idle for longer than this are dropped
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// Upper bound on concurrent sessions; the least recently used go first
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            demo_mode: false,
            demo_user_id: default_demo_user(),
            idle_timeout_secs: default_idle_timeout_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}

fn default_demo_user() -> String {
    "demo".to_string()
}

fn default_idle_timeout_secs() -> u64 {
    1800
}

fn default_max_sessions() -> usize {
    10_000
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

/// Analysis page settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Transaction type selected when a session starts
    #[serde(default)]
    pub default_type: TransactionKind,
    /// Localized month names, January first
    #[serde(default = "default_month_names")]
    pub month_names: Vec<String>,
    /// Start sessions filtered to the current month and year
    #[serde(default = "default_true")]
    pub start_at_current_month: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_type: TransactionKind::default(),
            month_names: default_month_names(),
            start_at_current_month: true,
        }
    }
}

fn default_month_names() -> Vec<String> {
    DEFAULT_MONTH_NAMES.iter().map(|m| m.to_string()).collect()
}

/// Transaction type enumeration as it appears in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[default]
    Expenses,
    Income,
}

impl std::str::FromStr for TransactionKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expenses" | "expense" => Ok(TransactionKind::Expenses),
            "income" => Ok(TransactionKind::Income),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Expenses => write!(f, "expenses"),
            TransactionKind::Income => write!(f, "income"),
        }
    }
}

/// Chart and visualization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Maximum number of legend entries
    #[serde(default = "default_legend_limit")]
    pub legend_limit: usize,
    /// Alpha applied to sibling slices while a subcategory is highlighted
    #[serde(default = "default_dimmed_alpha")]
    pub dimmed_alpha: f64,
    /// Show chart legends
    #[serde(default = "default_true")]
    pub show_legend: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            legend_limit: default_legend_limit(),
            dimmed_alpha: default_dimmed_alpha(),
            show_legend: true,
        }
    }
}

fn default_legend_limit() -> usize {
    7
}

fn default_dimmed_alpha() -> f64 {
    0.3
}

/// Category catalog settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Optional YAML catalog replacing the built-in one
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Label shown for unknown categories
    #[serde(default = "default_uncategorized_label")]
    pub uncategorized_label: String,
    /// Color of the fallback entry
    #[serde(default = "default_fallback_color")]
    pub fallback_color: String,
    /// Icon of the fallback entry
    #[serde(default = "default_fallback_icon")]
    pub fallback_icon: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: None,
            uncategorized_label: default_uncategorized_label(),
            fallback_color: default_fallback_color(),
            fallback_icon: default_fallback_icon(),
        }
    }
}

fn default_uncategorized_label() -> String {
    "Uncategorized".to_string()
}

fn default_fallback_color() -> String {
    "#9E9E9E".to_string()
}

fn default_fallback_icon() -> String {
    "help-circle".to_string()
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Default currency
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// Number of decimal places
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    /// Currency symbol position ("before" or "after")
    #[serde(default)]
    pub symbol_position: SymbolPosition,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            decimal_places: default_decimal_places(),
            symbol_position: SymbolPosition::Before,
        }
    }
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

/// Currency symbol position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    #[default]
    Before,
    After,
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
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Data directory settings
    #[serde(default)]
    pub data: DataConfig,
    /// Session defaults
    #[serde(default)]
    pub session: SessionConfig,
    /// Analysis page settings
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Chart settings
    #[serde(default)]
    pub charts: ChartConfig,
    /// Category catalog settings
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml(&content)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.server.identity_header.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "server.identity_header".to_string(),
            });
        }

        if self.analysis.month_names.len() != 12 {
            return Err(ConfigError::InvalidValue {
                field: "analysis.month_names".to_string(),
                reason: format!(
                    "Exactly 12 month names are required, found {}",
                    self.analysis.month_names.len()
                ),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for name in &self.analysis.month_names {
            let key = name.trim().to_lowercase();
            if key.is_empty() || !seen.insert(key) {
                return Err(ConfigError::InvalidValue {
                    field: "analysis.month_names".to_string(),
                    reason: format!("Month names must be non-empty and unique, got '{}'", name),
                });
            }
        }

        if self.session.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.max_sessions".to_string(),
                reason: "At least one session must be allowed".to_string(),
            });
        }

        if self.charts.legend_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "charts.legend_limit".to_string(),
                reason: "Legend limit must be at least 1".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.charts.dimmed_alpha) {
            return Err(ConfigError::InvalidValue {
                field: "charts.dimmed_alpha".to_string(),
                reason: "Alpha must be between 0.0 and 1.0".to_string(),
            });
        }

        if self.currency.decimal_places > 10 {
            return Err(ConfigError::InvalidValue {
                field: "currency.decimal_places".to_string(),
                reason: "Decimal places must be between 0 and 10".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Log level must be one of {}", LOG_LEVELS.join(", ")),
            });
        }

        if self.session.demo_user_id.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "session.demo_user_id".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Get the full path to the seed transaction file
    pub fn transactions_path(&self) -> PathBuf {
        self.data.path.join(&self.data.transactions_file)
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.charts.legend_limit, 7);
        assert_eq!(config.analysis.month_names[2], "March");
        assert_eq!(config.analysis.default_type, TransactionKind::Expenses);
    }

    #[test]
    fn test_generated_default_parses() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.transactions_path(), PathBuf::from("./data/transactions.json"));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = Config::from_yaml("server:\n  port: 9000\ncharts:\n  legend_limit: 5\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.charts.legend_limit, 5);
        assert!((config.charts.dimmed_alpha - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_wrong_month_count() {
        let err = Config::from_yaml("analysis:\n  month_names: [Jan, Feb]\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "analysis.month_names"));
    }

    #[test]
    fn test_rejects_duplicate_month_names() {
        let mut config = Config::default();
        config.analysis.month_names[1] = "january".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_alpha_and_legend() {
        let mut config = Config::default();
        config.charts.dimmed_alpha = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.charts.legend_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_blank_demo_user_and_zero_sessions() {
        let err = Config::from_yaml("session:\n  demo_user_id: \"  \"\n").unwrap_err();
        assert_eq!(err.field(), Some("session.demo_user_id"));

        let err = Config::from_yaml("session:\n  max_sessions: 0\n").unwrap_err();
        assert_eq!(err.field(), Some("session.max_sessions"));
    }

    #[test]
    fn test_session_limits_default() {
        let config = Config::from_yaml("session:\n  demo_mode: true\n").unwrap();
        assert_eq!(config.session.idle_timeout_secs, 1800);
        assert_eq!(config.session.max_sessions, 10_000);
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server: [unterminated").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYaml { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "session:\n  demo_mode: true\nanalysis:\n  default_type: income").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert!(config.session.demo_mode);
        assert_eq!(config.analysis.default_type, TransactionKind::Income);
    }

    #[test]
    fn test_transaction_kind_parse() {
        assert_eq!("Expense".parse::<TransactionKind>().unwrap(), TransactionKind::Expenses);
        assert_eq!(" income ".parse::<TransactionKind>().unwrap(), TransactionKind::Income);
        assert!("transfers".parse::<TransactionKind>().is_err());
    }
}
