//! Configuration file handling with TOML support.

use crate::models::RiskPreference;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Insight service location
    #[serde(default)]
    pub server: ServerConfig,

    /// Portfolio defaults
    #[serde(default)]
    pub portfolio: PortfolioConfig,

    /// Where interactive mode writes reports
    #[serde(default)]
    pub output: OutputConfig,
}

/// Insight service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Path of the stock query endpoint
    #[serde(default = "default_query_path")]
    pub query_path: String,

    /// Path of the portfolio analysis endpoint
    #[serde(default = "default_portfolio_path")]
    pub portfolio_path: String,

    /// Path of the query history endpoint
    #[serde(default = "default_history_path")]
    pub history_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            query_path: default_query_path(),
            portfolio_path: default_portfolio_path(),
            history_path: default_history_path(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}
fn default_timeout() -> u64 {
    120
}
fn default_query_path() -> String {
    "/query".to_string()
}
fn default_portfolio_path() -> String {
    "/portfolio-analysis".to_string()
}
fn default_history_path() -> String {
    "/history".to_string()
}

/// Portfolio defaults used when nothing is given on the command line.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PortfolioConfig {
    /// Risk appetite: low, moderate, high
    #[serde(default)]
    pub risk: RiskPreference,

    /// Holdings to start with
    #[serde(default)]
    pub holdings: Vec<HoldingConfig>,
}

/// Single holding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingConfig {
    /// Ticker symbol
    pub symbol: String,
    /// Number of shares
    pub quantity: i64,
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory interactive mode writes reports into
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    /// Load configuration from file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Check values serde cannot rule out on its own.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.server.timeout > 0,
            "server.timeout must be at least 1 second"
        );
        Ok(())
    }

    /// Load configuration from default location or fall back to defaults.
    pub fn load_or_default() -> Self {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                match Self::load(&path) {
                    Ok(config) => return config,
                    Err(e) => {
                        log::warn!("Failed to load config: {:#}", e);
                    }
                }
            }
        }
        Config::default()
    }

    /// Get the configuration directory.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("stocklens"))
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }
}

/// Write the sample configuration to `path`, creating parent directories.
pub fn write_sample(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }

    fs::write(path, sample_config())
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    Ok(())
}

/// Generate a sample configuration file content.
pub fn sample_config() -> &'static str {
    r##"# Stocklens Configuration File

[server]
# Base URL of the insight service
base_url = "http://127.0.0.1:8000"
# Request timeout in seconds (analysis can take a while)
timeout = 120
# Endpoint paths
query_path = "/query"
portfolio_path = "/portfolio-analysis"
history_path = "/history"

[portfolio]
# Risk appetite: low, moderate, high
risk = "moderate"

[[portfolio.holdings]]
symbol = "TCS"
quantity = 10

[[portfolio.holdings]]
symbol = "INFY"
quantity = 5

[output]
# Directory interactive mode writes portfolio-report.html into
directory = "."
"##
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_parses() {
        let config: Config = toml::from_str(sample_config()).unwrap();
        assert_eq!(config.server.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.server.timeout, 120);
        assert_eq!(config.portfolio.risk, RiskPreference::Moderate);
        assert_eq!(config.portfolio.holdings.len(), 2);
        assert_eq!(config.portfolio.holdings[1].symbol, "INFY");
        assert_eq!(config.portfolio.holdings[1].quantity, 5);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
[server]
base_url = "https://insights.example.com"

[portfolio]
risk = "high"
"#,
        )
        .unwrap();
        assert_eq!(config.server.base_url, "https://insights.example.com");
        assert_eq!(config.server.query_path, "/query");
        assert_eq!(config.server.timeout, 120);
        assert_eq!(config.portfolio.risk, RiskPreference::High);
        assert!(config.portfolio.holdings.is_empty());
        assert_eq!(config.output.directory, PathBuf::from("."));
    }

    #[test]
    fn test_invalid_risk_rejected() {
        let result: Result<Config, _> = toml::from_str("[portfolio]\nrisk = \"yolo\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config: Config = toml::from_str("[server]\ntimeout = 0\n").unwrap();
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());

        let path =
            std::env::temp_dir().join(format!("stocklens-zero-timeout-{}.toml", std::process::id()));
        fs::write(&path, "[server]\ntimeout = 0\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("server.timeout must be at least 1 second"));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("stocklens-does-not-exist.toml");
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_write_sample_round_trip() {
        let dir = std::env::temp_dir().join(format!("stocklens-config-{}", std::process::id()));
        let path = dir.join("nested").join("config.toml");

        write_sample(&path).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.portfolio.holdings[0].symbol, "TCS");

        fs::remove_dir_all(&dir).unwrap();
    }
}
