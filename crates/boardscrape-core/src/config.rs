//! Configuration management for boardscrape.
//!
//! Provides TOML-based configuration with a small search path and
//! environment variable overrides. Every field has a default, so a partial
//! (or missing) file is fine.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "boardscrape.toml";

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Page to scrape
    pub target: TargetConfig,
    /// Output file settings
    pub output: OutputConfig,
    /// Retry policy for page acquisition
    pub fetch: FetchConfig,
    /// Browser automation settings
    pub browser: BrowserSettings,
    /// Header-control clicks performed before capture
    pub interaction: InteractionConfig,
    /// Table extraction settings
    pub extraction: ExtractionConfig,
    /// Log sinks
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration, falling back to defaults if no file is found.
    ///
    /// With `explicit` set, that file must exist. Otherwise
    /// `./boardscrape.toml` is tried, then the platform config directory.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound {
                    path: path.display().to_string(),
                });
            }
            return Self::load_from(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Self::load_from(&local);
        }

        match Self::config_path() {
            Ok(path) if path.exists() => Self::load_from(&path),
            _ => {
                tracing::debug!("Config file not found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load and parse a specific TOML file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides applied.
    ///
    /// Supports the following environment variables:
    /// - `BOARDSCRAPE_URL`: target page URL
    /// - `BOARDSCRAPE_OUTPUT`: output file path
    /// - `BOARDSCRAPE_INTERACT`: click header controls (true/false)
    /// - `BOARDSCRAPE_HEADLESS`: browser headless mode (true/false)
    /// - `BOARDSCRAPE_MAX_RETRIES`: retry bound for page acquisition
    pub fn load_with_env(explicit: Option<&Path>) -> ConfigResult<Self> {
        let mut config = Self::load(explicit)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup function.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("BOARDSCRAPE_URL") {
            tracing::debug!("Override target.url from env: {}", url);
            self.target.url = url;
        }

        if let Some(path) = lookup("BOARDSCRAPE_OUTPUT") {
            tracing::debug!("Override output.path from env: {}", path);
            self.output.path = PathBuf::from(path);
        }

        if let Some(val) = lookup("BOARDSCRAPE_INTERACT") {
            match val.parse() {
                Ok(interact) => self.target.interact = interact,
                Err(_) => tracing::warn!("Ignoring BOARDSCRAPE_INTERACT={}", val),
            }
        }

        if let Some(val) = lookup("BOARDSCRAPE_HEADLESS") {
            match val.parse() {
                Ok(headless) => self.browser.headless = headless,
                Err(_) => tracing::warn!("Ignoring BOARDSCRAPE_HEADLESS={}", val),
            }
        }

        if let Some(val) = lookup("BOARDSCRAPE_MAX_RETRIES") {
            match val.parse() {
                Ok(retries) => self.fetch.max_retries = retries,
                Err(_) => tracing::warn!("Ignoring BOARDSCRAPE_MAX_RETRIES={}", val),
            }
        }
    }

    /// Check values that have no sensible fallback.
    pub fn validate(&self) -> ConfigResult<()> {
        let url = self.target.url.trim();
        if url.is_empty() {
            return Err(invalid("target.url", "must not be empty"));
        }

        let parsed = url::Url::parse(url).map_err(|e| invalid("target.url", e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(
                "target.url",
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }

        if self.output.path.as_os_str().is_empty() {
            return Err(invalid("output.path", "must not be empty"));
        }

        if self.browser.navigation_timeout_secs == 0 {
            return Err(invalid("browser.navigation_timeout_secs", "must be positive"));
        }

        Ok(())
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the path to the per-user configuration file.
    ///
    /// Uses XDG base directories: `~/.config/boardscrape/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "boardscrape", "boardscrape")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// The page being scraped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Leaderboard page URL
    pub url: String,
    /// Click header controls to expand columns before capture
    pub interact: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: "https://artificialanalysis.ai/leaderboards/providers".to_string(),
            interact: true,
        }
    }
}

/// Delimited output flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma-separated values
    #[default]
    Csv,
    /// Tab-separated values
    Tsv,
}

impl OutputFormat {
    /// Field delimiter byte.
    #[must_use]
    pub fn delimiter(self) -> u8 {
        match self {
            Self::Csv => b',',
            Self::Tsv => b'\t',
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            other => Err(format!("unknown output format '{other}' (expected csv or tsv)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Tsv => write!(f, "tsv"),
        }
    }
}

/// Output file settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Base output path; a timestamp is inserted before the extension
    pub path: PathBuf,
    /// Delimited format
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("output/leaderboard.csv"),
            format: OutputFormat::Csv,
        }
    }
}

/// Retry policy for page acquisition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry in seconds; doubles for each retry
    pub base_delay_secs: u64,
}

impl FetchConfig {
    /// Base delay as a `Duration`.
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        Duration::from_secs(self.base_delay_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_secs: 5,
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
    /// Upper bound on waiting for the first table to appear, in seconds
    pub render_timeout_secs: u64,
    /// Fixed delay after the page settles, in milliseconds
    pub settle_delay_ms: u64,
    /// Explicit Chrome/Chromium binary; auto-detected when unset
    pub chrome_executable: Option<PathBuf>,
    /// Pick a random desktop user agent and viewport per launch
    pub randomize_fingerprint: bool,
}

impl BrowserSettings {
    /// Navigation timeout as a `Duration`.
    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    /// Render wait bound as a `Duration`.
    #[must_use]
    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    /// Settle delay as a `Duration`.
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            navigation_timeout_secs: 30,
            render_timeout_secs: 15,
            settle_delay_ms: 2000,
            chrome_executable: None,
            randomize_fingerprint: false,
        }
    }
}

/// Header-control clicks performed when `target.interact` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// CSS selectors; every matching element is clicked in document order
    pub selectors: Vec<String>,
    /// Pause after each click, in milliseconds
    pub click_delay_ms: u64,
}

impl InteractionConfig {
    /// Click pause as a `Duration`.
    #[must_use]
    pub fn click_delay(&self) -> Duration {
        Duration::from_millis(self.click_delay_ms)
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            selectors: vec!["thead th button".to_string()],
            click_delay_ms: 250,
        }
    }
}

/// Table extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Optional CSS selector narrowing which tables are candidates
    pub table_selector: Option<String>,
    /// Header keywords (case-insensitive) marking provider-name columns
    pub provider_keywords: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            table_selector: None,
            provider_keywords: vec!["provider".to_string()],
        }
    }
}

/// Log sinks: console plus an append-mode file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory holding the log file
    pub dir: PathBuf,
    /// Log file name
    pub file_name: String,
    /// Console filter directive (`RUST_LOG` takes precedence)
    pub console_level: String,
    /// File sink level
    pub file_level: String,
}

impl LoggingConfig {
    /// Full path of the log file.
    #[must_use]
    pub fn file_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file_name: "scraper.log".to_string(),
            console_level: "info,boardscrape=debug".to_string(),
            file_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.target.url.starts_with("https://"));
        assert_eq!(config.fetch.max_retries, 3);
        assert_eq!(config.fetch.base_delay(), Duration::from_secs(5));
        assert_eq!(config.output.format, OutputFormat::Csv);
        assert!(config.browser.headless);
        assert_eq!(config.logging.file_path(), PathBuf::from("logs/scraper.log"));
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = config.to_toml().expect("serialize default config");
        assert!(toml_str.contains("[target]"));
        assert!(toml_str.contains("[fetch]"));
        assert!(toml_str.contains("[interaction]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_load_from_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("boardscrape.toml");

        let mut config = AppConfig::default();
        config.target.url = "https://example.com/board".to_string();
        config.output.format = OutputFormat::Tsv;
        fs::write(&config_path, config.to_toml().expect("serialize")).expect("write config");

        let loaded = AppConfig::load(Some(&config_path)).expect("load config");
        assert_eq!(loaded.target.url, "https://example.com/board");
        assert_eq!(loaded.output.format, OutputFormat::Tsv);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let tmp = TempDir::new().expect("create temp dir");
        let missing = tmp.path().join("nope.toml");
        let err = AppConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[target]
url = "https://example.com"

[fetch]
max_retries = 5
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.target.url, "https://example.com");
        assert_eq!(config.fetch.max_retries, 5);
        // These should be defaults
        assert_eq!(config.fetch.base_delay_secs, 5);
        assert!(config.target.interact);
        assert_eq!(config.interaction.selectors, vec!["thead th button"]);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("BOARDSCRAPE_URL", "https://override.test/"),
            ("BOARDSCRAPE_OUTPUT", "out/x.csv"),
            ("BOARDSCRAPE_INTERACT", "false"),
            ("BOARDSCRAPE_HEADLESS", "false"),
            ("BOARDSCRAPE_MAX_RETRIES", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| vars.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.target.url, "https://override.test/");
        assert_eq!(config.output.path, PathBuf::from("out/x.csv"));
        assert!(!config.target.interact);
        assert!(!config.browser.headless);
        // Unparseable value leaves the default in place
        assert_eq!(config.fetch.max_retries, 3);
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let mut config = AppConfig::default();
        config.target.url = "   ".to_string();
        assert!(config.validate().is_err());

        config.target.url = "ftp://example.com".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));

        config.target.url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_output() {
        let mut config = AppConfig::default();
        config.output.path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("CSV".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert_eq!("tsv".parse::<OutputFormat>(), Ok(OutputFormat::Tsv));
        assert!("json".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Tsv.delimiter(), b'\t');
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn test_example_file_matches_defaults() {
        let example = include_str!("../../../boardscrape.example.toml");
        let parsed: AppConfig = toml::from_str(example).expect("parse example config");
        assert_eq!(parsed, AppConfig::default());
    }
}
