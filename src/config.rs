//! Configuration management
//!
//! Handles loading, parsing, and validating the client's TOML configuration file.
//! Covers the service endpoint, panel behaviour, and logging.

use color_eyre::eyre::{self, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::buffer::DEFAULT_LOG_CAPACITY;
use crate::orchestrator::MessageTimings;

/// Service address used when none is configured
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

// ============================================================================
// Public Configuration Types
// ============================================================================

/// Main configuration structure
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub service: ServiceConfig,
    pub panel: PanelConfig,
    pub settings: Settings,
}

/// Where the service lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Base URL without trailing `/`
    pub base_url: String,
}

/// Interactive panel behaviour
#[derive(Debug, Clone, PartialEq)]
pub struct PanelConfig {
    pub log_capacity: usize,
    pub message_ttl: Duration,
    pub error_ttl: Duration,
    /// Rows kept free under the scrollable panels
    pub bottom_spacing: f64,
    /// Show the service-side logger name in log rows
    pub show_logger: bool,
}

impl PanelConfig {
    #[must_use]
    pub const fn timings(&self) -> MessageTimings {
        MessageTimings {
            message_ttl: self.message_ttl,
            error_ttl: self.error_ttl,
        }
    }
}

/// Global settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_level: String,
}

// ============================================================================
// Config File Deserialization (TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    service: ServiceFile,
    #[serde(default)]
    panel: PanelFile,
    #[serde(default)]
    settings: SettingsFile,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServiceFile {
    #[serde(default = "default_base_url")]
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PanelFile {
    #[serde(default = "default_log_capacity")]
    log_capacity: usize,
    #[serde(default = "default_message_ttl_ms")]
    message_ttl_ms: u64,
    #[serde(default = "default_error_ttl_ms")]
    error_ttl_ms: u64,
    #[serde(default = "default_bottom_spacing")]
    bottom_spacing: u16,
    #[serde(default)]
    show_logger: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    #[serde(default = "default_log_level")]
    log_level: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}

fn default_message_ttl_ms() -> u64 {
    3000
}

fn default_error_ttl_ms() -> u64 {
    4000
}

fn default_bottom_spacing() -> u16 {
    1
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ServiceFile {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for PanelFile {
    fn default() -> Self {
        Self {
            log_capacity: default_log_capacity(),
            message_ttl_ms: default_message_ttl_ms(),
            error_ttl_ms: default_error_ttl_ms(),
            bottom_spacing: default_bottom_spacing(),
            show_logger: false,
        }
    }
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

// ============================================================================
// Config Implementation
// ============================================================================

impl Default for Config {
    fn default() -> Self {
        // Built from the file defaults so both paths agree
        Self::from_config_file(ConfigFile::default())
    }
}

impl Config {
    /// Load configuration from the default XDG config path
    ///
    /// Creates a commented default file on first run.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created, read, parsed, or fails validation.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            info!("Creating default config at {:?}", config_path);
            Self::create_default_config(&config_path)?;
        }

        Self::load_from_path(&config_path)
    }

    /// Load and validate a config file at an explicit path
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {path:?}"))?;
        Self::parse(&contents).with_context(|| format!("Invalid config: {path:?}"))
    }

    /// Parse and validate config text
    ///
    /// # Errors
    /// Returns an error on TOML syntax errors, unknown keys, or invalid values.
    pub fn parse(contents: &str) -> Result<Self> {
        let config_file: ConfigFile = toml::from_str(contents).context("Failed to parse config")?;
        let config = Self::from_config_file(config_file);
        config.validate()?;
        Ok(config)
    }

    fn from_config_file(config_file: ConfigFile) -> Self {
        Self {
            service: ServiceConfig {
                base_url: config_file.service.base_url.trim_end_matches('/').to_string(),
            },
            panel: PanelConfig {
                log_capacity: config_file.panel.log_capacity,
                message_ttl: Duration::from_millis(config_file.panel.message_ttl_ms),
                error_ttl: Duration::from_millis(config_file.panel.error_ttl_ms),
                bottom_spacing: f64::from(config_file.panel.bottom_spacing),
                show_logger: config_file.panel.show_logger,
            },
            settings: Settings {
                log_level: config_file.settings.log_level,
            },
        }
    }

    fn validate(&self) -> Result<()> {
        validate_base_url(&self.service.base_url)?;

        if self.panel.log_capacity == 0 {
            eyre::bail!("panel.log_capacity must be greater than 0");
        }
        if self.panel.message_ttl.is_zero() || self.panel.error_ttl.is_zero() {
            eyre::bail!("panel.message_ttl_ms and panel.error_ttl_ms must be greater than 0");
        }

        match self.settings.log_level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            level => eyre::bail!(
                "Invalid log_level '{level}'. Must be: error, warn, info, debug, or trace"
            ),
        }

        Ok(())
    }

    /// Replace the service address (command-line override)
    ///
    /// # Errors
    /// Returns an error if `url` is not an http(s) URL.
    pub fn with_base_url(mut self, url: &str) -> Result<Self> {
        validate_base_url(url)?;
        self.service.base_url = url.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Get the XDG config path for bpctl
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined or created.
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre::eyre!("Could not determine config directory"))?
            .join("bpctl");
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config dir: {config_dir:?}"))?;
        Ok(config_dir.join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<()> {
        let default_config = r#"# bpctl configuration
#
# Client settings for the Bluray Poster control panel.

[service]
base_url = "http://127.0.0.1:8080"   # Where the service's HTTP API listens

[panel]
log_capacity = 200       # Log entries kept in the panel
message_ttl_ms = 3000    # How long success messages stay visible
error_ttl_ms = 4000      # How long errors stay visible
bottom_spacing = 1       # Rows kept free under the config and log panels
show_logger = false      # Show the service-side logger name in log rows

[settings]
log_level = "warn"       # error, warn, info, debug, trace
"#;
        fs::write(path, default_config)
            .with_context(|| format!("Failed to write config: {path:?}"))?;

        eprintln!("Created default config at: {path:?}");
        eprintln!();
        eprintln!("Next steps:");
        eprintln!("  1. Set [service] base_url to your service's address");
        eprintln!("  2. Run 'bpctl validate' to check your config");
        eprintln!("  3. Run 'bpctl tui' to open the panel");
        eprintln!();

        Ok(())
    }

    /// Print a human-readable summary of the configuration
    pub fn print_summary(&self) {
        println!("✓ Configuration valid\n");

        println!("Service:");
        println!("  base_url: {}", self.service.base_url);

        println!("\nPanel:");
        println!("  log_capacity: {}", self.panel.log_capacity);
        println!("  message_ttl_ms: {}", self.panel.message_ttl.as_millis());
        println!("  error_ttl_ms: {}", self.panel.error_ttl.as_millis());
        println!("  bottom_spacing: {}", self.panel.bottom_spacing);
        println!("  show_logger: {}", self.panel.show_logger);

        println!("\nSettings:");
        println!("  log_level: {}", self.settings.log_level);

        if let Ok(path) = Self::get_config_path() {
            println!("\nConfig: {path:?}");
        }
    }
}

fn validate_base_url(url: &str) -> Result<()> {
    let parsed = reqwest::Url::parse(url).with_context(|| format!("Invalid base_url '{url}'"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => eyre::bail!("Invalid base_url '{url}': scheme must be http or https, got '{scheme}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{XDG_LOCK, XdgTemp};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.service.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.panel.log_capacity, 200);
        assert_eq!(config.panel.timings(), MessageTimings::default());
        assert_eq!(config.settings.log_level, "warn");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = Config::parse("[service]\nbase_url = \"http://poster.lan:9000/\"\n").unwrap();
        assert_eq!(config.service.base_url, "http://poster.lan:9000");
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = Config::parse("[service]\nbase_url = \"ftp://poster.lan\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("scheme must be http or https"));
    }

    #[test]
    fn rejects_zero_capacity() {
        assert!(Config::parse("[panel]\nlog_capacity = 0\n").is_err());
    }

    #[test]
    fn rejects_bad_log_level() {
        let err = Config::parse("[settings]\nlog_level = \"loud\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("Invalid log_level"));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(Config::parse("[panel]\nlog_capcity = 10\n").is_err());
    }

    #[test]
    fn url_override_is_validated() {
        let config = Config::default().with_base_url("https://poster.example/").unwrap();
        assert_eq!(config.service.base_url, "https://poster.example");
        assert!(Config::default().with_base_url("not a url").is_err());
    }

    #[test]
    fn load_creates_default_file_that_validates() {
        let _lock = XDG_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let xdg = XdgTemp::new();

        let config = Config::load().unwrap();
        assert_eq!(config, Config::default());
        assert!(xdg.path().join("bpctl").join("config.toml").exists());
    }
}
