//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/calendar-heatmap/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/calendar-heatmap/` (~/.config/calendar-heatmap/)
//! - State/Logs: `$XDG_STATE_HOME/calendar-heatmap/` (~/.local/state/calendar-heatmap/)

use crate::error::{Error, Result};
use crate::layout::{Settings, MIN_WIDTH};
use crate::scale::{Rgb, DEFAULT_COLOR};
use crate::types::Overview;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "calendar-heatmap";

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Heatmap appearance and timing
    #[serde(default)]
    pub heatmap: HeatmapConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[heatmap]` table
///
/// Geometry and timing keys (`gutter`, `label_padding`,
/// `transition_duration`, ...) sit directly in the table next to the
/// appearance keys.
#[derive(Debug, Deserialize)]
pub struct HeatmapConfig {
    /// Accent color as `#rrggbb` or `#rgb`
    pub color: Option<String>,

    /// Level to open on (global, year, month, week, day)
    pub overview: Option<String>,

    /// Container width in pixels
    #[serde(default = "default_width")]
    pub width: f64,

    #[serde(flatten)]
    pub settings: Settings,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            color: None,
            overview: None,
            width: default_width(),
            settings: Settings::default(),
        }
    }
}

fn default_width() -> f64 {
    MIN_WIDTH
}

impl HeatmapConfig {
    /// Configured accent color, or the default one.
    pub fn color(&self) -> Result<Rgb> {
        match &self.color {
            Some(color) => color.parse(),
            None => Ok(DEFAULT_COLOR),
        }
    }

    /// Configured initial overview, or `global`.
    pub fn overview(&self) -> Result<Overview> {
        match &self.overview {
            Some(overview) => overview.parse(),
            None => Ok(Overview::default()),
        }
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        self.color()?;
        self.overview()?;

        if self.settings.transition_duration == 0 {
            return Err(Error::Config(
                "heatmap.transition_duration must be greater than 0".to_string(),
            ));
        }
        if self.settings.label_padding <= 0.0 {
            return Err(Error::Config(
                "heatmap.label_padding must be positive".to_string(),
            ));
        }
        if self.settings.gutter < 0.0 || self.settings.item_gutter < 0.0 {
            return Err(Error::Config(
                "heatmap gutters must not be negative".to_string(),
            ));
        }
        if self.width <= 0.0 {
            return Err(Error::Config("heatmap.width must be positive".to_string()));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,

    /// Level echoed to stderr, or "off"
    #[serde(default = "default_console_level")]
    pub console: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
            console: default_console_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

fn default_console_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.heatmap.validate()?;
        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/calendar-heatmap/config.toml`
    pub fn config_path() -> PathBuf {
        xdg_config_home().join(APP_DIR).join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/calendar-heatmap/` (~/.local/state/calendar-heatmap/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join(APP_DIR)
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/calendar-heatmap/calendar-heatmap.log`
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("calendar-heatmap.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.heatmap.color.is_none());
        assert_eq!(config.heatmap.color().unwrap(), DEFAULT_COLOR);
        assert_eq!(config.heatmap.overview().unwrap(), Overview::Global);
        assert_eq!(config.heatmap.width, MIN_WIDTH);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.max_files, 5);
    }

    #[test]
    fn test_parse_config() {
        let toml = r##"
[heatmap]
color = "#1e90ff"
overview = "year"
width = 1280
transition_duration = 200
label_padding = 30

[logging]
level = "debug"
console = "off"
"##;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.heatmap.color().unwrap().to_hex(), "#1e90ff");
        assert_eq!(config.heatmap.overview().unwrap(), Overview::Year);
        assert_eq!(config.heatmap.width, 1280.0);
        assert_eq!(config.heatmap.settings.transition_duration, 200);
        assert_eq!(config.heatmap.settings.label_padding, 30.0);
        // Untouched keys keep their defaults
        assert_eq!(config.heatmap.settings.tooltip_width, 250.0);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.console, "off");
        assert_eq!(config.logging.max_files, 5);
        assert!(config.heatmap.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let config = HeatmapConfig {
            color: Some("orange".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidColor(_))));

        let config = HeatmapConfig {
            overview: Some("decade".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::UnknownOverview(_))));

        let mut config = HeatmapConfig::default();
        config.settings.transition_duration = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[heatmap]\noverview = \"month\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.heatmap.overview().unwrap(), Overview::Month);

        std::fs::write(&path, "[heatmap]\ncolor = \"not-a-color\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());

        std::fs::write(&path, "[heatmap\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_paths() {
        assert!(Config::config_path().ends_with("calendar-heatmap/config.toml"));
        assert!(Config::log_path().ends_with("calendar-heatmap/calendar-heatmap.log"));
    }
}
