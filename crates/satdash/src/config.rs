//! Configuration management for satdash.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use reqwest::Url;
use satdash_globe::state::{DEFAULT_DRAG_SENSITIVITY, DEFAULT_ROTATION_SPEED};
use satdash_globe::Visibility;
use serde::{Deserialize, Serialize};

use crate::dashboard::DEFAULT_POSITION_BATCH_LIMIT;
use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "satdash";

/// Default log file name for the interactive dashboard.
const LOG_FILE_NAME: &str = "satdash.log";

/// Public world-atlas land/country outlines at 1:110m.
pub const DEFAULT_ATLAS_URL: &str = "https://unpkg.com/world-atlas@2.0.2/countries-110m.json";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `SATDASH_`)
/// 2. TOML config file at `~/.config/satdash/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend API configuration.
    pub api: ApiConfig,
    /// Polling configuration.
    pub polling: PollingConfig,
    /// Globe configuration.
    pub globe: GlobeConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Backend API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the tracking backend; endpoint paths are appended to it.
    pub base_url: String,
    /// Upper bound on any single request, in seconds.
    pub request_timeout_secs: u64,
}

/// Polling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Interval between satellite metadata fetches, in seconds.
    pub satellites_interval_secs: u64,
    /// Interval between position fetches, in seconds.
    pub positions_interval_secs: u64,
    /// Maximum number of satellites per position request.
    pub position_batch_limit: usize,
}

/// Globe configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    /// Spin speed in degrees per 50 ms.
    pub rotation_speed: f64,
    /// Drag sensitivity; degrees per screen unit is this divided by the globe radius.
    pub drag_sensitivity: f64,
    /// Marker visibility strategy.
    pub visibility: Visibility,
    /// Draw the latitude/longitude grid.
    pub show_graticule: bool,
    /// Draw altitude rings around markers.
    pub show_altitude_rings: bool,
    /// Interval between animation frames, in milliseconds.
    pub frame_interval_ms: u64,
    /// TopoJSON world atlas with a `land` object.
    pub atlas_url: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file used by the interactive dashboard.
    /// Defaults to `~/.local/share/satdash/satdash.log`
    pub file: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            satellites_interval_secs: 300,
            positions_interval_secs: 30,
            position_batch_limit: DEFAULT_POSITION_BATCH_LIMIT,
        }
    }
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            rotation_speed: DEFAULT_ROTATION_SPEED,
            drag_sensitivity: DEFAULT_DRAG_SENSITIVITY,
            visibility: Visibility::Hemisphere,
            show_graticule: true,
            show_altitude_rings: true,
            frame_interval_ms: 50,
            atlas_url: DEFAULT_ATLAS_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `SATDASH_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("SATDASH_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if Url::parse(&self.api.base_url).is_err() {
            return Err(Error::ConfigValidation {
                message: format!("api.base_url is not a valid URL: {}", self.api.base_url),
            });
        }

        let intervals = [
            ("api.request_timeout_secs", self.api.request_timeout_secs),
            (
                "polling.satellites_interval_secs",
                self.polling.satellites_interval_secs,
            ),
            (
                "polling.positions_interval_secs",
                self.polling.positions_interval_secs,
            ),
            ("globe.frame_interval_ms", self.globe.frame_interval_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(Error::ConfigValidation {
                    message: format!("{name} must be greater than 0"),
                });
            }
        }

        if self.polling.position_batch_limit == 0 {
            return Err(Error::ConfigValidation {
                message: "polling.position_batch_limit must be greater than 0".to_string(),
            });
        }

        if self.globe.drag_sensitivity.is_nan() || self.globe.drag_sensitivity <= 0.0 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "globe.drag_sensitivity must be positive, got {}",
                    self.globe.drag_sensitivity
                ),
            });
        }

        if !self.globe.rotation_speed.is_finite() {
            return Err(Error::ConfigValidation {
                message: "globe.rotation_speed must be a finite number".to_string(),
            });
        }

        Ok(())
    }

    /// Override the backend base URL (from the command line).
    ///
    /// # Errors
    ///
    /// Returns an error if the new URL does not parse.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Result<Self> {
        if let Some(url) = base_url {
            self.api.base_url = url;
            self.validate()?;
        }
        Ok(self)
    }

    /// Get the log file path, resolving defaults if not set.
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.logging
            .file
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(LOG_FILE_NAME))
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    /// Get the satellite metadata polling interval as a Duration.
    #[must_use]
    pub fn satellites_interval(&self) -> Duration {
        Duration::from_secs(self.polling.satellites_interval_secs)
    }

    /// Get the position polling interval as a Duration.
    #[must_use]
    pub fn positions_interval(&self) -> Duration {
        Duration::from_secs(self.polling.positions_interval_secs)
    }

    /// Get the animation frame interval as a Duration.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.globe.frame_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.api.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.polling.satellites_interval_secs, 300);
        assert_eq!(config.polling.positions_interval_secs, 30);
        assert_eq!(config.polling.position_batch_limit, 100);
        assert_eq!(config.globe.visibility, Visibility::Hemisphere);
        assert!(config.globe.show_graticule);
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_default_globe_config() {
        let globe = GlobeConfig::default();

        assert!((globe.rotation_speed - 0.2).abs() < f64::EPSILON);
        assert!((globe.drag_sensitivity - 75.0).abs() < f64::EPSILON);
        assert!(globe.show_altitude_rings);
        assert_eq!(globe.frame_interval_ms, 50);
        assert_eq!(globe.atlas_url, DEFAULT_ATLAS_URL);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_base_url() {
        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("api.base_url"));
    }

    #[test]
    fn test_validate_zero_intervals() {
        let mut config = Config::default();
        config.polling.positions_interval_secs = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("positions_interval_secs"));

        let mut config = Config::default();
        config.globe.frame_interval_ms = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("frame_interval_ms"));
    }

    #[test]
    fn test_validate_zero_batch_limit() {
        let mut config = Config::default();
        config.polling.position_batch_limit = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("position_batch_limit"));
    }

    #[test]
    fn test_validate_bad_sensitivity() {
        let mut config = Config::default();
        config.globe.drag_sensitivity = 0.0;
        assert!(config.validate().is_err());

        config.globe.drag_sensitivity = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_with_base_url_override() {
        let config = Config::default()
            .with_base_url(Some("https://sats.example.org".to_string()))
            .unwrap();
        assert_eq!(config.api.base_url, "https://sats.example.org");

        assert!(Config::default()
            .with_base_url(Some("::nope::".to_string()))
            .is_err());
        assert_eq!(
            Config::default().with_base_url(None).unwrap(),
            Config::default()
        );
    }

    #[test]
    fn test_durations() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.satellites_interval(), Duration::from_secs(300));
        assert_eq!(config.positions_interval(), Duration::from_secs(30));
        assert_eq!(config.frame_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_log_file_default_and_custom() {
        let config = Config::default();
        assert!(config.log_file().to_string_lossy().contains("satdash.log"));

        let mut config = Config::default();
        config.logging.file = Some(PathBuf::from("/tmp/custom.log"));
        assert_eq!(config.log_file(), PathBuf::from("/tmp/custom.log"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("satdash"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!("satdash-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "[polling]\nposition_batch_limit = 25\n\n[globe]\nvisibility = \"screen_bounds\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        assert_eq!(config.polling.position_batch_limit, 25);
        assert_eq!(config.globe.visibility, Visibility::ScreenBounds);
        assert_eq!(config.polling.positions_interval_secs, 30);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_globe_config_deserialize() {
        let json = r#"{"rotation_speed": 0.5, "visibility": "hemisphere"}"#;
        let globe: GlobeConfig = serde_json::from_str(json).unwrap();
        assert!((globe.rotation_speed - 0.5).abs() < f64::EPSILON);
        assert!(globe.show_graticule);
    }
}
