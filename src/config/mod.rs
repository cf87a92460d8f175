//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/shop-locator/config.toml

pub mod defaults;

use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Geocoding service settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Routing service settings
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Device location settings
    #[serde(default)]
    pub device: DeviceConfig,

    /// Ranking output settings
    #[serde(default)]
    pub ranking: RankingConfig,
}

/// Geocoding service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Nominatim base URL
    #[serde(default = "default_geocoding_url")]
    pub base_url: String,

    /// User-Agent header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Reverse geocoding zoom level
    #[serde(default = "default_zoom")]
    pub zoom: u8,
}

/// Routing service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// OSRM base URL
    #[serde(default = "default_routing_url")]
    pub base_url: String,

    /// OSRM profile (driving, walking, cycling)
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Destinations per table request
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

/// Device location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// IP geolocation endpoint
    #[serde(default = "default_ip_api_url")]
    pub ip_api_url: String,

    /// Cache file name under the user cache directory
    #[serde(default = "default_cache_file")]
    pub cache_file: String,
}

/// Ranking output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Label shown for vendors without a distance
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: String,
}

// Default value functions for serde
fn default_geocoding_url() -> String {
    DEFAULT_GEOCODING_URL.to_string()
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_zoom() -> u8 {
    DEFAULT_ZOOM
}
fn default_routing_url() -> String {
    DEFAULT_ROUTING_URL.to_string()
}
fn default_profile() -> String {
    DEFAULT_PROFILE.to_string()
}
fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}
fn default_ip_api_url() -> String {
    DEFAULT_IP_API_URL.to_string()
}
fn default_cache_file() -> String {
    DEFAULT_CACHE_FILE.to_string()
}
fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}
fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_url(),
            user_agent: default_user_agent(),
            zoom: default_zoom(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: default_routing_url(),
            profile: default_profile(),
            window_size: default_window_size(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            ip_api_url: default_ip_api_url(),
            cache_file: default_cache_file(),
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
            format: default_format(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["geocoding", "base_url"] => Some(self.geocoding.base_url.clone()),
            ["geocoding", "user_agent"] => Some(self.geocoding.user_agent.clone()),
            ["geocoding", "zoom"] => Some(self.geocoding.zoom.to_string()),

            ["routing", "base_url"] => Some(self.routing.base_url.clone()),
            ["routing", "profile"] => Some(self.routing.profile.clone()),
            ["routing", "window_size"] => Some(self.routing.window_size.to_string()),

            ["device", "ip_api_url"] => Some(self.device.ip_api_url.clone()),
            ["device", "cache_file"] => Some(self.device.cache_file.clone()),

            ["ranking", "placeholder"] => Some(self.ranking.placeholder.clone()),
            ["ranking", "format"] => Some(self.ranking.format.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["geocoding", "base_url"] => {
                self.geocoding.base_url = value.to_string();
            }
            ["geocoding", "user_agent"] => {
                self.geocoding.user_agent = value.to_string();
            }
            ["geocoding", "zoom"] => {
                self.geocoding.zoom = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid zoom value: {}", value)))?;
            }

            ["routing", "base_url"] => {
                self.routing.base_url = value.to_string();
            }
            ["routing", "profile"] => {
                self.routing.profile = value.to_string();
            }
            ["routing", "window_size"] => {
                let size: usize = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid window size: {}", value)))?;
                if size == 0 {
                    return Err(Error::Validation("Window size must be at least 1".to_string()));
                }
                self.routing.window_size = size;
            }

            ["device", "ip_api_url"] => {
                self.device.ip_api_url = value.to_string();
            }
            ["device", "cache_file"] => {
                self.device.cache_file = value.to_string();
            }

            ["ranking", "placeholder"] => {
                self.ranking.placeholder = value.to_string();
            }
            ["ranking", "format"] => {
                self.ranking.format = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "geocoding.base_url",
            "geocoding.user_agent",
            "geocoding.zoom",
            "routing.base_url",
            "routing.profile",
            "routing.window_size",
            "device.ip_api_url",
            "device.cache_file",
            "ranking.placeholder",
            "ranking.format",
        ]
    }
}
