//! Application configuration
//!
//! Handles loading configuration from config.json. The loaded value is owned
//! by the caller and handed to the catalog client and artwork cache
//! explicitly, so tests can substitute a local endpoint and a scratch
//! directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Root application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Remote catalog endpoint configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the catalog collection endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Page size requested when loading the full name index
    #[serde(default = "default_list_limit")]
    pub list_limit: u32,
}

fn default_base_url() -> String {
    "https://pokeapi.co/api/v2/pokemon".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_list_limit() -> u32 {
    10000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            list_limit: default_list_limit(),
        }
    }
}

/// Local artwork store configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    /// Directory downloaded artwork is stored in
    #[serde(default = "default_cache_dir")]
    pub directory: PathBuf,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("images")
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: default_cache_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from config.json
    pub fn load() -> Self {
        // Try to load from current directory first
        if let Ok(config) = Self::load_from_path("config.json") {
            log::info!("Loaded config from ./config.json");
            return config;
        }

        // Try to load from executable directory
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let config_path = exe_dir.join("config.json");
                if let Ok(config) = Self::load_from_path(&config_path) {
                    log::info!("Loaded config from {}", config_path.display());
                    return config;
                }
            }
        }

        log::info!("No config.json found, using defaults");
        Self::default()
    }

    fn load_from_path(path: impl Into<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.into();
        let content = fs::read_to_string(&path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "https://pokeapi.co/api/v2/pokemon");
        assert_eq!(config.api.request_timeout_secs, 10);
        assert_eq!(config.api.list_limit, 10000);
        assert_eq!(config.cache.directory, PathBuf::from("images"));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"api": {"base_url": "http://localhost:9000"}}"#).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:9000");
        assert_eq!(config.api.list_limit, 10000);
        assert_eq!(config.cache.directory, PathBuf::from("images"));
    }

    #[test]
    fn test_cache_dir_override() {
        let config: AppConfig =
            serde_json::from_str(r#"{"cache": {"directory": "/tmp/artwork"}}"#).unwrap();
        assert_eq!(config.cache.directory, PathBuf::from("/tmp/artwork"));
    }
}
