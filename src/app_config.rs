//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with LECTERN_)
//! 2. Config file (config.toml)
//! 3. Default values
//!
//! Secrets like database passwords and session keys should be kept in
//! environment variables, not in the config file.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Global application configuration
pub static APP_CONFIG: Lazy<RwLock<AppConfig>> = Lazy::new(|| {
    RwLock::new(AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config file, using defaults: {}", e);
        AppConfig::default()
    }))
});

/// Site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub description: String,
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Lectern".to_string(),
            description: "An online course platform built in Rust".to_string(),
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

/// Storage configuration for uploaded course media
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Local storage path for image and file uploads
    pub media_path: String,
    /// URL prefix the media directory is served under
    pub media_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            media_path: "./media".to_string(),
            media_url: "/media".to_string(),
        }
    }
}

/// Content limits configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Courses per catalog page
    pub courses_per_page: u32,
    /// Maximum upload size in MB
    pub max_upload_size_mb: u32,
    /// Maximum title length for courses, modules and content items
    pub max_title_length: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            courses_per_page: 20,
            max_upload_size_mb: 10,
            max_title_length: 200,
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds a cached catalog page stays fresh
    pub catalog_ttl_seconds: u64,
    /// Maximum number of cached catalog pages
    pub catalog_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            catalog_ttl_seconds: 300,
            catalog_capacity: 1000,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub storage: StorageConfig,
    pub limits: LimitsConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        use config::FileFormat;

        let config = Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Add config file (optional) - use from_file for full path support
            .add_source(File::new(path, FileFormat::Toml).required(false))
            // Override with environment variables (LECTERN_ prefix)
            // e.g., LECTERN_SITE_NAME, LECTERN_STORAGE_MEDIA_PATH
            .add_source(
                Environment::with_prefix("LECTERN")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reload configuration from file
    pub fn reload() -> Result<(), ConfigError> {
        let new_config = Self::load()?;
        if let Ok(mut config) = APP_CONFIG.write() {
            *config = new_config;
            log::info!("Configuration reloaded");
        }
        Ok(())
    }
}

/// Initialize application configuration
///
/// This triggers the lazy loading of the config file and logs the result.
/// Should be called early in application startup.
pub fn init() {
    // Access the lazy static to trigger initialization
    let config = APP_CONFIG.read().unwrap();
    log::info!("Configuration loaded: site.name = {}", config.site.name);
}

// Convenience functions for accessing global config

/// Get the current application configuration
pub fn get_config() -> AppConfig {
    APP_CONFIG.read().map(|c| c.clone()).unwrap_or_default()
}

/// Get site configuration
pub fn site() -> SiteConfig {
    get_config().site
}

/// Get storage configuration
pub fn storage() -> StorageConfig {
    get_config().storage
}

/// Get limits configuration
pub fn limits() -> LimitsConfig {
    get_config().limits
}

/// Get cache configuration
pub fn cache() -> CacheConfig {
    get_config().cache
}
