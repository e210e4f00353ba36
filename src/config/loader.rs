//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{defaults, paths, schema::Config};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Root config
    /// 3. Built-in defaults
    pub fn load() -> Result<Config> {
        Self::load_from(&paths::root_config_path())
    }

    /// Load configuration using `path` as the root config file
    pub fn load_from(path: &Path) -> Result<Config> {
        let mut config = Self::load_defaults();

        if path.exists() {
            config = Self::load_file(path)?;
        }

        Ok(Self::apply_env_overrides(config))
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the root configuration file and the merged result
    ///
    /// Fails on invalid YAML, invalid value types, a zero cache capacity or a
    /// zero resolve timeout.
    pub fn validate() -> Result<()> {
        Self::validate_path(&paths::root_config_path())
    }

    pub fn validate_path(path: &Path) -> Result<()> {
        let config = Self::load_from(path).context("Failed to load merged configuration")?;
        Self::check(&config)
    }

    /// Check value ranges of a loaded configuration
    pub fn check(config: &Config) -> Result<()> {
        if config.cache.capacity == 0 {
            return Err(anyhow::anyhow!("cache.capacity must be greater than zero"));
        }
        if config.graph.resolve_timeout_seconds == 0 {
            return Err(anyhow::anyhow!(
                "graph.resolveTimeoutSeconds must be greater than zero"
            ));
        }
        if config.default_namespace.trim().is_empty() {
            return Err(anyhow::anyhow!("defaultNamespace must not be empty"));
        }
        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Config) -> Config {
        // RESVIEW_NAMESPACE override
        if let Ok(namespace) = std::env::var("RESVIEW_NAMESPACE") {
            if !namespace.is_empty() {
                config.default_namespace = namespace;
            }
        }

        // RESVIEW_CACHE_CAPACITY override, ignored when not a number
        if let Ok(capacity) = std::env::var("RESVIEW_CACHE_CAPACITY") {
            match capacity.parse::<usize>() {
                Ok(val) => config.cache.capacity = val,
                Err(_) => tracing::warn!(
                    "Ignoring RESVIEW_CACHE_CAPACITY={}: not a number",
                    capacity
                ),
            }
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &PathBuf) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }
}
