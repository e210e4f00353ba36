//! Configuration system for resview
//!
//! A single YAML file layered over built-in defaults and environment
//! overrides, with dotted-key access for the `config` subcommand.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{CacheConfig, Config, GraphConfig, OutputFormat};

/// Keys accepted by [`get_config_value`] and [`set_config_value`]
pub const CONFIG_KEYS: &[&str] = &[
    "defaultNamespace",
    "cache.capacity",
    "graph.resolveTimeoutSeconds",
    "graph.output",
];

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &schema::Config, key: &str) -> anyhow::Result<String> {
    match key {
        "defaultNamespace" => Ok(config.default_namespace.clone()),
        "cache.capacity" => Ok(config.cache.capacity.to_string()),
        "graph.resolveTimeoutSeconds" => Ok(config.graph.resolve_timeout_seconds.to_string()),
        "graph.output" => Ok(config.graph.output.to_string()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut schema::Config, key: &str, value: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    match key {
        "defaultNamespace" => {
            if value.trim().is_empty() {
                return Err(anyhow::anyhow!("defaultNamespace must not be empty"));
            }
            config.default_namespace = value.to_string();
        }
        "cache.capacity" => {
            let capacity: usize = value
                .parse()
                .context("cache.capacity must be a number")?;
            if capacity == 0 {
                return Err(anyhow::anyhow!("cache.capacity must be greater than zero"));
            }
            config.cache.capacity = capacity;
        }
        "graph.resolveTimeoutSeconds" => {
            config.graph.resolve_timeout_seconds = value
                .parse()
                .context("graph.resolveTimeoutSeconds must be a number")?;
        }
        "graph.output" => {
            config.graph.output = value.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}
