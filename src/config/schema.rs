//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Namespace used when the graph command gets no `--namespace`
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    /// Component cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Graph command configuration
    #[serde(default)]
    pub graph: GraphConfig,
}

/// Component cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    /// Maximum number of cached components
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

/// Graph command configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphConfig {
    /// How long to wait for background resolution before giving up
    #[serde(default = "default_resolve_timeout_seconds")]
    pub resolve_timeout_seconds: u64,

    /// Output format of the rendered component
    #[serde(default)]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            _ => Err(format!("Unknown output format: {} (expected json or yaml)", s)),
        }
    }
}

// Default value functions
fn default_namespace() -> String {
    "default".to_string()
}

fn default_cache_capacity() -> usize {
    crate::viewer::DEFAULT_CACHE_SIZE
}

fn default_resolve_timeout_seconds() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_namespace: default_namespace(),
            cache: CacheConfig::default(),
            graph: GraphConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            resolve_timeout_seconds: default_resolve_timeout_seconds(),
            output: OutputFormat::default(),
        }
    }
}
