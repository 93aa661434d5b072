use serde::{Deserialize, Serialize};

use super::list::DEFAULT_TITLE;

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub lists: ListsConfig,
    #[serde(default)]
    pub share: ShareConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the store file. Unset means the XDG data directory.
    #[serde(default)]
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListsConfig {
    #[serde(default = "default_title")]
    pub default_title: String,
}

impl Default for ListsConfig {
    fn default() -> Self {
        ListsConfig {
            default_title: default_title(),
        }
    }
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Scheme and host that share links point at
    #[serde(default = "default_origin")]
    pub origin: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        ShareConfig {
            origin: default_origin(),
        }
    }
}

fn default_origin() -> String {
    "http://localhost:3000".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// env_logger filter used when RUST_LOG is unset
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}
