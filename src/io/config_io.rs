use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "TODO_TREE_CONFIG";

/// Get the config file path: `$TODO_TREE_CONFIG`, else
/// `$XDG_CONFIG_HOME/todo-tree/config.toml`.
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".config"));
    config_dir.join("todo-tree").join("config.toml")
}

/// Default store directory: `$XDG_DATA_HOME/todo-tree`.
pub fn default_store_dir() -> PathBuf {
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".local").join("share"));
    data_dir.join("todo-tree")
}

/// Get the user's home directory
fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs_home().join(rest),
        None if path == "~" => dirs_home(),
        None => PathBuf::from(path),
    }
}

/// Read the config from a specific path.
/// If the file doesn't exist, returns defaults.
/// If the file is corrupted, backs it up as .bak and returns defaults.
pub fn read_config_from(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }

    match fs::read_to_string(path) {
        Ok(content) => match toml::from_str::<Config>(&content) {
            Ok(config) => config,
            Err(e) => {
                let bak = path.with_extension("toml.bak");
                let _ = fs::copy(path, &bak);
                // Read before the logger exists, so report directly
                eprintln!(
                    "warning: could not parse {} (backed up as {}): {}",
                    path.display(),
                    bak.display(),
                    e
                );
                Config::default()
            }
        },
        Err(e) => {
            eprintln!("warning: could not read {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Read the config from the default location.
pub fn read_config() -> Config {
    read_config_from(&config_path())
}

/// Resolve the store directory: explicit override, then config, then the
/// XDG default.
pub fn resolve_store_dir(config: &Config, override_dir: Option<&str>) -> PathBuf {
    if let Some(dir) = override_dir {
        return expand_home(dir);
    }
    match config.storage.dir.as_deref() {
        Some(dir) => expand_home(dir),
        None => default_store_dir(),
    }
}
