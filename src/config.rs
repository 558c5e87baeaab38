//! Configuration management for the status collector.
//!
//! This module handles loading and validating configuration from files.
//! It supports YAML, JSON, and TOML formats; the format is chosen by file
//! extension and defaults to YAML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::error::StatusError;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8081;
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_QUEUE_CAPACITY: usize = 5;
pub const DEFAULT_METRICS_NAMESPACE: &str = "imgd";

// Upper bounds accepted by validation
pub const MAX_TICK_INTERVAL_SECS: u64 = 86_400;
pub const MAX_QUEUE_CAPACITY: usize = 65_536;

/// Default configuration file locations, searched in order.
const DEFAULT_CONFIG_PATHS: [&str; 8] = [
    "/etc/imgd/status.yaml",
    "/etc/imgd/status.yml",
    "/etc/imgd/status.json",
    "/etc/imgd/status.toml",
    "./imgd-status.yaml",
    "./imgd-status.yml",
    "./imgd-status.json",
    "./imgd-status.toml",
];

/// Settings for the collector task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Seconds between gauge samples (default: 5)
    #[serde(default = "default_tick_interval_secs", alias = "tick-interval-secs")]
    pub tick_interval_secs: u64,

    /// Capacity of the ingestion queue (default: 5)
    #[serde(default = "default_queue_capacity", alias = "queue-capacity")]
    pub queue_capacity: usize,

    /// Prefix for the exported counter families (default: imgd)
    #[serde(default = "default_metrics_namespace", alias = "metrics-namespace")]
    pub metrics_namespace: String,
}

fn default_tick_interval_secs() -> u64 {
    DEFAULT_TICK_INTERVAL_SECS
}
fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}
fn default_metrics_namespace() -> String {
    DEFAULT_METRICS_NAMESPACE.to_string()
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            queue_capacity: default_queue_capacity(),
            metrics_namespace: default_metrics_namespace(),
        }
    }
}

impl CollectorConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn validate(&self) -> Result<(), StatusError> {
        if self.tick_interval_secs == 0 {
            return Err(StatusError::Config(
                "tick_interval_secs must be greater than 0".into(),
            ));
        }
        if self.tick_interval_secs > MAX_TICK_INTERVAL_SECS {
            return Err(StatusError::Config(format!(
                "tick_interval_secs must be at most {MAX_TICK_INTERVAL_SECS}"
            )));
        }
        if self.queue_capacity == 0 {
            return Err(StatusError::Config(
                "queue_capacity must be greater than 0".into(),
            ));
        }
        if self.queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(StatusError::Config(format!(
                "queue_capacity must be at most {MAX_QUEUE_CAPACITY}"
            )));
        }
        if self.metrics_namespace.is_empty() {
            return Err(StatusError::Config(
                "metrics_namespace must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Settings for the HTTP host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind() -> String {
    DEFAULT_BIND_ADDR.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

/// Complete configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    // Plain values precede tables for TOML output
    pub log_level: Option<String>,
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Validate effective config (used by --check-config and at startup)
    pub fn validate(&self) -> Result<(), StatusError> {
        self.collector.validate()?;
        if self.server.bind.parse::<std::net::IpAddr>().is_err() {
            return Err(StatusError::Config(format!(
                "Invalid bind address '{}'",
                self.server.bind
            )));
        }
        Ok(())
    }
}

/// Loads configuration from `path`, or from the first existing default
/// location. Returns defaults when no file is found.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match DEFAULT_CONFIG_PATHS.iter().find(|p| Path::new(p).exists()) {
            Some(p) => PathBuf::from(p),
            None => return Ok(Config::default()),
        },
    };

    if !path.exists() {
        return Err(format!("Config file not found: {}", path.display()).into());
    }

    let content = fs::read_to_string(&path)?;

    let config: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        Some("toml") => toml::from_str(&content)?,
        _ => serde_yaml::from_str(&content)?,
    };
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.collector.tick_interval_secs, 5);
        assert_eq!(config.collector.queue_capacity, 5);
        assert_eq!(config.collector.metrics_namespace, "imgd");
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_yaml_partial() {
        let file = write_config(".yaml", "collector:\n  tick_interval_secs: 2\n");
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.collector.tick_interval_secs, 2);
        assert_eq!(config.collector.queue_capacity, 5);
        assert_eq!(config.server.bind, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn test_load_json_and_toml() {
        let file = write_config(
            ".json",
            r#"{"collector": {"queue_capacity": 16}, "server": {"port": 9000}}"#,
        );
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.collector.queue_capacity, 16);
        assert_eq!(config.server.port, 9000);

        let file = write_config(".toml", "log_level = \"debug\"\n[collector]\nmetrics_namespace = \"skins\"\n");
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.collector.metrics_namespace, "skins");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/imgd-status.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_bounds() {
        let mut config = Config::default();
        config.collector.tick_interval_secs = MAX_TICK_INTERVAL_SECS;
        config.collector.queue_capacity = MAX_QUEUE_CAPACITY;
        assert!(config.validate().is_ok());

        config.collector.tick_interval_secs = u64::MAX;
        assert!(matches!(config.validate(), Err(StatusError::Config(_))));

        let mut config = Config::default();
        config.collector.queue_capacity = usize::MAX;
        assert!(matches!(config.validate(), Err(StatusError::Config(_))));
    }

    #[test]
    fn test_default_paths_cover_every_format() {
        for ext in ["yaml", "json", "toml"] {
            assert!(DEFAULT_CONFIG_PATHS
                .iter()
                .any(|p| p.starts_with("/etc/") && p.ends_with(ext)));
            assert!(DEFAULT_CONFIG_PATHS
                .iter()
                .any(|p| p.starts_with("./") && p.ends_with(ext)));
        }
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = Config::default();
        config.collector.tick_interval_secs = 0;
        assert!(matches!(config.validate(), Err(StatusError::Config(_))));

        let mut config = Config::default();
        config.collector.queue_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.bind = "not-an-ip".into();
        assert!(config.validate().is_err());
    }
}
